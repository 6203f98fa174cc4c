//! Simulator wiring: loopback link, simulated phone, sync cache, and a
//! render thread that behaves like the host's draw loop.

use std::sync::Arc;
use std::time::{Instant as StdInstant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use embassy_time::Duration;
use platform::loopback::{loopback_pair, LoopbackLink};
use platform::SystemClock;
use tokio::runtime::Runtime;
use ui::{next_tick_delay_ms, FaceState, VisibilityChange, INTERACTIVE_UPDATE_RATE_MS};
use weather_sync::{SyncConfig, WeatherSync};

use crate::phone::SimulatedPhone;
use crate::render;

/// Poll period of the render thread while the tick timer is stopped.
const IDLE_POLL_MS: u64 = 250;

/// Simulator settings.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Sync cache tunables
    pub sync: SyncConfig,
    /// Total run time
    pub run_for: std::time::Duration,
    /// Phone publish period
    pub publish_every: Duration,
    /// Simulated asset download time
    pub asset_latency: Duration,
    /// Attach icons to published items
    pub with_icons: bool,
    /// Visibility schedule: `(visible, hidden)` phase lengths, or always
    /// visible when `None`
    pub visibility_cycle: Option<(std::time::Duration, std::time::Duration)>,
    /// Enter ambient mode for the last part of every visible phase
    pub ambient_tail: Option<std::time::Duration>,
    /// Screen drops to 1-bit colour in ambient mode
    pub low_bit_ambient: bool,
}

/// Desired face mode at `elapsed` under the schedule in `options`.
pub fn scheduled_mode(options: &SimOptions, elapsed: std::time::Duration) -> (bool, bool) {
    let Some((visible_for, hidden_for)) = options.visibility_cycle else {
        return (true, false);
    };
    let period = visible_for.saturating_add(hidden_for).as_millis();
    let Some(phase) = elapsed.as_millis().checked_rem(period) else {
        return (true, false);
    };
    let visible_ms = visible_for.as_millis();
    let visible = phase < visible_ms;
    let ambient = visible
        && options
            .ambient_tail
            .is_some_and(|tail| phase >= visible_ms.saturating_sub(tail.as_millis()));
    (visible, ambient)
}

/// Run the simulation to completion.
pub fn run(runtime: &Runtime, options: &SimOptions) -> anyhow::Result<()> {
    let (link, peer) = loopback_pair();
    peer.set_asset_latency(options.asset_latency);

    let sync = Arc::new(WeatherSync::start(
        Arc::new(link),
        Arc::new(SystemClock),
        options.sync,
        runtime.handle(),
    ));
    let phone = SimulatedPhone::new(peer, options.with_icons);
    let phone_task = runtime.spawn(phone.run(options.publish_every, None));

    tracing::info!(
        run_for_secs = options.run_for.as_secs(),
        publish_every_secs = options.publish_every.as_secs(),
        icons = options.with_icons,
        "{}",
        platform::config::dev_banner()
    );

    let render_sync = Arc::clone(&sync);
    let render_options = options.clone();
    let renderer = std::thread::Builder::new()
        .name("render".into())
        .spawn(move || render_loop(&render_sync, &render_options))
        .context("spawning render thread")?;

    let frames = renderer
        .join()
        .map_err(|_| anyhow::anyhow!("render thread panicked"))?;
    phone_task.abort();
    sync.on_became_hidden();

    let stats = sync.stats();
    tracing::info!(
        frames,
        accepted = stats.accepted,
        ignored = stats.ignored,
        malformed = stats.malformed,
        icons_resolved = stats.icons_resolved,
        icons_failed = stats.icons_failed,
        stale_resets = stats.stale_resets,
        connect_failures = stats.connect_failures,
        "simulation finished"
    );
    Ok(())
}

/// Draw loop on a plain thread: visibility hooks and snapshot reads never
/// wait on the runtime. Returns the number of frames drawn.
fn render_loop(sync: &WeatherSync<LoopbackLink, SystemClock>, options: &SimOptions) -> u64 {
    let started = StdInstant::now();
    let mut face = FaceState::new();
    face.set_low_bit_ambient(options.low_bit_ambient);
    let mut frames = 0_u64;

    while started.elapsed() < options.run_for {
        let (visible, ambient) = scheduled_mode(options, started.elapsed());
        match face.set_visible(visible) {
            VisibilityChange::BecameVisible => {
                tracing::info!("face visible");
                sync.on_became_visible();
            }
            VisibilityChange::BecameHidden => {
                tracing::info!("face hidden");
                sync.on_became_hidden();
            }
            VisibilityChange::Unchanged => {}
        }
        if face.set_ambient(ambient) {
            tracing::info!(ambient, antialias = face.antialias(), "ambient mode changed");
        }

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);

        if face.visible() {
            let snapshot = sync.current_snapshot();
            tracing::info!(
                target: "face",
                link = ?sync.link_state(),
                "{}",
                render::frame(&face, now_ms / 1_000, &snapshot)
            );
            frames = frames.saturating_add(1);
        }

        let wait_ms = if face.timer_should_run() {
            next_tick_delay_ms(now_ms, INTERACTIVE_UPDATE_RATE_MS)
        } else {
            IDLE_POLL_MS
        };
        std::thread::sleep(std::time::Duration::from_millis(wait_ms));
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(cycle: Option<(u64, u64)>, tail: Option<u64>) -> SimOptions {
        SimOptions {
            sync: SyncConfig::default(),
            run_for: std::time::Duration::from_secs(1),
            publish_every: Duration::from_secs(1),
            asset_latency: Duration::from_millis(0),
            with_icons: true,
            visibility_cycle: cycle.map(|(v, h)| {
                (
                    std::time::Duration::from_secs(v),
                    std::time::Duration::from_secs(h),
                )
            }),
            ambient_tail: tail.map(std::time::Duration::from_secs),
            low_bit_ambient: false,
        }
    }

    #[test]
    fn test_no_cycle_is_always_visible_and_interactive() {
        let opts = options(None, None);
        assert_eq!(
            scheduled_mode(&opts, std::time::Duration::from_secs(999)),
            (true, false)
        );
    }

    #[test]
    fn test_cycle_alternates_visible_and_hidden() {
        let opts = options(Some((10, 5)), None);
        let at = |s| scheduled_mode(&opts, std::time::Duration::from_secs(s));
        assert_eq!(at(0), (true, false));
        assert_eq!(at(9), (true, false));
        assert_eq!(at(10), (false, false));
        assert_eq!(at(15), (true, false));
    }

    #[test]
    fn test_ambient_tail_ends_each_visible_phase() {
        let opts = options(Some((10, 5)), Some(3));
        let at = |s| scheduled_mode(&opts, std::time::Duration::from_secs(s));
        assert_eq!(at(6), (true, false));
        assert_eq!(at(7), (true, true));
        assert_eq!(at(12), (false, false));
    }
}
