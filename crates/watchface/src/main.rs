use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use watchface::{sim, SimOptions};
use weather_sync::{duration_from_millis, duration_from_secs, SyncConfig};

#[derive(Debug, Parser)]
#[command(
    name = "watchface",
    version,
    about = "Sunshine watch face simulator: phone, sync cache and console renderer"
)]
struct Cli {
    /// Total simulated run time in seconds.
    #[arg(long, default_value_t = 30)]
    duration_secs: u64,

    /// Seconds between weather items published by the simulated phone.
    #[arg(long, default_value_t = 5)]
    publish_every_secs: u64,

    /// Visible phase of the visibility cycle. Always visible if unset.
    #[arg(long, requires = "hidden_secs")]
    visible_secs: Option<u64>,

    /// Hidden phase of the visibility cycle.
    #[arg(long, requires = "visible_secs")]
    hidden_secs: Option<u64>,

    /// Spend the last N seconds of each visible phase in ambient mode.
    #[arg(long)]
    ambient_secs: Option<u64>,

    /// Reduce ambient mode to 1-bit colour (anti-aliasing off).
    #[arg(long, default_value_t = false)]
    low_bit_ambient: bool,

    /// Publish temperatures only.
    #[arg(long, default_value_t = false)]
    no_icons: bool,

    /// Simulated asset download latency in milliseconds.
    #[arg(long, default_value_t = 200)]
    phone_latency_ms: u64,

    /// Override the staleness window (otherwise WEATHER_STALE_AFTER_SECS or 24h).
    #[arg(long)]
    stale_after_secs: Option<u64>,

    /// Override the icon fetch timeout (otherwise WEATHER_ICON_TIMEOUT_MS or 5s).
    #[arg(long)]
    icon_timeout_ms: Option<u64>,
}

impl Cli {
    fn into_options(self) -> anyhow::Result<SimOptions> {
        let mut sync = SyncConfig::from_env().context("reading sync config from environment")?;
        if let Some(secs) = self.stale_after_secs {
            sync.stale_after = duration_from_secs("--stale-after-secs", secs)?;
        }
        if let Some(ms) = self.icon_timeout_ms {
            sync.icon_timeout = duration_from_millis("--icon-timeout-ms", ms)?;
        }
        let visibility_cycle = self
            .visible_secs
            .zip(self.hidden_secs)
            .map(|(v, h)| {
                (
                    std::time::Duration::from_secs(v),
                    std::time::Duration::from_secs(h),
                )
            });
        Ok(SimOptions {
            sync,
            run_for: std::time::Duration::from_secs(self.duration_secs),
            publish_every: duration_from_secs(
                "--publish-every-secs",
                self.publish_every_secs.max(1),
            )?,
            asset_latency: duration_from_millis("--phone-latency-ms", self.phone_latency_ms)?,
            with_icons: !self.no_icons,
            visibility_cycle,
            ambient_tail: self.ambient_secs.map(std::time::Duration::from_secs),
            low_bit_ambient: self.low_bit_ambient,
        })
    }
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = Cli::parse().into_options()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("sync")
        .build()
        .context("building tokio runtime")?;

    sim::run(&runtime, &options)
}
