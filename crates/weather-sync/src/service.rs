//! `WeatherSync`: one engine instance's cache, session, worker and
//! materializer wired together.

use std::sync::Arc;

use companion::LinkState;
use platform::{Clock, CompanionLink};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::cache::CacheState;
use crate::config::SyncConfig;
use crate::decoder::decode_event;
use crate::error::SyncError;
use crate::materializer::IconMaterializer;
use crate::session::{TransportSession, UpdateEvent};
use crate::snapshot::WeatherSnapshot;
use crate::staleness::{self, StalenessPolicy};
use crate::stats::{StatsSnapshot, SyncStats};

/// Weather sync cache of one watch-face engine.
///
/// Every method returns immediately and may be called from the render
/// thread; network work happens on tasks spawned on the runtime handed to
/// [`WeatherSync::start`].
pub struct WeatherSync<L: CompanionLink, C: Clock> {
    cache: Arc<CacheState>,
    session: TransportSession<L>,
    clock: Arc<C>,
    policy: StalenessPolicy,
    stats: Arc<SyncStats>,
    tasks: Vec<JoinHandle<()>>,
}

impl<L: CompanionLink, C: Clock> WeatherSync<L, C> {
    /// Build the cache (all unknown, freshness window starting now) and
    /// start the update worker on `runtime`. The link stays down until
    /// [`WeatherSync::on_became_visible`].
    pub fn start(link: Arc<L>, clock: Arc<C>, config: SyncConfig, runtime: &Handle) -> Self {
        let cache = Arc::new(CacheState::new(clock.now()));
        let stats = Arc::new(SyncStats::default());
        let policy = StalenessPolicy::new(config.stale_after);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let session = TransportSession::start(
            Arc::clone(&link),
            config.connect_timeout,
            events_tx,
            Arc::clone(&stats),
            runtime,
        );
        let materializer = IconMaterializer::new(
            link,
            Arc::clone(&cache),
            Arc::clone(&stats),
            config.icon_timeout,
            runtime.clone(),
        );
        let worker = Worker {
            cache: Arc::clone(&cache),
            clock: Arc::clone(&clock),
            stats: Arc::clone(&stats),
            materializer,
        };

        let mut tasks = vec![runtime.spawn(worker.run(events_rx))];
        if let Some(period) = config.watchdog_period {
            tasks.push(runtime.spawn(staleness::watchdog(
                Arc::clone(&cache),
                Arc::clone(&clock),
                policy,
                period,
                Arc::clone(&stats),
            )));
        }
        tracing::debug!(
            stale_after_secs = config.stale_after.as_secs(),
            icon_timeout_ms = config.icon_timeout.as_millis(),
            watchdog = config.watchdog_period.is_some(),
            "weather sync started"
        );

        Self {
            cache,
            session,
            clock,
            policy,
            stats,
            tasks,
        }
    }

    /// Face became visible: bring the link up.
    pub fn on_became_visible(&self) {
        self.session.connect();
    }

    /// Face became hidden: release the link.
    pub fn on_became_hidden(&self) {
        self.session.disconnect();
    }

    /// Best-available snapshot. Applies the staleness policy first.
    pub fn current_snapshot(&self) -> WeatherSnapshot {
        if self.policy.enforce(&self.cache, self.clock.now()) {
            self.stats.record_stale_reset();
            tracing::info!(
                window_secs = self.policy.stale_after().as_secs(),
                "weather went stale; cache reset"
            );
        }
        self.cache.snapshot()
    }

    /// Receiver notified on every cache change (without the staleness check).
    pub fn subscribe(&self) -> watch::Receiver<WeatherSnapshot> {
        self.cache.subscribe()
    }

    /// Sync path counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Link state as tracked by the session.
    pub fn link_state(&self) -> LinkState {
        self.session.state()
    }
}

impl<L: CompanionLink, C: Clock> Drop for WeatherSync<L, C> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

struct Worker<L: CompanionLink, C: Clock> {
    cache: Arc<CacheState>,
    clock: Arc<C>,
    stats: Arc<SyncStats>,
    materializer: IconMaterializer<L>,
}

impl<L: CompanionLink, C: Clock> Worker<L, C> {
    async fn run(self, mut events: mpsc::UnboundedReceiver<UpdateEvent>) {
        while let Some(event) = events.recv().await {
            self.apply(&event);
        }
    }

    fn apply(&self, event: &UpdateEvent) {
        match decode_event(event) {
            Ok(None) => {
                self.stats.record_ignored();
                tracing::debug!(path = event.path(), kind = ?event.kind, "ignoring data event");
            }
            Err(malformed) => {
                self.stats.record_malformed();
                tracing::warn!(error = %SyncError::from(malformed), "dropping weather update");
            }
            Ok(Some(update)) => {
                let seq = self.cache.accept_update(update.temps, self.clock.now());
                self.stats.record_accepted();
                tracing::info!(
                    seq,
                    high = update.temps.high(),
                    low = update.temps.low(),
                    icon = update.icon.is_some(),
                    "weather updated"
                );
                // Fire and forget; the outcome is logged by the task.
                drop(self.materializer.request(update.icon, seq));
            }
        }
    }
}
