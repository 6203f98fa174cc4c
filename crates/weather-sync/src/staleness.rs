//! Staleness policy.
//!
//! Two states, `Fresh` and `Stale`. A snapshot goes stale once
//! `now - last_updated_at` exceeds the window; entering `Stale` forgets the
//! temperatures and the icon, even if the icon itself is still valid. Only an
//! accepted update makes the snapshot fresh again.

use std::sync::Arc;

use embassy_time::{Duration, Instant, Timer};
use platform::Clock;

use crate::cache::CacheState;
use crate::stats::SyncStats;

/// Freshness window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    stale_after: Duration,
}

impl StalenessPolicy {
    /// Policy with the given window.
    pub const fn new(stale_after: Duration) -> Self {
        Self { stale_after }
    }

    /// The window.
    pub const fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Returns `true` if `now` is strictly more than the window past
    /// `last_updated_at`. A clock reading earlier than `last_updated_at`
    /// never counts as expired.
    pub fn is_expired(&self, last_updated_at: Instant, now: Instant) -> bool {
        now.checked_duration_since(last_updated_at)
            .is_some_and(|age| age > self.stale_after)
    }

    /// Reset `cache` if it crossed the window. Returns `true` on the
    /// transition into `Stale`.
    pub fn enforce(&self, cache: &CacheState, now: Instant) -> bool {
        cache.reset_if(|snap| self.is_expired(snap.last_updated_at, now))
    }
}

/// Periodically enforce `policy` so the wipe happens even when nobody reads.
pub(crate) async fn watchdog<C: Clock>(
    cache: Arc<CacheState>,
    clock: Arc<C>,
    policy: StalenessPolicy,
    period: Duration,
    stats: Arc<SyncStats>,
) {
    tracing::debug!(period_secs = period.as_secs(), "staleness watchdog started");
    loop {
        Timer::after(period).await;
        if policy.enforce(&cache, clock.now()) {
            stats.record_stale_reset();
            tracing::info!(
                window_secs = policy.stale_after().as_secs(),
                "weather went stale; cache reset (watchdog)"
            );
        }
    }
}
