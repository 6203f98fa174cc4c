//! Sync path counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, shared by the session, worker and materializer.
#[derive(Debug, Default)]
pub struct SyncStats {
    accepted: AtomicU64,
    ignored: AtomicU64,
    malformed: AtomicU64,
    icons_resolved: AtomicU64,
    icons_failed: AtomicU64,
    icons_superseded: AtomicU64,
    stale_resets: AtomicU64,
    connect_failures: AtomicU64,
}

/// Point-in-time copy of [`SyncStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Weather updates written to the cache
    pub accepted: u64,
    /// Events for other topics, or deletions
    pub ignored: u64,
    /// Weather items dropped as malformed
    pub malformed: u64,
    /// Icons installed in the cache
    pub icons_resolved: u64,
    /// Icon resolutions that failed
    pub icons_failed: u64,
    /// Icons resolved after a newer one was installed
    pub icons_superseded: u64,
    /// Transitions into `Stale`
    pub stale_resets: u64,
    /// Failed or timed-out handshakes
    pub connect_failures: u64,
}

macro_rules! counter {
    ($($record:ident => $field:ident),* $(,)?) => {
        impl SyncStats {
            $(
                #[doc = concat!("Count one `", stringify!($field), "` event.")]
                pub fn $record(&self) {
                    self.$field.fetch_add(1, Ordering::Relaxed);
                }
            )*

            /// Copy the counters.
            pub fn snapshot(&self) -> StatsSnapshot {
                StatsSnapshot {
                    $($field: self.$field.load(Ordering::Relaxed),)*
                }
            }
        }
    };
}

counter! {
    record_accepted => accepted,
    record_ignored => ignored,
    record_malformed => malformed,
    record_icon_resolved => icons_resolved,
    record_icon_failed => icons_failed,
    record_icon_superseded => icons_superseded,
    record_stale_reset => stale_resets,
    record_connect_failure => connect_failures,
}
