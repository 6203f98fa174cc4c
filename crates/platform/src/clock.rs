//! Monotonic time source.
//!
//! Staleness is judged against this clock rather than `Instant::now()`
//! directly so tests can jump a day ahead without waiting for it.

use embassy_time::Instant;

/// Source of "now" for freshness decisions.
pub trait Clock: Send + Sync + 'static {
    /// Current monotonic time.
    fn now(&self) -> Instant;
}

/// The embassy-time driver clock.
///
/// On desktop this requires embassy-time's `std` driver (enabled by this
/// crate's `std` feature).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
