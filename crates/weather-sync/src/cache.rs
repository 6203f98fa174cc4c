//! Cache state: the authoritative snapshot.
//!
//! The snapshot lives in a `watch` channel. Writers replace fields under the
//! channel's lock and never await while holding it; readers clone the
//! current value, so a read is always one consistent snapshot and never
//! waits on the transport.

use std::sync::Arc;

use embassy_time::Instant;
use tokio::sync::watch;

use crate::snapshot::{Freshness, TempRange, WeatherIcon, WeatherSnapshot};

/// Shared weather snapshot of one watch-face engine.
#[derive(Debug)]
pub struct CacheState {
    tx: watch::Sender<WeatherSnapshot>,
}

impl CacheState {
    /// All-unknown cache whose freshness window starts at `created_at`.
    pub fn new(created_at: Instant) -> Self {
        let (tx, _rx) = watch::channel(WeatherSnapshot::unknown(created_at));
        Self { tx }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> WeatherSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<WeatherSnapshot> {
        self.tx.subscribe()
    }

    /// Record an accepted update and return its sequence number.
    ///
    /// The freshness window restarts at `at`, unless `at` reads earlier than
    /// the stored time, in which case the stored time is kept.
    pub fn accept_update(&self, temps: TempRange, at: Instant) -> u64 {
        let mut seq = 0;
        self.tx.send_modify(|snap| {
            snap.temps = Some(temps);
            snap.last_updated_at = snap.last_updated_at.max(at);
            snap.freshness = Freshness::Fresh;
            snap.update_seq = snap.update_seq.saturating_add(1);
            seq = snap.update_seq;
        });
        seq
    }

    /// Install the icon materialized for update `generation`.
    ///
    /// Returns `false` (and leaves the cache untouched) if an icon from the
    /// same or a newer update is already installed, or if the cache was
    /// reset after that update was accepted.
    pub fn install_icon(&self, icon: Arc<WeatherIcon>, generation: u64) -> bool {
        self.tx.send_if_modified(|snap| {
            if generation <= snap.icon_generation || generation > snap.update_seq {
                return false;
            }
            snap.icon = Some(icon);
            snap.icon_generation = generation;
            true
        })
    }

    /// Wipe temperatures and icon if `expired` says the current snapshot is
    /// past its window. Only a fresh snapshot can be reset, so this fires at
    /// most once per crossing. Returns `true` if it fired.
    pub fn reset_if(&self, expired: impl FnOnce(&WeatherSnapshot) -> bool) -> bool {
        self.tx.send_if_modified(|snap| {
            if snap.freshness == Freshness::Stale || !expired(snap) {
                return false;
            }
            snap.temps = None;
            snap.icon = None;
            snap.freshness = Freshness::Stale;
            // Icons still in flight belong to updates from before the reset.
            snap.icon_generation = snap.update_seq;
            true
        })
    }
}
