//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use embassy_time::{Duration, Instant, Timer};
use tokio::sync::mpsc;

use crate::*;

/// What a mocked asset fetch resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAssetOutcome {
    /// The asset stream yields these bytes.
    Bytes(Vec<u8>),
    /// The transport opens no stream for the asset.
    NoStream,
    /// The fetch fails with [`MockLinkError::AssetUnavailable`].
    Error,
}

/// A registered asset: how long the fetch takes and how it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAsset {
    /// Simulated download time.
    pub delay: Duration,
    /// Result handed back after `delay`.
    pub outcome: MockAssetOutcome,
}

impl MockAsset {
    /// An asset that resolves to `bytes` immediately.
    pub fn bytes(bytes: Vec<u8>) -> Self {
        Self {
            delay: Duration::from_ticks(0),
            outcome: MockAssetOutcome::Bytes(bytes),
        }
    }

    /// Delay the fetch by `delay`.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Errors produced by [`MockCompanionLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MockLinkError {
    /// A scripted connect failure.
    #[error("connection refused by mock link")]
    ConnectRefused,
    /// The asset was never registered or was scripted to fail.
    #[error("asset unavailable")]
    AssetUnavailable,
}

/// Mock companion link
///
/// Events pushed with [`MockCompanionLink::push_data`] are delivered in
/// order by [`CompanionLink::next_event`]; [`MockCompanionLink::end_stream`]
/// makes the next read return `None`, as when the phone goes away.
pub struct MockCompanionLink {
    connected: AtomicBool,
    connect_failures: AtomicUsize,
    connect_delay_ms: AtomicU64,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
    asset_calls: AtomicUsize,
    events_tx: mpsc::UnboundedSender<Option<LinkEvent>>,
    events_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Option<LinkEvent>>>,
    assets: Mutex<HashMap<AssetRef, MockAsset>>,
}

impl MockCompanionLink {
    /// Create new mock link (disconnected, no events, no assets)
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            connected: AtomicBool::new(false),
            connect_failures: AtomicUsize::new(0),
            connect_delay_ms: AtomicU64::new(0),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            asset_calls: AtomicUsize::new(0),
            events_tx,
            events_rx: tokio::sync::Mutex::new(events_rx),
            assets: Mutex::new(HashMap::new()),
        }
    }

    /// Queue a batch of data events.
    pub fn push_data(&self, events: Vec<DataEvent>) {
        let _ = self.events_tx.send(Some(LinkEvent::Data(events)));
    }

    /// Queue a suspension notice.
    pub fn push_suspended(&self, cause: SuspendCause) {
        let _ = self.events_tx.send(Some(LinkEvent::Suspended(cause)));
    }

    /// End the current event stream.
    pub fn end_stream(&self) {
        let _ = self.events_tx.send(None);
    }

    /// Make the next `count` connect attempts fail.
    pub fn fail_next_connects(&self, count: usize) {
        self.connect_failures.store(count, Ordering::SeqCst);
    }

    /// Make every connect attempt take `delay`.
    pub fn set_connect_delay(&self, delay: Duration) {
        self.connect_delay_ms
            .store(delay.as_millis(), Ordering::SeqCst);
    }

    /// Register the asset behind `asset`.
    pub fn insert_asset(&self, asset: AssetRef, mock: MockAsset) {
        if let Ok(mut assets) = self.assets.lock() {
            assets.insert(asset, mock);
        }
    }

    /// Number of connect attempts so far
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Number of disconnect calls so far
    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    /// Number of asset fetches so far
    pub fn asset_calls(&self) -> usize {
        self.asset_calls.load(Ordering::SeqCst)
    }

    /// Force the connected flag, bypassing `connect()`.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    fn take_connect_failure(&self) -> bool {
        self.connect_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for MockCompanionLink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanionLink for MockCompanionLink {
    type Error = MockLinkError;

    async fn connect(&self) -> Result<(), Self::Error> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let delay_ms = self.connect_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            Timer::after_millis(delay_ms).await;
        }
        if self.take_connect_failure() {
            return Err(MockLinkError::ConnectRefused);
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn next_event(&self) -> Option<LinkEvent> {
        let mut events = self.events_rx.lock().await;
        events.recv().await.flatten()
    }

    async fn open_asset(&self, asset: &AssetRef) -> Result<Option<Vec<u8>>, Self::Error> {
        self.asset_calls.fetch_add(1, Ordering::SeqCst);
        let registered = self
            .assets
            .lock()
            .ok()
            .and_then(|assets| assets.get(asset).cloned());
        let Some(mock) = registered else {
            return Err(MockLinkError::AssetUnavailable);
        };
        if mock.delay > Duration::from_ticks(0) {
            Timer::after(mock.delay).await;
        }
        match mock.outcome {
            MockAssetOutcome::Bytes(bytes) => Ok(Some(bytes)),
            MockAssetOutcome::NoStream => Ok(None),
            MockAssetOutcome::Error => Err(MockLinkError::AssetUnavailable),
        }
    }
}

/// Mock clock
///
/// Starts wherever it is told to and only moves when advanced.
pub struct MockClock {
    ticks: AtomicU64,
}

impl MockClock {
    /// Create a clock reading `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            ticks: AtomicU64::new(start.as_ticks()),
        }
    }

    /// Create a clock reading `secs` seconds after boot.
    pub fn starting_at_secs(secs: u64) -> Self {
        Self::new(Instant::from_secs(secs))
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.ticks.fetch_add(by.as_ticks(), Ordering::SeqCst);
    }

    /// Set the clock to an absolute reading (may move backwards).
    pub fn set(&self, at: Instant) {
        self.ticks.store(at.as_ticks(), Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Instant::from_ticks(0))
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.ticks.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_link_connect_and_disconnect() {
        let link = MockCompanionLink::new();
        assert!(!link.is_connected());

        link.connect().await.unwrap();
        assert!(link.is_connected());
        assert_eq!(link.connect_calls(), 1);

        link.disconnect().await;
        assert!(!link.is_connected());
        assert_eq!(link.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_link_scripted_connect_failure() {
        let link = MockCompanionLink::new();
        link.fail_next_connects(1);

        assert_eq!(link.connect().await, Err(MockLinkError::ConnectRefused));
        assert!(!link.is_connected());
        assert!(link.connect().await.is_ok());
        assert!(link.is_connected());
    }

    #[tokio::test]
    async fn test_mock_link_delivers_events_in_order() {
        let link = MockCompanionLink::new();
        link.push_data(vec![DataEvent::changed("/a", vec![1])]);
        link.push_suspended(SuspendCause::NetworkLost);
        link.end_stream();

        assert_eq!(
            link.next_event().await,
            Some(LinkEvent::Data(vec![DataEvent::changed("/a", vec![1])]))
        );
        assert_eq!(
            link.next_event().await,
            Some(LinkEvent::Suspended(SuspendCause::NetworkLost))
        );
        assert_eq!(link.next_event().await, None);
    }

    #[tokio::test]
    async fn test_mock_link_assets() {
        let link = MockCompanionLink::new();
        let icon = AssetRef::new("icon");
        let missing = AssetRef::new("missing");
        link.insert_asset(icon.clone(), MockAsset::bytes(vec![9, 9]));

        assert_eq!(link.open_asset(&icon).await, Ok(Some(vec![9, 9])));
        assert_eq!(
            link.open_asset(&missing).await,
            Err(MockLinkError::AssetUnavailable)
        );
        assert_eq!(link.asset_calls(), 2);
    }

    #[test]
    fn test_mock_clock_advances() {
        let clock = MockClock::starting_at_secs(100);
        assert_eq!(clock.now().as_secs(), 100);

        clock.advance(Duration::from_secs(86_400));
        assert_eq!(clock.now().as_secs(), 86_500);

        clock.set(Instant::from_secs(5));
        assert_eq!(clock.now().as_secs(), 5);
    }

    proptest::proptest! {
        #[test]
        fn prop_mock_clock_never_runs_backwards_when_advanced(
            start in 0u64..1_000_000,
            steps in proptest::collection::vec(0u64..100_000, 0..32),
        ) {
            let clock = MockClock::starting_at_secs(start);
            let mut previous = clock.now();
            for step in steps {
                clock.advance(Duration::from_millis(step));
                let now = clock.now();
                proptest::prop_assert!(now >= previous);
                proptest::prop_assert_eq!(
                    now.as_ticks() - previous.as_ticks(),
                    Duration::from_millis(step).as_ticks()
                );
                previous = now;
            }
        }
    }
}
