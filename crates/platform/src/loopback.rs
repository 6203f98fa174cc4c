//! In-process companion link for the desktop simulator.
//!
//! `loopback_pair()` returns the watch half ([`LoopbackLink`], implements
//! [`CompanionLink`]) and the phone half ([`LoopbackPeer`]). The peer keeps
//! the latest payload per path, the way the phone's data layer persists
//! items, and the link replays that state on every connect so a freshly
//! visible face gets data without waiting for the next phone push.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use embassy_time::{Duration, Timer};
use tokio::sync::mpsc;

use crate::companion::{AssetRef, CompanionLink, DataEvent, LinkEvent};

/// Errors produced by the loopback link.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoopbackError {
    /// The phone half was dropped or declared unreachable.
    #[error("phone unreachable")]
    PeerUnreachable,
    /// The link is not connected.
    #[error("link not connected")]
    NotConnected,
}

type Envelope = (u64, Option<LinkEvent>);

struct Shared {
    connected: AtomicBool,
    reachable: AtomicBool,
    epoch: AtomicU64,
    next_asset: AtomicU64,
    asset_latency_ms: AtomicU64,
    items: Mutex<BTreeMap<String, Vec<u8>>>,
    assets: Mutex<HashMap<AssetRef, Vec<u8>>>,
    events_tx: mpsc::UnboundedSender<Envelope>,
}

impl Shared {
    fn send(&self, event: Option<LinkEvent>) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let _ = self.events_tx.send((epoch, event));
    }
}

/// Watch half of the loopback pair.
pub struct LoopbackLink {
    shared: Arc<Shared>,
    events_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Envelope>>,
}

/// Phone half of the loopback pair.
#[derive(Clone)]
pub struct LoopbackPeer {
    shared: Arc<Shared>,
}

/// Create a connected-on-demand link and the phone that feeds it.
pub fn loopback_pair() -> (LoopbackLink, LoopbackPeer) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        connected: AtomicBool::new(false),
        reachable: AtomicBool::new(true),
        epoch: AtomicU64::new(0),
        next_asset: AtomicU64::new(1),
        asset_latency_ms: AtomicU64::new(0),
        items: Mutex::new(BTreeMap::new()),
        assets: Mutex::new(HashMap::new()),
        events_tx,
    });
    let link = LoopbackLink {
        shared: Arc::clone(&shared),
        events_rx: tokio::sync::Mutex::new(events_rx),
    };
    (link, LoopbackPeer { shared })
}

impl LoopbackPeer {
    /// Publish (or replace) the item at `path`.
    pub fn put_data_item(&self, path: &str, data: Vec<u8>) {
        if let Ok(mut items) = self.shared.items.lock() {
            items.insert(path.to_owned(), data.clone());
        }
        if self.shared.connected.load(Ordering::SeqCst) {
            self.shared
                .send(Some(LinkEvent::Data(vec![DataEvent::changed(path, data)])));
        }
    }

    /// Remove the item at `path`.
    pub fn delete_data_item(&self, path: &str) {
        if let Ok(mut items) = self.shared.items.lock() {
            items.remove(path);
        }
        if self.shared.connected.load(Ordering::SeqCst) {
            self.shared
                .send(Some(LinkEvent::Data(vec![DataEvent::deleted(path)])));
        }
    }

    /// Store an asset blob and return the handle to embed in a data item.
    pub fn put_asset(&self, bytes: Vec<u8>) -> AssetRef {
        let n = self.shared.next_asset.fetch_add(1, Ordering::SeqCst);
        let asset = AssetRef::new(format!("loopback-asset-{n:08x}"));
        if let Ok(mut assets) = self.shared.assets.lock() {
            assets.insert(asset.clone(), bytes);
        }
        asset
    }

    /// Simulated transfer time for asset fetches.
    pub fn set_asset_latency(&self, latency: Duration) {
        self.shared
            .asset_latency_ms
            .store(latency.as_millis(), Ordering::SeqCst);
    }

    /// Take the phone out of (or back into) radio range.
    ///
    /// Going out of range ends the watch's current event stream and makes
    /// connect attempts fail until the phone is reachable again.
    pub fn set_reachable(&self, reachable: bool) {
        self.shared.reachable.store(reachable, Ordering::SeqCst);
        if !reachable && self.shared.connected.swap(false, Ordering::SeqCst) {
            self.shared.send(None);
        }
    }
}

impl CompanionLink for LoopbackLink {
    type Error = LoopbackError;

    async fn connect(&self) -> Result<(), Self::Error> {
        if !self.shared.reachable.load(Ordering::SeqCst) {
            return Err(LoopbackError::PeerUnreachable);
        }
        if self.shared.connected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        let current: Vec<DataEvent> = self
            .shared
            .items
            .lock()
            .map(|items| {
                items
                    .iter()
                    .map(|(path, data)| DataEvent::changed(path.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default();
        if !current.is_empty() {
            self.shared.send(Some(LinkEvent::Data(current)));
        }
        Ok(())
    }

    async fn disconnect(&self) {
        if self.shared.connected.swap(false, Ordering::SeqCst) {
            self.shared.send(None);
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    async fn next_event(&self) -> Option<LinkEvent> {
        let mut events = self.events_rx.lock().await;
        loop {
            let (epoch, event) = events.recv().await?;
            // Envelopes from an earlier connection belong to a stream that
            // has already ended.
            if epoch == self.shared.epoch.load(Ordering::SeqCst) {
                return event;
            }
        }
    }

    async fn open_asset(&self, asset: &AssetRef) -> Result<Option<Vec<u8>>, Self::Error> {
        if !self.shared.connected.load(Ordering::SeqCst) {
            return Err(LoopbackError::NotConnected);
        }
        let latency_ms = self.shared.asset_latency_ms.load(Ordering::SeqCst);
        if latency_ms > 0 {
            Timer::after_millis(latency_ms).await;
        }
        if !self.shared.reachable.load(Ordering::SeqCst) {
            return Err(LoopbackError::PeerUnreachable);
        }
        Ok(self
            .shared
            .assets
            .lock()
            .ok()
            .and_then(|assets| assets.get(asset).cloned()))
    }
}
