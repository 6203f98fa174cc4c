//! Companion data-sync transport abstraction
//!
//! The phone application publishes *data items* (a path plus an opaque
//! payload) and *assets* (larger blobs such as icons, referenced from a data
//! item and fetched separately). This module only describes the transport;
//! what the payload bytes mean is the `companion` crate's business.

use alloc::string::String;
use alloc::vec::Vec;
use core::future::Future;

use serde::{Deserialize, Serialize};

/// Kind of change reported for a data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEventKind {
    /// The item was created or its payload changed.
    Changed,
    /// The item was removed on the phone.
    Deleted,
}

/// A data item as synced by the companion: a path plus opaque payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    /// Well-known path identifying the item, e.g. `/sunshineWeather`.
    pub path: String,
    /// Encoded payload. Empty for deleted items.
    pub data: Vec<u8>,
}

/// One entry of a data-changed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEvent {
    /// Whether the item changed or was deleted.
    pub kind: DataEventKind,
    /// The affected item.
    pub item: DataItem,
}

impl DataEvent {
    /// Build a `Changed` event for `path` carrying `data`.
    pub fn changed(path: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            kind: DataEventKind::Changed,
            item: DataItem {
                path: path.into(),
                data,
            },
        }
    }

    /// Build a `Deleted` event for `path`.
    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            kind: DataEventKind::Deleted,
            item: DataItem {
                path: path.into(),
                data: Vec::new(),
            },
        }
    }

    /// Path of the affected item.
    pub fn path(&self) -> &str {
        &self.item.path
    }
}

/// Opaque handle to an asset blob held by the transport.
///
/// The handle is only a digest; the bytes must be fetched with
/// [`CompanionLink::open_asset`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetRef {
    digest: String,
}

impl AssetRef {
    /// Wrap a transport-assigned digest.
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
        }
    }

    /// The transport-assigned digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// Reason the transport reported for a suspended connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendCause {
    /// The sync service on the watch went away.
    ServiceDisconnected,
    /// The radio link to the phone was lost.
    NetworkLost,
    /// Any cause code the transport does not name.
    Other(i32),
}

/// Something the link delivers while connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A batch of data changes, in delivery order.
    Data(Vec<DataEvent>),
    /// The connection was suspended; the transport may resume it on its own.
    Suspended(SuspendCause),
}

/// Data-sync transport to the paired phone.
///
/// All futures are `Send` so the sync layer can drive them from worker tasks
/// instead of the render thread.
pub trait CompanionLink: Send + Sync + 'static {
    /// Error type
    type Error: core::fmt::Debug + core::fmt::Display + Send + 'static;

    /// Establish the connection. Connecting an already connected link is a
    /// no-op that returns `Ok(())`.
    fn connect(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Release the connection. Safe to call when not connected.
    fn disconnect(&self) -> impl Future<Output = ()> + Send;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Wait for the next link event.
    ///
    /// Returns `None` once the event stream has ended (link closed by the
    /// peer or by [`CompanionLink::disconnect`]).
    fn next_event(&self) -> impl Future<Output = Option<LinkEvent>> + Send;

    /// Fetch the bytes behind `asset`.
    ///
    /// `Ok(None)` means the transport opened no stream for the asset.
    fn open_asset(
        &self,
        asset: &AssetRef,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_event_carries_payload() {
        let event = DataEvent::changed("/sunshineWeather", vec![1, 2, 3]);
        assert_eq!(event.kind, DataEventKind::Changed);
        assert_eq!(event.path(), "/sunshineWeather");
        assert_eq!(event.item.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_deleted_event_has_empty_payload() {
        let event = DataEvent::deleted("/sunshineWeather");
        assert_eq!(event.kind, DataEventKind::Deleted);
        assert!(event.item.data.is_empty());
    }

    #[test]
    fn test_asset_ref_exposes_digest() {
        let asset = AssetRef::new("abc123");
        assert_eq!(asset.digest(), "abc123");
        assert_eq!(asset, AssetRef::new(String::from("abc123")));
    }
}
