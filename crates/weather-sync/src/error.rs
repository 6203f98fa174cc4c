//! Error taxonomy of the sync path.
//!
//! Nothing here ever reaches the renderer: every failure is logged where it
//! happens and the last good snapshot stays in place. Staleness is a
//! [`Freshness`](crate::Freshness) state, not an error.

use companion::DecodeError;

/// Failures absorbed by the sync path.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Connect handshake failed or timed out. Retried on the next
    /// visibility transition.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// A weather item could not be decoded; the event was dropped.
    #[error("malformed weather update: {0}")]
    MalformedUpdate(#[from] MalformedUpdate),

    /// The icon of an update could not be materialized; the previous icon
    /// was kept.
    #[error("icon resolution failed: {0}")]
    IconResolutionFailed(#[from] IconFailure),
}

/// Why a weather item was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedUpdate {
    /// The payload is not a valid data map.
    #[error("undecodable payload: {0}")]
    Wire(#[from] DecodeError),

    /// A temperature key is absent.
    #[error("missing `{0}`")]
    MissingTemperature(&'static str),

    /// A temperature key holds something other than an int.
    #[error("`{key}` is {found}, expected int")]
    NotAnInt {
        /// Offending key
        key: &'static str,
        /// Type actually found
        found: &'static str,
    },

    /// A temperature outside the plausible domain (this includes the
    /// unknown sentinel).
    #[error("`{key}` = {value} is not a plausible temperature")]
    Implausible {
        /// Offending key
        key: &'static str,
        /// Value received
        value: i32,
    },
}

/// Why an icon reference did not turn into a bitmap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IconFailure {
    /// Download plus decode exceeded the bound.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// The link was down when the request ran.
    #[error("transport not ready: {0}")]
    NotConnected(String),

    /// The transport reported an error while opening the asset.
    #[error("asset fetch failed: {0}")]
    Transport(String),

    /// The transport opened no stream, or the stream was empty.
    #[error("empty asset stream")]
    EmptyStream,

    /// The bytes are not a decodable image.
    #[error("undecodable image: {0}")]
    Undecodable(String),
}
