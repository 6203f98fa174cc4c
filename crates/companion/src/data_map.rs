//! Typed data map carried by every synced data item.
//!
//! Layout of an encoded item payload:
//!
//! ```text
//! [0..n]     postcard-encoded BTreeMap<String, DataValue>
//! [n..n+4]   checksum  u32 le  (CRC32 of bytes [0..n])
//! ```
//!
//! Keys are sorted (BTreeMap), so equal maps always encode to equal bytes.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use platform::AssetRef;
use serde::{Deserialize, Serialize};

/// Size of the CRC32 trailer.
pub const CHECKSUM_LEN: usize = 4;

/// Keyed values of one data item.
pub type DataMap = BTreeMap<String, DataValue>;

/// One value in a [`DataMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// Boolean flag
    Bool(bool),
    /// UTF-8 string
    String(String),
    /// Small inline blob
    Bytes(Vec<u8>),
    /// Reference to an asset fetched separately
    Asset(AssetRef),
}

impl DataValue {
    /// The value as an `i32`, if it is an [`DataValue::Int`].
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as an asset reference, if it is a [`DataValue::Asset`].
    pub fn as_asset(&self) -> Option<&AssetRef> {
        match self {
            Self::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Asset(_) => "asset",
        }
    }
}

/// Reasons an item payload cannot be turned back into a [`DataMap`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes than the checksum trailer alone.
    #[error("payload truncated: {0} bytes")]
    Truncated(usize),
    /// Trailer does not match the body.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// CRC32 found in the trailer
        stored: u32,
        /// CRC32 of the received body
        computed: u32,
    },
    /// postcard rejected the body.
    #[error("data map undecodable")]
    Undecodable,
    /// The map decoded but bytes were left over before the trailer.
    #[error("{0} trailing bytes after data map")]
    TrailingBytes(usize),
}

/// postcard refused to serialise the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("data map could not be encoded")]
pub struct EncodeError;

/// Encode `map` into an item payload (postcard body + CRC32 trailer).
pub fn encode_data_map(map: &DataMap) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = postcard::to_allocvec(map).map_err(|_| EncodeError)?;
    let checksum = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&checksum.to_le_bytes());
    Ok(bytes)
}

/// Decode an item payload produced by [`encode_data_map`].
pub fn decode_data_map(payload: &[u8]) -> Result<DataMap, DecodeError> {
    let body_len = payload
        .len()
        .checked_sub(CHECKSUM_LEN)
        .ok_or(DecodeError::Truncated(payload.len()))?;
    let (body, trailer) = payload
        .split_at_checked(body_len)
        .ok_or(DecodeError::Truncated(payload.len()))?;
    let stored = u32::from_le_bytes(
        trailer
            .try_into()
            .map_err(|_| DecodeError::Truncated(payload.len()))?,
    );
    let computed = crc32fast::hash(body);
    if stored != computed {
        return Err(DecodeError::ChecksumMismatch { stored, computed });
    }

    let (map, rest) =
        postcard::take_from_bytes::<DataMap>(body).map_err(|_| DecodeError::Undecodable)?;
    if !rest.is_empty() {
        return Err(DecodeError::TrailingBytes(rest.len()));
    }
    Ok(map)
}
