//! Phone ↔ watch wire protocol.
//!
//! The transport (see [`platform::CompanionLink`]) moves opaque bytes under a
//! path. This crate gives those bytes a shape:
//!
//! - [`data_map`] - the typed key/value map every data item carries, and its
//!   checksummed postcard encoding
//! - [`weather`] - the weather item schema (path, keys) and the phone-side
//!   builder
//! - [`state`] - link state tracker used by the watch's transport session
//!
//! This crate is `no_std` + `alloc`; it never logs.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod data_map;
pub mod state;
pub mod weather;

pub use data_map::{decode_data_map, encode_data_map, DataMap, DataValue, DecodeError, EncodeError};
pub use state::{LinkState, LinkTracker};
pub use weather::{WeatherItem, KEY_HIGH, KEY_ICON, KEY_LOW, WEATHER_PATH};
