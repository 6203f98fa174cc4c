//! Watch-face presentation model — weather line glyphs, face mode, tick policy.
//!
//! This crate is `no_std` by default; it only uses `core` + `heapless`. It
//! never sees the sync layer's types: the host maps a snapshot to
//! `(Option<(high, low)>, has_icon)` and paints what comes back.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod face;
pub mod weather_line;

pub use face::{next_tick_delay_ms, FaceState, VisibilityChange, INTERACTIVE_UPDATE_RATE_MS};
pub use weather_line::{IconSlot, WeatherLine};
