//! Hardware Abstraction Layer (HAL) for the Sunshine watch face
//!
//! This crate provides trait-based abstractions for everything the weather
//! sync layer touches outside its own memory, enabling development and
//! testing without a paired phone.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (watchface crate)
//!         ↓
//! Feature Layers (weather-sync, companion, ui)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Host services (data-sync transport, monotonic clock)
//! ```
//!
//! # Abstractions
//!
//! - [`CompanionLink`] - data-sync transport to the paired phone
//! - [`Clock`] - monotonic time source used for staleness decisions
//!
//! # Features
//!
//! - `std`: loopback link for the desktop simulator, mocks, and the
//!   embassy-time std driver
//!
//! # Example
//!
//! ```no_run
//! use platform::CompanionLink;
//!
//! async fn example<L: CompanionLink>(link: &L) {
//!     if link.connect().await.is_ok() {
//!         while let Some(event) = link.next_event().await {
//!             let _ = event;
//!         }
//!     }
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::must_use_candidate)] // accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

pub mod clock;
pub mod companion;
pub mod config;

#[cfg(feature = "std")]
pub mod loopback;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main high-level traits
pub use clock::{Clock, SystemClock};
pub use companion::{
    AssetRef, CompanionLink, DataEvent, DataEventKind, DataItem, LinkEvent, SuspendCause,
};

// Time types shared by every layer above
pub use embassy_time::{Duration, Instant};
