//! Weather sync cache for the Sunshine watch face.
//!
//! Receives weather updates pushed by the phone, materializes the condition
//! icon off the render path, and wipes the cached values once they are older
//! than the staleness window.
//!
//! ```text
//! CompanionLink ─▶ TransportSession ─▶ worker: decode_event ─▶ CacheState ◀─ renderer
//!                                              │                  ▲           (current_snapshot)
//!                                              └▶ IconMaterializer┘
//!                                                       StalenessPolicy (read time / watchdog)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use platform::loopback::loopback_pair;
//! use platform::SystemClock;
//! use weather_sync::{SyncConfig, WeatherSync};
//!
//! # async fn demo() {
//! let (link, _phone) = loopback_pair();
//! let sync = WeatherSync::start(
//!     Arc::new(link),
//!     Arc::new(SystemClock),
//!     SyncConfig::default(),
//!     &tokio::runtime::Handle::current(),
//! );
//! sync.on_became_visible();
//! let snapshot = sync.current_snapshot();
//! # let _ = snapshot;
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code

pub mod cache;
pub mod config;
pub mod decoder;
pub mod error;
pub mod materializer;
pub mod service;
pub mod session;
pub mod snapshot;
pub mod staleness;
pub mod stats;

pub use cache::CacheState;
pub use config::{duration_from_millis, duration_from_secs, ConfigError, SyncConfig};
pub use decoder::{decode_event, WeatherUpdate};
pub use error::{IconFailure, MalformedUpdate, SyncError};
pub use materializer::{IconMaterializer, IconOutcome};
pub use service::WeatherSync;
pub use session::{TransportSession, UpdateEvent};
pub use snapshot::{Freshness, TempRange, WeatherIcon, WeatherSnapshot, UNKNOWN_TEMP};
pub use staleness::StalenessPolicy;
pub use stats::{StatsSnapshot, SyncStats};

pub use companion::LinkState;
