//! Sunshine watch face, desktop simulator
//!
//! Runs the weather sync cache against a simulated phone over the loopback
//! link and prints each frame the face would draw.
//!
//! # Architecture
//!
//! ```text
//! SimulatedPhone ─▶ LoopbackPeer ═▶ LoopbackLink ─▶ WeatherSync
//!                                                       ↓ current_snapshot
//!                        render thread (FaceState, visibility schedule)
//! ```
//!
//! # Running
//!
//! ```bash
//! cargo run -p watchface -- --duration-secs 30 --visible-secs 10 --hidden-secs 5
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod phone;
pub mod render;
pub mod sim;

pub use phone::{forecast, Condition, Forecast, SimulatedPhone};
pub use sim::{run, SimOptions};
