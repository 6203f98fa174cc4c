//! Application configuration and constants
//!
//! This module defines central configuration values used across the
//! workspace. Naming and timing defaults should reference these constants
//! rather than hardcoding values.

use embassy_time::Duration;

/// The application name
pub const APP_NAME: &str = "Sunshine";

/// How long cached weather stays valid without a new update from the phone.
pub const WEATHER_STALE_AFTER: Duration = Duration::from_secs(86_400);

/// Upper bound on the download + decode of one icon asset.
pub const ICON_FETCH_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Upper bound on a single connect handshake.
pub const LINK_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Full application title
pub const fn app_title() -> &'static str {
    "Sunshine Watch Face"
}

/// Development mode banner
pub const fn dev_banner() -> &'static str {
    "Sunshine Watch Face - Simulator"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_window_is_one_day() {
        assert_eq!(WEATHER_STALE_AFTER.as_secs(), 86_400);
    }

    #[test]
    fn test_icon_timeout_is_five_seconds() {
        assert_eq!(ICON_FETCH_TIMEOUT.as_millis(), 5_000);
    }

    #[test]
    fn test_title_starts_with_app_name() {
        assert!(app_title().starts_with(APP_NAME));
    }
}
