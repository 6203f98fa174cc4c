//! Runtime tunables of the sync cache.

use embassy_time::{Duration, TICK_HZ};
use platform::config::{ICON_FETCH_TIMEOUT, LINK_CONNECT_TIMEOUT, WEATHER_STALE_AFTER};

/// Environment variable overriding [`SyncConfig::stale_after`] (seconds).
pub const ENV_STALE_AFTER_SECS: &str = "WEATHER_STALE_AFTER_SECS";
/// Environment variable overriding [`SyncConfig::icon_timeout`] (milliseconds).
pub const ENV_ICON_TIMEOUT_MS: &str = "WEATHER_ICON_TIMEOUT_MS";
/// Environment variable overriding [`SyncConfig::connect_timeout`] (milliseconds).
pub const ENV_CONNECT_TIMEOUT_MS: &str = "WEATHER_CONNECT_TIMEOUT_MS";
/// Environment variable enabling the staleness watchdog (period in seconds, 0 = off).
pub const ENV_WATCHDOG_SECS: &str = "WEATHER_WATCHDOG_SECS";

/// Largest tick count a configured duration may hold. Timers add the
/// duration to the current instant, so half the range is kept free.
const MAX_TICKS: u64 = u64::MAX / 2;

/// A configuration value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Not a whole number.
    #[error("{var}={value:?} is not a whole number")]
    NotANumber {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },
    /// Too large to represent as a timer duration.
    #[error("{var}={value} is out of range")]
    OutOfRange {
        /// Variable name
        var: &'static str,
        /// Parsed value
        value: u64,
    },
}

/// `secs` seconds as a [`Duration`], or [`ConfigError::OutOfRange`] if it
/// does not fit the tick counter.
pub fn duration_from_secs(var: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    fits(var, secs).map(|()| Duration::from_secs(secs))
}

/// `ms` milliseconds as a [`Duration`], or [`ConfigError::OutOfRange`] if
/// it does not fit the tick counter.
pub fn duration_from_millis(var: &'static str, ms: u64) -> Result<Duration, ConfigError> {
    fits(var, ms).map(|()| Duration::from_millis(ms))
}

fn fits(var: &'static str, value: u64) -> Result<(), ConfigError> {
    match value.checked_mul(TICK_HZ) {
        Some(ticks) if ticks <= MAX_TICKS => Ok(()),
        _ => Err(ConfigError::OutOfRange { var, value }),
    }
}

/// Tunables for one [`WeatherSync`](crate::WeatherSync) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Age after which the snapshot is wiped.
    pub stale_after: Duration,
    /// Bound on handshake + download of one icon.
    pub icon_timeout: Duration,
    /// Bound on one connect handshake.
    pub connect_timeout: Duration,
    /// Period of the staleness watchdog; `None` checks only at read time.
    pub watchdog_period: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stale_after: WEATHER_STALE_AFTER,
            icon_timeout: ICON_FETCH_TIMEOUT,
            connect_timeout: LINK_CONNECT_TIMEOUT,
            watchdog_period: None,
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by the `WEATHER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(secs) = parse(&lookup, ENV_STALE_AFTER_SECS)? {
            config.stale_after = duration_from_secs(ENV_STALE_AFTER_SECS, secs)?;
        }
        if let Some(ms) = parse(&lookup, ENV_ICON_TIMEOUT_MS)? {
            config.icon_timeout = duration_from_millis(ENV_ICON_TIMEOUT_MS, ms)?;
        }
        if let Some(ms) = parse(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            config.connect_timeout = duration_from_millis(ENV_CONNECT_TIMEOUT_MS, ms)?;
        }
        if let Some(secs) = parse(&lookup, ENV_WATCHDOG_SECS)? {
            config.watchdog_period = match secs {
                0 => None,
                secs => Some(duration_from_secs(ENV_WATCHDOG_SECS, secs)?),
            };
        }
        Ok(config)
    }
}

fn parse(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber { var, value }),
    }
}
