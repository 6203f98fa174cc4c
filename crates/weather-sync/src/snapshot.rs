//! The weather snapshot shared between the sync path and the renderer.

use std::sync::Arc;

use embassy_time::Instant;

/// Legacy "no data yet" sentinel for a temperature.
///
/// Snapshots hold `Option<TempRange>` instead; the sentinel is still what
/// [`WeatherSnapshot::high_temp`] and [`WeatherSnapshot::low_temp`] report
/// when unknown, and an inbound update carrying it is rejected.
pub const UNKNOWN_TEMP: i32 = -1000;

/// Lowest temperature an update may carry.
pub const MIN_PLAUSIBLE_TEMP: i32 = -150;

/// Highest temperature an update may carry.
pub const MAX_PLAUSIBLE_TEMP: i32 = 150;

/// Returns `true` if `value` lies in the plausible temperature domain.
pub const fn is_plausible_temp(value: i32) -> bool {
    value >= MIN_PLAUSIBLE_TEMP && value <= MAX_PLAUSIBLE_TEMP
}

/// A day's high and low, always known together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempRange {
    high: i32,
    low: i32,
}

impl TempRange {
    /// Pair `high` and `low`, or `None` if either is outside the plausible
    /// domain.
    pub const fn new(high: i32, low: i32) -> Option<Self> {
        if is_plausible_temp(high) && is_plausible_temp(low) {
            Some(Self { high, low })
        } else {
            None
        }
    }

    /// High temperature
    pub const fn high(&self) -> i32 {
        self.high
    }

    /// Low temperature
    pub const fn low(&self) -> i32 {
        self.low
    }
}

/// A decoded condition icon: tightly packed RGBA8 rows.
#[derive(Clone, PartialEq, Eq)]
pub struct WeatherIcon {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl WeatherIcon {
    /// Wrap decoded pixels. Returns `None` if `rgba` does not hold exactly
    /// `width * height` RGBA pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = u64::from(width)
            .checked_mul(u64::from(height))?
            .checked_mul(4)?;
        (u64::try_from(rgba.len()).ok()? == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixel data, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }
}

impl std::fmt::Debug for WeatherIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherIcon")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Staleness state of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Within the freshness window (or never reset).
    #[default]
    Fresh,
    /// Window exceeded; the cache has been wiped and waits for a new update.
    Stale,
}

/// Best-known weather, as read by the renderer.
///
/// Cloning is cheap: the icon is shared behind an [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSnapshot {
    /// High/low pair, `None` until the first accepted update.
    pub temps: Option<TempRange>,
    /// Last successfully materialized icon.
    pub icon: Option<Arc<WeatherIcon>>,
    /// When the last update was accepted (creation time before that).
    pub last_updated_at: Instant,
    /// Staleness state.
    pub freshness: Freshness,
    /// Sequence number of the most recently accepted update.
    pub update_seq: u64,
    /// Sequence number of the update whose icon is installed. Icon results
    /// from updates at or below this number are discarded.
    pub icon_generation: u64,
}

impl WeatherSnapshot {
    /// All-unknown snapshot whose freshness window starts at `created_at`.
    pub fn unknown(created_at: Instant) -> Self {
        Self {
            temps: None,
            icon: None,
            last_updated_at: created_at,
            freshness: Freshness::Fresh,
            update_seq: 0,
            icon_generation: 0,
        }
    }

    /// High temperature, or [`UNKNOWN_TEMP`].
    pub fn high_temp(&self) -> i32 {
        self.temps.map_or(UNKNOWN_TEMP, |t| t.high())
    }

    /// Low temperature, or [`UNKNOWN_TEMP`].
    pub fn low_temp(&self) -> i32 {
        self.temps.map_or(UNKNOWN_TEMP, |t| t.low())
    }

    /// Returns `true` if an icon is cached.
    pub fn has_icon(&self) -> bool {
        self.icon.is_some()
    }
}
