//! Update decoder: raw data events → validated weather records.

use companion::{decode_data_map, DataMap, DataValue, KEY_HIGH, KEY_ICON, KEY_LOW, WEATHER_PATH};
use platform::{AssetRef, DataEvent, DataEventKind};

use crate::error::MalformedUpdate;
use crate::snapshot::{is_plausible_temp, TempRange};

/// A validated weather update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherUpdate {
    /// High/low pair
    pub temps: TempRange,
    /// Icon to materialize, if the item carried one
    pub icon: Option<AssetRef>,
}

/// Decode one data event.
///
/// Returns `Ok(None)` for events that are not weather changes (another
/// path, or a deletion); those are not errors. A weather item with a
/// missing or invalid temperature is [`MalformedUpdate`]. An icon key of the
/// wrong type is logged and treated as absent.
pub fn decode_event(event: &DataEvent) -> Result<Option<WeatherUpdate>, MalformedUpdate> {
    if event.kind != DataEventKind::Changed || event.path() != WEATHER_PATH {
        return Ok(None);
    }
    let map = decode_data_map(&event.item.data)?;
    let high = temperature(&map, KEY_HIGH)?;
    let low = temperature(&map, KEY_LOW)?;
    let temps = TempRange::new(high, low).ok_or_else(|| {
        let (key, value) = if is_plausible_temp(high) {
            (KEY_LOW, low)
        } else {
            (KEY_HIGH, high)
        };
        MalformedUpdate::Implausible { key, value }
    })?;

    let icon = match map.get(KEY_ICON) {
        None => None,
        Some(DataValue::Asset(asset)) => Some(asset.clone()),
        Some(other) => {
            tracing::warn!(
                key = KEY_ICON,
                found = other.type_name(),
                "icon key is not an asset; treating as absent"
            );
            None
        }
    };

    Ok(Some(WeatherUpdate { temps, icon }))
}

fn temperature(map: &DataMap, key: &'static str) -> Result<i32, MalformedUpdate> {
    let value = map.get(key).ok_or(MalformedUpdate::MissingTemperature(key))?;
    value.as_int().ok_or(MalformedUpdate::NotAnInt {
        key,
        found: value.type_name(),
    })
}
