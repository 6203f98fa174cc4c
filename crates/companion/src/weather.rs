//! Weather item schema.
//!
//! The phone publishes one data item at [`WEATHER_PATH`] whose map holds the
//! day's high and low as ints and, optionally, the condition icon as an asset
//! reference under [`KEY_ICON`].

use alloc::vec::Vec;

use platform::AssetRef;

use crate::data_map::{encode_data_map, DataMap, DataValue, EncodeError};

/// Path of the weather data item.
pub const WEATHER_PATH: &str = "/sunshineWeather";

/// Key of the low temperature (int).
pub const KEY_LOW: &str = "low";

/// Key of the high temperature (int).
pub const KEY_HIGH: &str = "high";

/// Key of the condition icon (asset, optional).
pub const KEY_ICON: &str = "iconbm";

/// A weather update as the phone builds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherItem {
    /// Day's high temperature
    pub high: i32,
    /// Day's low temperature
    pub low: i32,
    /// Condition icon, if the phone attached one
    pub icon: Option<AssetRef>,
}

impl WeatherItem {
    /// Temperatures only, no icon.
    pub fn new(high: i32, low: i32) -> Self {
        Self {
            high,
            low,
            icon: None,
        }
    }

    /// Attach an icon asset.
    #[must_use]
    pub fn with_icon(mut self, icon: AssetRef) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Map form, as stored in the data item.
    pub fn to_data_map(&self) -> DataMap {
        let mut map = DataMap::new();
        map.insert(KEY_HIGH.into(), DataValue::Int(self.high));
        map.insert(KEY_LOW.into(), DataValue::Int(self.low));
        if let Some(icon) = &self.icon {
            map.insert(KEY_ICON.into(), DataValue::Asset(icon.clone()));
        }
        map
    }

    /// Encoded payload ready to publish at [`WEATHER_PATH`].
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encode_data_map(&self.to_data_map())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data_map::decode_data_map;

    #[test]
    fn test_map_uses_protocol_keys() {
        let map = WeatherItem::new(67, 48)
            .with_icon(AssetRef::new("sun"))
            .to_data_map();
        assert_eq!(map.get("high"), Some(&DataValue::Int(67)));
        assert_eq!(map.get("low"), Some(&DataValue::Int(48)));
        assert_eq!(
            map.get("iconbm"),
            Some(&DataValue::Asset(AssetRef::new("sun")))
        );
    }

    #[test]
    fn test_icon_key_absent_without_icon() {
        let map = WeatherItem::new(10, 2).to_data_map();
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key(KEY_ICON));
    }

    #[test]
    fn test_encoded_item_decodes_to_same_map() {
        let item = WeatherItem::new(70, 50).with_icon(AssetRef::new("rain"));
        let decoded = decode_data_map(&item.encode().unwrap()).unwrap();
        assert_eq!(decoded, item.to_data_map());
    }
}
