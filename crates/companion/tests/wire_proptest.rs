//! Property-based tests for the data item wire format.
//! The watch decodes whatever the radio hands it, so decoding must never
//! panic and every phone-built weather item must survive the trip.

use companion::{decode_data_map, DataValue, WeatherItem, KEY_HIGH, KEY_LOW};
use platform::AssetRef;

proptest::proptest! {
    /// Arbitrary bytes either decode or return an error, never panic.
    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(proptest::num::u8::ANY, 0..256)) {
        let _ = decode_data_map(&bytes);
    }

    /// Any weather item the phone builds decodes to the same temperatures.
    #[test]
    fn weather_item_survives_encoding(high in -150i32..=150, low in -150i32..=150, with_icon in proptest::bool::ANY) {
        let mut item = WeatherItem::new(high, low);
        if with_icon {
            item = item.with_icon(AssetRef::new("icon"));
        }
        let payload = item.encode().map_err(|e| proptest::test_runner::TestCaseError::fail(e.to_string()))?;
        let map = decode_data_map(&payload).map_err(|e| proptest::test_runner::TestCaseError::fail(e.to_string()))?;
        proptest::prop_assert_eq!(map.get(KEY_HIGH).and_then(DataValue::as_int), Some(high));
        proptest::prop_assert_eq!(map.get(KEY_LOW).and_then(DataValue::as_int), Some(low));
        proptest::prop_assert_eq!(map.len(), if with_icon { 3 } else { 2 });
    }

    /// A payload cut short anywhere is rejected.
    #[test]
    fn truncated_payload_is_rejected(cut in 1usize..8) {
        let payload = WeatherItem::new(67, 48).encode().map_err(|e| proptest::test_runner::TestCaseError::fail(e.to_string()))?;
        let keep = payload.len().saturating_sub(cut);
        proptest::prop_assert!(decode_data_map(payload.get(..keep).unwrap_or_default()).is_err());
    }
}
