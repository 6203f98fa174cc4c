//! Property-based tests for the snapshot invariants.
//! Arbitrary interleavings of valid updates, junk, other topics, deletions
//! and clock jumps must never leave a half-known temperature pair, and the
//! freshness window must never move backwards.

mod common;

use common::weather_event;
use companion::{WeatherItem, WEATHER_PATH};
use embassy_time::{Duration, Instant};
use platform::DataEvent;
use proptest::prelude::*;
use weather_sync::{decode_event, CacheState, Freshness, StalenessPolicy, UNKNOWN_TEMP};

#[derive(Debug, Clone)]
enum Step {
    Weather(i32, i32),
    Junk(Vec<u8>),
    OtherTopic(i32, i32),
    Deleted,
    Advance(u64),
    Rewind(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-1_200i32..=1_200, -1_200i32..=1_200).prop_map(|(h, l)| Step::Weather(h, l)),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(Step::Junk),
        (-150i32..=150, -150i32..=150).prop_map(|(h, l)| Step::OtherTopic(h, l)),
        Just(Step::Deleted),
        (0u64..200_000).prop_map(Step::Advance),
        (0u64..5_000).prop_map(Step::Rewind),
    ]
}

proptest! {
    #[test]
    fn temperatures_are_known_or_unknown_together(steps in proptest::collection::vec(step(), 1..60)) {
        let policy = StalenessPolicy::new(Duration::from_secs(86_400));
        let mut now_secs: u64 = 10_000;
        let cache = CacheState::new(Instant::from_secs(now_secs));
        let mut last_seen = cache.snapshot().last_updated_at;

        for step in steps {
            let event = match step {
                Step::Weather(high, low) => Some(weather_event(&WeatherItem::new(high, low))),
                Step::Junk(bytes) => Some(DataEvent::changed(WEATHER_PATH, bytes)),
                Step::OtherTopic(high, low) => Some(DataEvent::changed(
                    "/elsewhere",
                    WeatherItem::new(high, low).encode().unwrap_or_default(),
                )),
                Step::Deleted => Some(DataEvent::deleted(WEATHER_PATH)),
                Step::Advance(secs) => {
                    now_secs = now_secs.saturating_add(secs);
                    None
                }
                Step::Rewind(secs) => {
                    now_secs = now_secs.saturating_sub(secs);
                    None
                }
            };
            let now = Instant::from_secs(now_secs);
            if let Some(event) = event {
                if let Ok(Some(update)) = decode_event(&event) {
                    cache.accept_update(update.temps, now);
                }
            }
            policy.enforce(&cache, now);

            let snap = cache.snapshot();
            prop_assert_eq!(snap.high_temp() == UNKNOWN_TEMP, snap.low_temp() == UNKNOWN_TEMP);
            prop_assert!(snap.last_updated_at >= last_seen);
            if snap.freshness == Freshness::Stale {
                prop_assert!(snap.temps.is_none() && snap.icon.is_none());
            }
            last_seen = snap.last_updated_at;
        }
    }

    #[test]
    fn implausible_temperatures_never_reach_the_cache(high in any::<i32>(), low in any::<i32>()) {
        let cache = CacheState::new(Instant::from_secs(0));
        if let Ok(Some(update)) = decode_event(&weather_event(&WeatherItem::new(high, low))) {
            cache.accept_update(update.temps, Instant::from_secs(1));
        }
        let snap = cache.snapshot();
        let plausible = (-150..=150).contains(&high) && (-150..=150).contains(&low);
        prop_assert_eq!(snap.temps.is_some(), plausible);
    }
}
