//! End-to-end scenarios: mock phone link → WeatherSync → snapshot reads.
//!
//! The mock clock drives staleness; handshake and icon bounds use real
//! (short) timeouts.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;

use common::{eventually, png, weather_event};
use companion::WeatherItem;
use embassy_time::Duration;
use platform::mocks::{MockAsset, MockAssetOutcome, MockClock, MockCompanionLink};
use platform::{AssetRef, CompanionLink, DataEvent};
use tokio::runtime::Handle;
use weather_sync::{Freshness, LinkState, SyncConfig, WeatherSync, UNKNOWN_TEMP};

const DAY_SECS: u64 = 86_400;

type Face = WeatherSync<MockCompanionLink, MockClock>;

fn start_with(config: SyncConfig) -> (Face, Arc<MockCompanionLink>, Arc<MockClock>) {
    let link = Arc::new(MockCompanionLink::new());
    let clock = Arc::new(MockClock::starting_at_secs(1_000));
    let sync = WeatherSync::start(
        Arc::clone(&link),
        Arc::clone(&clock),
        config,
        &Handle::current(),
    );
    (sync, link, clock)
}

fn start() -> (Face, Arc<MockCompanionLink>, Arc<MockClock>) {
    start_with(SyncConfig {
        icon_timeout: Duration::from_millis(500),
        connect_timeout: Duration::from_millis(500),
        ..SyncConfig::default()
    })
}

#[tokio::test]
async fn test_icon_from_first_update_survives_icon_less_update() {
    let (sync, link, _clock) = start();
    let icon_a = AssetRef::new("ref-A");
    link.insert_asset(icon_a.clone(), MockAsset::bytes(png(8, 8)));
    sync.on_became_visible();

    link.push_data(vec![weather_event(
        &WeatherItem::new(67, 48).with_icon(icon_a),
    )]);
    eventually("temps applied", || sync.stats().accepted == 1).await;
    let snap = sync.current_snapshot();
    assert_eq!((snap.high_temp(), snap.low_temp()), (67, 48));

    eventually("icon A resolved", || sync.stats().icons_resolved == 1).await;
    assert_eq!(sync.current_snapshot().icon.unwrap().width(), 8);

    link.push_data(vec![weather_event(&WeatherItem::new(70, 50))]);
    eventually("second update", || sync.stats().accepted == 2).await;
    let snap = sync.current_snapshot();
    assert_eq!((snap.high_temp(), snap.low_temp()), (70, 50));
    assert_eq!(snap.icon.unwrap().width(), 8);
    assert_eq!(link.asset_calls(), 1);
}

#[tokio::test]
async fn test_other_topic_leaves_cache_untouched() {
    let (sync, link, _clock) = start();
    sync.on_became_visible();
    let before = sync.current_snapshot();

    let payload = WeatherItem::new(10, 5).encode().unwrap();
    link.push_data(vec![
        DataEvent::changed("/sunshineNews", payload),
        DataEvent::deleted("/sunshineWeather"),
    ]);
    eventually("both ignored", || sync.stats().ignored == 2).await;

    assert_eq!(sync.current_snapshot(), before);
    assert_eq!(sync.stats().accepted, 0);
}

#[tokio::test]
async fn test_malformed_update_is_dropped() {
    let (sync, link, _clock) = start();
    sync.on_became_visible();
    link.push_data(vec![weather_event(&WeatherItem::new(67, 48))]);
    eventually("first update", || sync.stats().accepted == 1).await;

    link.push_data(vec![
        DataEvent::changed("/sunshineWeather", vec![0xde, 0xad, 0xbe, 0xef, 0x00]),
        weather_event(&WeatherItem::new(UNKNOWN_TEMP, UNKNOWN_TEMP)),
    ]);
    eventually("both malformed", || sync.stats().malformed == 2).await;

    let snap = sync.current_snapshot();
    assert_eq!((snap.high_temp(), snap.low_temp()), (67, 48));
}

#[tokio::test]
async fn test_icon_timeout_keeps_previous_icon_and_never_blocks_reads() {
    let (sync, link, _clock) = start_with(SyncConfig {
        icon_timeout: Duration::from_millis(100),
        ..SyncConfig::default()
    });
    let good = AssetRef::new("good");
    let slow = AssetRef::new("slow");
    link.insert_asset(good.clone(), MockAsset::bytes(png(4, 4)));
    link.insert_asset(
        slow.clone(),
        MockAsset::bytes(png(16, 16)).delayed(Duration::from_secs(2)),
    );
    sync.on_became_visible();

    link.push_data(vec![weather_event(&WeatherItem::new(60, 40).with_icon(good))]);
    eventually("first icon", || sync.stats().icons_resolved == 1).await;

    link.push_data(vec![weather_event(&WeatherItem::new(61, 41).with_icon(slow))]);
    eventually("second update", || sync.stats().accepted == 2).await;

    let started = std::time::Instant::now();
    let snap = sync.current_snapshot();
    assert!(started.elapsed() < std::time::Duration::from_millis(50));
    assert_eq!(snap.high_temp(), 61);

    eventually("slow icon timed out", || sync.stats().icons_failed == 1).await;
    assert_eq!(sync.current_snapshot().icon.unwrap().width(), 4);
}

#[tokio::test]
async fn test_empty_asset_stream_keeps_previous_icon() {
    let (sync, link, _clock) = start();
    let good = AssetRef::new("good");
    let gone = AssetRef::new("gone");
    link.insert_asset(good.clone(), MockAsset::bytes(png(2, 2)));
    link.insert_asset(
        gone.clone(),
        MockAsset {
            delay: Duration::from_ticks(0),
            outcome: MockAssetOutcome::NoStream,
        },
    );
    sync.on_became_visible();

    link.push_data(vec![weather_event(&WeatherItem::new(20, 10).with_icon(good))]);
    eventually("icon", || sync.stats().icons_resolved == 1).await;
    link.push_data(vec![weather_event(&WeatherItem::new(21, 11).with_icon(gone))]);
    eventually("icon failure", || sync.stats().icons_failed == 1).await;

    assert_eq!(sync.current_snapshot().icon.unwrap().width(), 2);
}

#[tokio::test]
async fn test_asset_fetch_error_keeps_previous_icon() {
    let (sync, link, _clock) = start();
    let good = AssetRef::new("good");
    let broken = AssetRef::new("broken");
    link.insert_asset(good.clone(), MockAsset::bytes(png(3, 3)));
    link.insert_asset(
        broken.clone(),
        MockAsset {
            delay: Duration::from_ticks(0),
            outcome: MockAssetOutcome::Error,
        },
    );
    sync.on_became_visible();

    link.push_data(vec![weather_event(&WeatherItem::new(30, 20).with_icon(good))]);
    eventually("icon", || sync.stats().icons_resolved == 1).await;
    link.push_data(vec![weather_event(&WeatherItem::new(31, 21).with_icon(broken))]);
    eventually("icon failure", || sync.stats().icons_failed == 1).await;

    let snap = sync.current_snapshot();
    assert_eq!(snap.high_temp(), 31);
    assert_eq!(snap.icon.unwrap().width(), 3);
    assert_eq!(sync.stats().icons_resolved, 1);
}

#[tokio::test]
async fn test_icon_fetch_never_reopens_link_after_hide() {
    let (sync, link, _clock) = start();
    let icon = AssetRef::new("icon");
    link.insert_asset(
        icon.clone(),
        MockAsset::bytes(png(2, 2)).delayed(Duration::from_millis(50)),
    );
    sync.on_became_visible();
    eventually("connected", || sync.link_state() == LinkState::Connected).await;

    link.push_data(vec![weather_event(&WeatherItem::new(67, 48).with_icon(icon))]);
    eventually("update", || sync.stats().accepted == 1).await;
    sync.on_became_hidden();
    eventually("released", || {
        !link.is_connected() && sync.link_state() == LinkState::Disconnected
    })
    .await;

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(!link.is_connected());
    assert_eq!(link.connect_calls(), 1);
    assert_eq!(sync.link_state(), LinkState::Disconnected);
}

#[tokio::test]
async fn test_staleness_reset_fires_once_after_a_day() {
    let (sync, link, clock) = start();
    let icon = AssetRef::new("icon");
    link.insert_asset(icon.clone(), MockAsset::bytes(png(2, 2)));
    sync.on_became_visible();
    link.push_data(vec![weather_event(&WeatherItem::new(67, 48).with_icon(icon))]);
    eventually("icon", || sync.stats().icons_resolved == 1).await;

    clock.advance(Duration::from_secs(DAY_SECS + 1));
    let snap = sync.current_snapshot();
    assert_eq!(snap.high_temp(), UNKNOWN_TEMP);
    assert_eq!(snap.low_temp(), UNKNOWN_TEMP);
    assert!(snap.icon.is_none());
    assert_eq!(snap.freshness, Freshness::Stale);

    clock.advance(Duration::from_secs(DAY_SECS));
    let _ = sync.current_snapshot();
    assert_eq!(sync.stats().stale_resets, 1);
}

#[tokio::test]
async fn test_update_before_expiry_refreshes_window() {
    let (sync, link, clock) = start();
    sync.on_became_visible();
    link.push_data(vec![weather_event(&WeatherItem::new(67, 48))]);
    eventually("first update", || sync.stats().accepted == 1).await;

    clock.advance(Duration::from_secs(23 * 3_600));
    link.push_data(vec![weather_event(&WeatherItem::new(70, 50))]);
    eventually("refresh", || sync.stats().accepted == 2).await;

    let snap = sync.current_snapshot();
    assert_eq!(snap.freshness, Freshness::Fresh);
    assert_eq!((snap.high_temp(), snap.low_temp()), (70, 50));

    // 25 h after the first update, 2 h after the second.
    clock.advance(Duration::from_secs(2 * 3_600));
    assert_eq!(sync.current_snapshot().high_temp(), 70);
    assert_eq!(sync.stats().stale_resets, 0);
}

#[tokio::test]
async fn test_update_after_reset_makes_cache_fresh_again() {
    let (sync, link, clock) = start();
    sync.on_became_visible();
    eventually("connected", || sync.link_state() == LinkState::Connected).await;

    clock.advance(Duration::from_secs(DAY_SECS + 1));
    assert_eq!(sync.current_snapshot().freshness, Freshness::Stale);

    link.push_data(vec![weather_event(&WeatherItem::new(55, 33))]);
    eventually("update", || sync.stats().accepted == 1).await;
    let snap = sync.current_snapshot();
    assert_eq!(snap.freshness, Freshness::Fresh);
    assert_eq!(snap.low_temp(), 33);
}

#[tokio::test]
async fn test_watchdog_resets_without_reads() {
    let (sync, link, clock) = start_with(SyncConfig {
        watchdog_period: Some(Duration::from_millis(10)),
        ..SyncConfig::default()
    });
    sync.on_became_visible();
    link.push_data(vec![weather_event(&WeatherItem::new(67, 48))]);
    eventually("update", || sync.stats().accepted == 1).await;

    let mut rx = sync.subscribe();
    rx.mark_unchanged();
    clock.advance(Duration::from_secs(DAY_SECS + 1));
    rx.changed().await.unwrap();

    assert_eq!(rx.borrow().freshness, Freshness::Stale);
    assert_eq!(sync.stats().stale_resets, 1);
}

#[tokio::test]
async fn test_visibility_drives_connection() {
    let (sync, link, _clock) = start();
    assert_eq!(sync.link_state(), LinkState::Disconnected);

    sync.on_became_visible();
    eventually("connected", || sync.link_state() == LinkState::Connected).await;
    assert!(link.is_connected());

    sync.on_became_hidden();
    eventually("released", || {
        !link.is_connected() && sync.link_state() == LinkState::Disconnected
    })
    .await;
    assert_eq!(link.disconnect_calls(), 1);

    sync.on_became_visible();
    eventually("reconnected", || link.connect_calls() == 2).await;
}

#[tokio::test]
async fn test_connect_failure_keeps_last_snapshot() {
    let (sync, link, _clock) = start();
    sync.on_became_visible();
    link.push_data(vec![weather_event(&WeatherItem::new(67, 48))]);
    eventually("update", || sync.stats().accepted == 1).await;

    sync.on_became_hidden();
    eventually("released", || !link.is_connected()).await;
    link.fail_next_connects(1);
    sync.on_became_visible();
    eventually("failure", || sync.stats().connect_failures == 1).await;

    assert_eq!(sync.current_snapshot().high_temp(), 67);
    assert_eq!(sync.link_state(), LinkState::Disconnected);
}
