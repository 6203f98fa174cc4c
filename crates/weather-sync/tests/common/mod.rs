//! Shared helpers for the weather-sync integration tests.

#![allow(dead_code, clippy::expect_used, clippy::panic)]

use std::io::Cursor;

use companion::{WeatherItem, WEATHER_PATH};
use image::{ImageBuffer, ImageFormat, Rgba};
use platform::DataEvent;

/// Encode a solid-colour PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgba([255u8, 180, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

/// A changed weather item as the phone would publish it.
pub fn weather_event(item: &WeatherItem) -> DataEvent {
    DataEvent::changed(WEATHER_PATH, item.encode().expect("encode weather item"))
}

/// Poll `cond` until it holds, failing the test after two seconds.
pub async fn eventually(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for: {what}");
}
