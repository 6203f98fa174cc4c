//! Simulated phone: publishes a weather item with a PNG icon on an interval.

use std::io::Cursor;

use companion::{WeatherItem, WEATHER_PATH};
use embassy_time::{Duration, Timer};
use image::{ImageBuffer, ImageFormat, Rgba};
use platform::loopback::LoopbackPeer;

/// Icon edge length in pixels.
pub const ICON_SIZE: u32 = 32;

/// Sky conditions the simulated forecast cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Sun
    Clear,
    /// Grey cloud
    Clouds,
    /// Blue drops
    Rain,
}

impl Condition {
    fn colour(self) -> Rgba<u8> {
        match self {
            Self::Clear => Rgba([255, 200, 0, 255]),
            Self::Clouds => Rgba([170, 170, 170, 255]),
            Self::Rain => Rgba([40, 110, 230, 255]),
        }
    }
}

/// One simulated forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecast {
    /// Day's high
    pub high: i32,
    /// Day's low
    pub low: i32,
    /// Sky condition
    pub condition: Condition,
}

/// Deterministic forecast for publish round `round`.
pub fn forecast(round: u32) -> Forecast {
    let step = i32::try_from(round % 12).unwrap_or(0);
    let high = 60_i32.saturating_add(step);
    let low = high.saturating_sub(15);
    let condition = match round % 3 {
        0 => Condition::Clear,
        1 => Condition::Clouds,
        _ => Condition::Rain,
    };
    Forecast {
        high,
        low,
        condition,
    }
}

/// Render the icon for `condition` as a PNG: a filled disc on transparency.
#[allow(clippy::arithmetic_side_effects)] // coordinates are bounded by ICON_SIZE
pub fn icon_png(condition: Condition) -> Result<Vec<u8>, image::ImageError> {
    let centre = i64::from(ICON_SIZE / 2);
    let radius = centre - 2;
    let colour = condition.colour();
    let img = ImageBuffer::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let dx = i64::from(x) - centre;
        let dy = i64::from(y) - centre;
        if dx * dx + dy * dy <= radius * radius {
            colour
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// The phone half of the loopback link, plus its publishing schedule.
pub struct SimulatedPhone {
    peer: LoopbackPeer,
    with_icons: bool,
}

impl SimulatedPhone {
    /// Phone publishing through `peer`. Without icons, items carry
    /// temperatures only.
    pub fn new(peer: LoopbackPeer, with_icons: bool) -> Self {
        Self { peer, with_icons }
    }

    /// Publish the forecast for `round`.
    pub fn publish(&self, round: u32) -> anyhow::Result<Forecast> {
        let forecast = forecast(round);
        let mut item = WeatherItem::new(forecast.high, forecast.low);
        if self.with_icons {
            let png = icon_png(forecast.condition)?;
            item = item.with_icon(self.peer.put_asset(png));
        }
        let payload = item
            .encode()
            .map_err(|e| anyhow::anyhow!("encoding weather item: {e}"))?;
        self.peer.put_data_item(WEATHER_PATH, payload);
        tracing::info!(
            round,
            high = forecast.high,
            low = forecast.low,
            condition = ?forecast.condition,
            "phone published weather"
        );
        Ok(forecast)
    }

    /// Publish every `interval`, `rounds` times (forever if `None`).
    pub async fn run(self, interval: Duration, rounds: Option<u32>) {
        let mut round = 0_u32;
        while rounds.map_or(true, |limit| round < limit) {
            if let Err(e) = self.publish(round) {
                tracing::warn!(error = %e, "phone failed to publish");
            }
            round = round.saturating_add(1);
            Timer::after(interval).await;
        }
    }
}
