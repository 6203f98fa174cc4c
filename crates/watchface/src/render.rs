//! Console renderer: turns face state plus the weather snapshot into the
//! text a real renderer would paint.

use ui::{FaceState, IconSlot, WeatherLine};
use weather_sync::WeatherSnapshot;

/// Map a snapshot onto the presentation model.
pub fn weather_line(snapshot: &WeatherSnapshot) -> WeatherLine {
    WeatherLine::new(
        snapshot.temps.map(|t| (t.high(), t.low())),
        snapshot.has_icon(),
    )
}

/// `HH:MM:SS` for a UTC time of day.
pub fn clock_text(unix_secs: u64) -> String {
    let of_day = unix_secs % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        of_day / 3_600,
        (of_day % 3_600) / 60,
        of_day % 60
    )
}

/// One frame as text. Ambient frames show only the time, tagged when
/// anti-aliasing is off.
pub fn frame(face: &FaceState, unix_secs: u64, snapshot: &WeatherSnapshot) -> String {
    let time = clock_text(unix_secs);
    if !face.show_weather() {
        return if face.antialias() {
            time
        } else {
            format!("{time}  [low-bit]")
        };
    }
    let line = weather_line(snapshot);
    let icon = match line.icon {
        IconSlot::Synced => "[icon]",
        IconSlot::Placeholder => "[placeholder]",
    };
    format!("{time}  {icon}{}{}", line.high, line.low)
}
