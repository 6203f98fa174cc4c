//! Weather line: the high/low glyphs and icon slot painted under the date.

use core::fmt::Write as _;

/// A rendered temperature, e.g. `" 67°"`.
pub type TempGlyph = heapless::String<16>;

/// Glyph painted when the temperature is unknown.
pub const UNKNOWN_GLYPH: &str = " ?°";

/// What goes in the icon slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSlot {
    /// The icon synced from the phone.
    Synced,
    /// The bundled placeholder, shown while no icon is cached.
    Placeholder,
}

/// Everything the renderer needs for the weather line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherLine {
    /// High temperature glyph
    pub high: TempGlyph,
    /// Low temperature glyph (painted in the secondary colour)
    pub low: TempGlyph,
    /// Icon to paint left of the temperatures
    pub icon: IconSlot,
}

impl WeatherLine {
    /// Build the line from the cached values. `temps` is `(high, low)`.
    pub fn new(temps: Option<(i32, i32)>, has_icon: bool) -> Self {
        let (high, low) = match temps {
            Some((high, low)) => (temperature_glyph(high), temperature_glyph(low)),
            None => (unknown_glyph(), unknown_glyph()),
        };
        Self {
            high,
            low,
            icon: if has_icon {
                IconSlot::Synced
            } else {
                IconSlot::Placeholder
            },
        }
    }

    /// Line shown before any data arrived.
    pub fn unknown() -> Self {
        Self::new(None, false)
    }
}

impl Default for WeatherLine {
    fn default() -> Self {
        Self::unknown()
    }
}

/// `" {value}°"`
pub fn temperature_glyph(value: i32) -> TempGlyph {
    let mut glyph = TempGlyph::new();
    // 16 bytes hold any i32 plus the space and the two-byte degree sign.
    let _ = write!(glyph, " {value}°");
    glyph
}

fn unknown_glyph() -> TempGlyph {
    let mut glyph = TempGlyph::new();
    let _ = glyph.push_str(UNKNOWN_GLYPH);
    glyph
}
