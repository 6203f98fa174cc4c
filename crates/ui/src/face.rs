//! Watch-face mode state and tick policy.

/// Interactive-mode redraw period in milliseconds.
pub const INTERACTIVE_UPDATE_RATE_MS: u64 = 1_000;

/// Result of a visibility change, telling the host which sync hook to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    /// Hidden → visible: connect.
    BecameVisible,
    /// Visible → hidden: disconnect.
    BecameHidden,
    /// No transition.
    Unchanged,
}

/// Visible / ambient flags of one face engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceState {
    visible: bool,
    ambient: bool,
    low_bit_ambient: bool,
}

impl FaceState {
    /// Hidden, interactive.
    pub const fn new() -> Self {
        Self {
            visible: false,
            ambient: false,
            low_bit_ambient: false,
        }
    }

    /// Record visibility and report the transition.
    pub fn set_visible(&mut self, visible: bool) -> VisibilityChange {
        let change = match (self.visible, visible) {
            (false, true) => VisibilityChange::BecameVisible,
            (true, false) => VisibilityChange::BecameHidden,
            _ => VisibilityChange::Unchanged,
        };
        self.visible = visible;
        change
    }

    /// Enter or leave ambient mode. Returns `true` if the mode changed.
    pub fn set_ambient(&mut self, ambient: bool) -> bool {
        let changed = self.ambient != ambient;
        self.ambient = ambient;
        changed
    }

    /// Whether the screen reduces to 1-bit colour in ambient mode.
    pub fn set_low_bit_ambient(&mut self, low_bit: bool) {
        self.low_bit_ambient = low_bit;
    }

    /// Face is on screen
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Face is in ambient mode
    #[must_use]
    pub fn ambient(&self) -> bool {
        self.ambient
    }

    /// Weather line and icon are painted only in interactive mode.
    #[must_use]
    pub fn show_weather(&self) -> bool {
        !self.ambient
    }

    /// Anti-aliasing is off in low-bit ambient mode.
    #[must_use]
    pub fn antialias(&self) -> bool {
        !(self.ambient && self.low_bit_ambient)
    }

    /// The once-per-second redraw runs only while visible and interactive.
    #[must_use]
    pub fn timer_should_run(&self) -> bool {
        self.visible && !self.ambient
    }
}

/// Delay until the next whole multiple of `rate_ms`, so ticks land on the
/// second boundary.
#[must_use]
pub fn next_tick_delay_ms(now_ms: u64, rate_ms: u64) -> u64 {
    now_ms
        .checked_rem(rate_ms)
        .map_or(0, |into_period| rate_ms.saturating_sub(into_period))
}
