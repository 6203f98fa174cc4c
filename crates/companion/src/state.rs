//! Companion link state tracker.

use platform::SuspendCause;

/// Where the watch stands with the phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No connection and no handshake in flight.
    #[default]
    Disconnected,
    /// Handshake started, not finished.
    Connecting,
    /// Connected; events may arrive.
    Connected,
}

/// Tracks the link state and a few counters for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LinkTracker {
    state: LinkState,
    connects: u32,
    failures: u32,
    suspensions: u32,
    last_suspend: Option<SuspendCause>,
}

impl LinkTracker {
    /// Create a new, disconnected tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handshake has started.
    pub fn on_connect_started(&mut self) {
        self.state = LinkState::Connecting;
    }

    /// The handshake finished.
    pub fn on_connected(&mut self) {
        self.state = LinkState::Connected;
        self.connects = self.connects.saturating_add(1);
    }

    /// The handshake failed or timed out.
    pub fn on_connect_failed(&mut self) {
        self.state = LinkState::Disconnected;
        self.failures = self.failures.saturating_add(1);
    }

    /// The transport suspended the connection. State is unchanged; the
    /// transport resumes on its own or ends the stream.
    pub fn on_suspended(&mut self, cause: SuspendCause) {
        self.suspensions = self.suspensions.saturating_add(1);
        self.last_suspend = Some(cause);
    }

    /// The connection is gone (released locally or ended by the peer).
    pub fn on_disconnected(&mut self) {
        self.state = LinkState::Disconnected;
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Returns `true` if connected.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Successful handshakes so far
    pub fn connects(&self) -> u32 {
        self.connects
    }

    /// Failed handshakes so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Suspensions reported so far
    pub fn suspensions(&self) -> u32 {
        self.suspensions
    }

    /// Cause of the most recent suspension
    pub fn last_suspend(&self) -> Option<SuspendCause> {
        self.last_suspend
    }
}
