//! Transport session: the only owner of the live companion link.
//!
//! `connect()` and `disconnect()` return immediately; they queue a command
//! for a control task, so they can be called from the render thread. The
//! control task applies commands in order. A connect spawns a pump that
//! runs the bounded handshake and then forwards every data event, in
//! delivery order, to the update channel. A disconnect aborts the pump and
//! releases the link.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use companion::{LinkState, LinkTracker};
use embassy_time::{with_timeout, Duration};
use platform::{CompanionLink, DataEvent, LinkEvent};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SyncError;
use crate::stats::SyncStats;

/// A raw inbound update: topic (data path) plus payload.
pub type UpdateEvent = DataEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Connect,
    Disconnect,
}

/// Connect/disconnect lifecycle of one companion link.
pub struct TransportSession<L: CompanionLink> {
    commands: mpsc::UnboundedSender<Command>,
    tracker: Arc<Mutex<LinkTracker>>,
    _link: PhantomData<fn() -> L>,
}

impl<L: CompanionLink> TransportSession<L> {
    /// Start the control task on `runtime`. Data events are sent to
    /// `events`; the link stays down until [`TransportSession::connect`].
    pub fn start(
        link: Arc<L>,
        connect_timeout: Duration,
        events: mpsc::UnboundedSender<UpdateEvent>,
        stats: Arc<SyncStats>,
        runtime: &Handle,
    ) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let tracker = Arc::new(Mutex::new(LinkTracker::new()));
        let ctx = PumpContext {
            link,
            events,
            tracker: Arc::clone(&tracker),
            stats,
            connect_timeout,
        };
        runtime.spawn(control(ctx, rx));
        Self {
            commands,
            tracker,
            _link: PhantomData,
        }
    }

    /// Establish the connection, or keep the current one. Never blocks.
    pub fn connect(&self) {
        self.send(Command::Connect);
    }

    /// Release the connection. Never blocks; safe when not connected.
    pub fn disconnect(&self) {
        self.send(Command::Disconnect);
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!(?command, "session control task is gone; command dropped");
        }
    }

    /// Current link state.
    pub fn state(&self) -> LinkState {
        self.tracker().state()
    }

    /// Copy of the link tracker (state plus counters).
    pub fn tracker(&self) -> LinkTracker {
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

struct PumpContext<L: CompanionLink> {
    link: Arc<L>,
    events: mpsc::UnboundedSender<UpdateEvent>,
    tracker: Arc<Mutex<LinkTracker>>,
    stats: Arc<SyncStats>,
    connect_timeout: Duration,
}

impl<L: CompanionLink> Clone for PumpContext<L> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
            events: self.events.clone(),
            tracker: Arc::clone(&self.tracker),
            stats: Arc::clone(&self.stats),
            connect_timeout: self.connect_timeout,
        }
    }
}

impl<L: CompanionLink> PumpContext<L> {
    fn track(&self, f: impl FnOnce(&mut LinkTracker)) {
        let mut tracker = self.tracker.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *tracker);
    }

    fn state(&self) -> LinkState {
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }
}

async fn control<L: CompanionLink>(
    ctx: PumpContext<L>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut pump: Option<JoinHandle<()>> = None;

    while let Some(command) = commands.recv().await {
        match command {
            Command::Connect => {
                let state = ctx.state();
                if pump.as_ref().is_some_and(|p| !p.is_finished())
                    && state != LinkState::Disconnected
                {
                    tracing::debug!(?state, "connect requested; link already up");
                    continue;
                }
                if let Some(stale) = pump.take() {
                    stale.abort();
                }
                ctx.track(LinkTracker::on_connect_started);
                tracing::debug!(
                    timeout_ms = ctx.connect_timeout.as_millis(),
                    "connecting to companion"
                );
                pump = Some(tokio::spawn(run_link(ctx.clone())));
            }
            Command::Disconnect => {
                let was_up = ctx.state() != LinkState::Disconnected;
                if let Some(p) = pump.take() {
                    p.abort();
                }
                ctx.link.disconnect().await;
                ctx.track(LinkTracker::on_disconnected);
                if was_up {
                    tracing::info!("disconnected from companion");
                }
            }
        }
    }

    // Session dropped.
    if let Some(p) = pump.take() {
        p.abort();
    }
    ctx.link.disconnect().await;
    ctx.track(LinkTracker::on_disconnected);
}

async fn run_link<L: CompanionLink>(ctx: PumpContext<L>) {
    let failure = match with_timeout(ctx.connect_timeout, ctx.link.connect()).await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(SyncError::TransportUnavailable(e.to_string())),
        Err(_) => Some(SyncError::TransportUnavailable(format!(
            "handshake exceeded {} ms",
            ctx.connect_timeout.as_millis()
        ))),
    };
    if let Some(err) = failure {
        ctx.track(LinkTracker::on_connect_failed);
        ctx.stats.record_connect_failure();
        tracing::warn!(error = %err, "connection failed; retrying on next visibility change");
        return;
    }
    ctx.track(LinkTracker::on_connected);
    tracing::info!("connected to companion");

    while let Some(event) = ctx.link.next_event().await {
        match event {
            LinkEvent::Data(batch) => {
                for update in batch {
                    if ctx.events.send(update).is_err() {
                        return;
                    }
                }
            }
            LinkEvent::Suspended(cause) => {
                ctx.track(|t| t.on_suspended(cause));
                tracing::info!(?cause, "connection suspended");
            }
        }
    }

    ctx.track(LinkTracker::on_disconnected);
    tracing::info!("companion event stream ended");
}
