//! Widget event pump
//!
//! One task owns the session controller and everything that feeds it: UI
//! intents, the two engine event streams, and the elapsed-time ticker. All
//! of them meet in a single `select!` loop, so controller entry points run
//! strictly one at a time and the no-op-under-reentrancy rule of the state
//! machine is all the serialization the widget needs.

use futures::{FutureExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bridge::{
    decode_level, BridgeError, CommandBridge, EventBridge, EventChannel, EventStream,
};
use crate::session::{CapturedAudio, ElapsedTicker, SessionController, SessionState};

/// User intents into the controller. A hotkey toggle is not an intent; it
/// arrives through the event bridge like any other engine event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    Stop,
    Reset,
}

enum Message {
    Intent(Intent),
    /// Result delivered by the downstream transcription collaborator.
    Transcription(String),
}

/// Handle to a running widget pump.
///
/// Dropping the handle (or calling [`Widget::close`]) tears the pump down:
/// the message channel closes, the loop exits, and both event subscriptions
/// are released by their guards on the way out. A command still in flight at
/// that point resolves into the dying task and mutates nothing.
pub struct Widget {
    messages: mpsc::UnboundedSender<Message>,
    snapshots: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl Widget {
    /// Subscribe to both engine channels and spawn the pump.
    ///
    /// Subscription failures surface here, before anything is spawned, so a
    /// half-wired widget never exists.
    pub async fn spawn(
        bridge: Box<dyn CommandBridge>,
        events: &dyn EventBridge,
        handoff: mpsc::UnboundedSender<CapturedAudio>,
    ) -> Result<Self, BridgeError> {
        let levels = events.subscribe(EventChannel::AudioLevel).await?;
        let toggles = events.subscribe(EventChannel::ToggleRecording).await?;

        let controller = SessionController::new(bridge, handoff);
        let snapshots = controller.subscribe();
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(controller, levels, toggles, message_rx));

        Ok(Self {
            messages: message_tx,
            snapshots,
            task,
        })
    }

    pub fn start(&self) {
        let _ = self.messages.send(Message::Intent(Intent::Start));
    }

    pub fn stop(&self) {
        let _ = self.messages.send(Message::Intent(Intent::Stop));
    }

    pub fn reset(&self) {
        let _ = self.messages.send(Message::Intent(Intent::Reset));
    }

    /// Hand a finished transcription to the session.
    pub fn deliver_transcription(&self, text: impl Into<String>) {
        let _ = self.messages.send(Message::Transcription(text.into()));
    }

    /// Copy the last transcription to the OS clipboard, fire and forget.
    /// Returns whether there was anything to copy.
    pub fn copy_last_transcription(&self) -> bool {
        match self.snapshots.borrow().last_transcription.clone() {
            Some(text) => {
                crate::clipboard::copy_text(text);
                true
            }
            None => false,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> SessionState {
        self.snapshots.borrow().clone()
    }

    /// Snapshot stream for re-rendering on change.
    pub fn snapshots(&self) -> watch::Receiver<SessionState> {
        self.snapshots.clone()
    }

    /// Tear down and wait for the pump to finish.
    pub async fn close(self) {
        let Self { messages, task, .. } = self;
        drop(messages);
        let _ = task.await;
    }
}

async fn run(
    mut controller: SessionController,
    mut levels: EventStream,
    mut toggles: EventStream,
    mut messages: mpsc::UnboundedReceiver<Message>,
) {
    info!("widget pump started");

    controller.sync_with_backend().await;

    let mut ticker = ElapsedTicker::new();
    let mut levels_open = true;
    let mut toggles_open = true;

    loop {
        tokio::select! {
            maybe_message = messages.recv() => match maybe_message {
                Some(Message::Intent(Intent::Start)) => {
                    if controller.start().await {
                        discard_raced_toggles(&mut toggles);
                    }
                }
                Some(Message::Intent(Intent::Stop)) => {
                    if controller.stop().await {
                        discard_raced_toggles(&mut toggles);
                    }
                }
                Some(Message::Intent(Intent::Reset)) => controller.reset(),
                Some(Message::Transcription(text)) => controller.on_transcription(text),
                // every widget handle is gone: tear down
                None => break,
            },

            maybe_payload = levels.next(), if levels_open => match maybe_payload {
                Some(payload) => match decode_level(&payload) {
                    Ok(level) => controller.on_audio_level(level),
                    Err(e) => controller.on_transport_error(e),
                },
                None => {
                    levels_open = false;
                    controller.on_transport_error(BridgeError::BackendUnavailable(
                        format!("{} channel closed", EventChannel::AudioLevel),
                    ));
                }
            },

            maybe_signal = toggles.next(), if toggles_open => match maybe_signal {
                Some(_) => {
                    if controller.on_toggle().await {
                        discard_raced_toggles(&mut toggles);
                    }
                }
                None => {
                    toggles_open = false;
                    controller.on_transport_error(BridgeError::BackendUnavailable(
                        format!("{} channel closed", EventChannel::ToggleRecording),
                    ));
                }
            },

            _ = ticker.tick() => controller.on_tick(),
        }

        // The ticker is armed exactly while the session records.
        let recording = controller.state().is_recording();
        if recording && !ticker.is_armed() {
            ticker.arm();
        } else if !recording && ticker.is_armed() {
            ticker.disarm();
        }
    }

    if controller.state().is_recording() {
        warn!("widget torn down while recording; engine keeps the capture");
    }
    info!("widget pump stopped");
    // levels/toggles drop here and their guards release both subscriptions,
    // on this path and on any panic unwinding through the loop
}

/// Drop toggles that arrived while a start/stop command was in flight.
///
/// A toggle racing an in-flight command is a no-op, not a deferred second
/// request: the hotkey pressed twice during one stop must not restart the
/// session the moment it settles.
fn discard_raced_toggles(toggles: &mut EventStream) {
    while let Some(Some(_)) = toggles.next().now_or_never() {
        info!("discarding toggle that raced an in-flight command");
    }
}
