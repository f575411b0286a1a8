use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::state::{CapturedAudio, SessionState, SessionStatus};
use crate::bridge::{BridgeError, CommandBridge};

/// The recording-session state machine.
///
/// Single point of truth for session state: the UI issues intents through
/// the widget pump, the event bridge feeds the `on_*` handlers, and nothing
/// else mutates the state. The controller runs on one logical thread, so
/// correctness under overlapping start/stop/toggle requests comes from the
/// status guards at each entry point (a precondition miss is a no-op), not
/// from locks. That also bounds the bridge to at most one in-flight command.
pub struct SessionController {
    bridge: Box<dyn CommandBridge>,
    state: SessionState,
    session_id: String,
    snapshots: watch::Sender<SessionState>,
    handoff: mpsc::UnboundedSender<CapturedAudio>,
}

impl SessionController {
    pub fn new(
        bridge: Box<dyn CommandBridge>,
        handoff: mpsc::UnboundedSender<CapturedAudio>,
    ) -> Self {
        let (snapshots, _) = watch::channel(SessionState::new());
        Self {
            bridge,
            state: SessionState::new(),
            session_id: String::new(),
            snapshots,
            handoff,
        }
    }

    /// Current state, for callers holding the controller itself.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Snapshot stream for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.snapshots.subscribe()
    }

    /// One-shot startup probe of the engine's own recording flag.
    ///
    /// A disagreement is logged, never silently adopted: the next toggle
    /// resolves it through the normal start path, where the engine's
    /// rejection surfaces as a retryable error.
    pub async fn sync_with_backend(&mut self) {
        match self.bridge.is_recording().await {
            Ok(true) => warn!("engine reports an active capture at startup"),
            Ok(false) => {}
            Err(e) => debug!("startup status query failed: {}", e),
        }
    }

    /// Start a new session. No-op unless `Idle` or `Error`.
    ///
    /// Ephemeral fields are cleared before the backend call goes out; on
    /// failure the session lands in `Error` with those fields still at their
    /// reset values. Returns whether a backend command was issued.
    pub async fn start(&mut self) -> bool {
        match self.state.status {
            SessionStatus::Idle | SessionStatus::Error => {}
            status => {
                debug!(?status, "start request ignored");
                return false;
            }
        }

        self.session_id = format!("session-{}", Uuid::new_v4());
        self.state.begin_recording();
        self.publish();

        info!("starting recording session: {}", self.session_id);

        if let Err(e) = self.bridge.start_recording().await {
            warn!("failed to start recording: {}", e);
            self.state.fail(e);
            self.publish();
        }
        true
    }

    /// Stop the running session. No-op unless `Recording`.
    ///
    /// On success the captured buffer is handed to the transcription
    /// collaborator and the session settles back to `Idle`. Returns whether
    /// a backend command was issued.
    pub async fn stop(&mut self) -> bool {
        if self.state.status != SessionStatus::Recording {
            debug!(status = ?self.state.status, "stop request ignored");
            return false;
        }

        let duration_seconds = self.state.elapsed_seconds;
        self.state.begin_stopping();
        self.publish();

        match self.bridge.stop_recording().await {
            Ok(audio) => {
                info!(
                    "recording session {} captured {} bytes",
                    self.session_id,
                    audio.len()
                );
                self.state.settle_idle();
                self.publish();

                let captured = CapturedAudio {
                    session_id: self.session_id.clone(),
                    captured_at: Utc::now(),
                    duration_seconds,
                    audio,
                };
                if self.handoff.send(captured).is_err() {
                    warn!("no transcription collaborator attached, captured audio dropped");
                }
            }
            Err(e) => {
                warn!("failed to stop recording: {}", e);
                self.state.fail(e);
                self.publish();
            }
        }
        true
    }

    /// Clear the ephemeral fields without touching `last_transcription`.
    /// Permitted from any state.
    pub fn reset(&mut self) {
        self.state.reset_ephemeral();
        self.publish();
    }

    /// Hotkey toggle: the same logical event as the start/stop buttons.
    /// Returns whether a backend command was issued.
    pub async fn on_toggle(&mut self) -> bool {
        match self.state.status {
            SessionStatus::Idle | SessionStatus::Error => self.start().await,
            SessionStatus::Recording => self.stop().await,
            SessionStatus::Stopping => {
                debug!("toggle ignored while stopping");
                false
            }
        }
    }

    /// Amplitude sample from the event bridge. Clamped; dropped unless
    /// recording.
    pub fn on_audio_level(&mut self, level: f32) {
        self.state.set_audio_level(level);
        self.publish();
    }

    /// One elapsed second from the ticker.
    pub fn on_tick(&mut self) {
        self.state.tick();
        self.publish();
    }

    /// An event stream failed underneath the session (decode error, channel
    /// gone). Routed to `Error` like every other bridge failure.
    pub fn on_transport_error(&mut self, err: BridgeError) {
        warn!("event transport failed: {}", err);
        self.state.fail(err);
        self.publish();
    }

    /// Delivery entry point for the downstream transcription collaborator.
    /// Only writer of `last_transcription`.
    pub fn on_transcription(&mut self, text: String) {
        info!("transcription result received ({} chars)", text.len());
        self.state.last_transcription = Some(text);
        self.publish();
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.clone());
    }
}
