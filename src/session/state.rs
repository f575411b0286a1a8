use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bridge::BridgeError;

/// Lifecycle phase of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Recording,
    Stopping,
    Error,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Observable recording-session state.
///
/// Owned exclusively by the session controller; the presentation layer only
/// ever sees snapshots of it. All writes go through the methods below so the
/// invariants hold at every observable instant:
/// - `audio_level` is nonzero only while `Recording`, and always in [0, 1]
/// - starting a session resets `audio_level`, `elapsed_seconds`, `live_text`
/// - `last_transcription` is only written on successful completion
/// - `error` is set only in `Error` and cleared on the way out of it
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    pub status: SessionStatus,

    /// Normalized amplitude in [0.0, 1.0]; meaningful only while recording.
    pub audio_level: f32,

    /// Whole seconds since the session started, driven by the ticker.
    pub elapsed_seconds: u64,

    /// Working transcript buffer for incremental recognition results.
    pub live_text: String,

    /// Result of the last completed session; survives `reset`.
    pub last_transcription: Option<String>,

    /// Why the session is in `Error`, when it is.
    pub error: Option<BridgeError>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.status == SessionStatus::Recording
    }

    /// Clear the ephemeral fields. `last_transcription` survives.
    pub(crate) fn reset_ephemeral(&mut self) {
        self.audio_level = 0.0;
        self.elapsed_seconds = 0;
        self.live_text.clear();
    }

    /// Enter `Recording`: ephemerals reset first, stale error cleared.
    pub(crate) fn begin_recording(&mut self) {
        self.reset_ephemeral();
        self.error = None;
        self.status = SessionStatus::Recording;
    }

    pub(crate) fn begin_stopping(&mut self) {
        self.status = SessionStatus::Stopping;
        // a nonzero level is only valid while recording
        self.audio_level = 0.0;
    }

    /// Return to `Idle` after a successful stop. Forces the level to zero so
    /// a late audio-level event from the closing stream cannot linger.
    pub(crate) fn settle_idle(&mut self) {
        self.status = SessionStatus::Idle;
        self.audio_level = 0.0;
    }

    /// Enter `Error` with a stored reason.
    pub(crate) fn fail(&mut self, reason: BridgeError) {
        self.status = SessionStatus::Error;
        self.audio_level = 0.0;
        self.error = Some(reason);
    }

    /// Store an amplitude sample, clamped to [0, 1]. Dropped unless recording.
    pub(crate) fn set_audio_level(&mut self, level: f32) {
        if self.status == SessionStatus::Recording {
            self.audio_level = level.clamp(0.0, 1.0);
        }
    }

    pub(crate) fn tick(&mut self) {
        if self.status == SessionStatus::Recording {
            self.elapsed_seconds += 1;
        }
    }
}

/// Captured audio handed off to the transcription collaborator when a
/// session completes. The byte format is owned by the capture engine.
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    pub session_id: String,
    pub captured_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub audio: Vec<u8>,
}
