//! Bridge seams between the widget and the capture engine
//!
//! The engine lives out of process; the widget only ever talks to it through
//! two contracts:
//! - `CommandBridge` - request/response calls (start, stop, status query)
//! - `EventBridge` - push streams the engine emits (audio levels, hotkey toggles)

pub mod command;
pub mod event;

pub use command::CommandBridge;
pub use event::{decode_level, EventBridge, EventChannel, EventStream, SubscriptionGuard};

use thiserror::Error;

/// Failures surfaced by either bridge.
///
/// These are caught at the session controller boundary and stored on the
/// session state; nothing above the controller ever sees them as a panic or
/// an unhandled result.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeError {
    /// The engine rejected the call or the channel is gone.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Capture device access was refused.
    #[error("capture permission denied")]
    PermissionDenied,

    /// An event or response payload failed to decode.
    #[error("malformed payload: {0}")]
    TransportDecode(String),
}
