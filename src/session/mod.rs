//! Recording session lifecycle
//!
//! This module owns the only stateful part of the widget:
//! - `SessionState` - the observable session data model and its invariants
//! - `SessionController` - the state machine driving the command bridge
//! - `ElapsedTicker` - the 1 Hz timer active while a session is open

mod controller;
mod state;
mod ticker;

pub use controller::SessionController;
pub use state::{CapturedAudio, SessionState, SessionStatus};
pub use ticker::ElapsedTicker;
