pub mod backend;
pub mod bridge;
pub mod clipboard;
pub mod config;
pub mod session;
pub mod settings;
pub mod widget;

pub use backend::{LoopbackConfig, LoopbackEngine};
pub use bridge::{
    BridgeError, CommandBridge, EventBridge, EventChannel, EventStream, SubscriptionGuard,
};
pub use config::Config;
pub use session::{CapturedAudio, ElapsedTicker, SessionController, SessionState, SessionStatus};
pub use settings::{PolishProvider, Settings, SettingsStore, Style, TranscriptionProvider};
pub use widget::{Intent, Widget};
