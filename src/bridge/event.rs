use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::BridgeError;

/// Named push-event streams the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventChannel {
    /// One normalized amplitude sample per message (JSON float).
    AudioLevel,
    /// Global hotkey toggle, no payload.
    ToggleRecording,
}

impl EventChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventChannel::AudioLevel => "audio-level",
            EventChannel::ToggleRecording => "toggle-recording",
        }
    }
}

impl fmt::Display for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Push-event subscription contract.
///
/// Guarantees: payloads arrive in emission order per channel, a channel may
/// have any number of independent subscribers, and dropping or cancelling
/// the returned stream detaches exactly that subscriber.
#[async_trait::async_trait]
pub trait EventBridge: Send + Sync {
    async fn subscribe(&self, channel: EventChannel) -> Result<EventStream, BridgeError>;
}

/// Releases one subscription slot.
///
/// `cancel` is idempotent: the release closure runs at most once no matter
/// how often it is called, and runs on drop if it has not run yet. That
/// makes the release safe from both normal teardown and error paths.
pub struct SubscriptionGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Guard with no release step, for bridges that clean up on drop alone.
    pub fn noop() -> Self {
        Self { release: None }
    }

    pub fn cancel(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Ordered stream of raw event payloads from a single channel.
///
/// Holds its subscription guard, so the subscriber slot lives exactly as
/// long as the stream does.
pub struct EventStream {
    channel: EventChannel,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    guard: SubscriptionGuard,
}

impl EventStream {
    pub fn new(
        channel: EventChannel,
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
        guard: SubscriptionGuard,
    ) -> Self {
        Self { channel, rx, guard }
    }

    pub fn channel(&self) -> EventChannel {
        self.channel
    }

    /// Receive the next payload; `None` once the emitter side is gone.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    /// Detach from the channel. Idempotent; also happens on drop.
    pub fn cancel(&mut self) {
        self.guard.cancel();
    }
}

impl Stream for EventStream {
    type Item = Vec<u8>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("channel", &self.channel)
            .field("guard", &self.guard)
            .finish()
    }
}

/// Decode an `audio-level` payload (a bare JSON float).
pub fn decode_level(payload: &[u8]) -> Result<f32, BridgeError> {
    serde_json::from_slice::<f32>(payload)
        .map_err(|e| BridgeError::TransportDecode(format!("audio-level: {}", e)))
}
