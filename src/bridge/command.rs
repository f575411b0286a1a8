use super::BridgeError;

/// Request/response calls into the capture engine.
///
/// Stateless wrapper: no retries, no timeouts. A failed call is surfaced
/// immediately and the session controller decides what to do with it
/// (currently: single attempt, surface as the error state).
#[async_trait::async_trait]
pub trait CommandBridge: Send + Sync {
    /// Open the capture device and start recording.
    async fn start_recording(&self) -> Result<(), BridgeError>;

    /// Stop recording and return the encoded audio payload.
    ///
    /// The byte format (WAV here, but opaque to the caller) is owned by the
    /// engine; ownership of the buffer transfers to the caller.
    async fn stop_recording(&self) -> Result<Vec<u8>, BridgeError>;

    /// Query whether the engine believes it is currently capturing.
    async fn is_recording(&self) -> Result<bool, BridgeError>;
}
