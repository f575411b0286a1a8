//! Capture engine implementations
//!
//! The production engine lives in another process and is reached purely
//! through the bridge traits. What ships here is the in-process loopback
//! engine the binary and the integration tests run against.

pub mod loopback;

pub use loopback::{LoopbackConfig, LoopbackEngine};
