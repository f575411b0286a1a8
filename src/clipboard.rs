//! One-shot clipboard hand-off
//!
//! The widget copies the last transcription out to the OS clipboard on
//! request. This lives outside the session controller's concurrency domain:
//! fire and forget, failure logged only.

use tracing::{debug, warn};

/// Write `text` to the system clipboard in the background.
pub fn copy_text(text: String) {
    tokio::task::spawn_blocking(move || match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text) {
            Ok(()) => debug!("transcription copied to clipboard"),
            Err(e) => warn!("clipboard write failed: {}", e),
        },
        Err(e) => warn!("clipboard unavailable: {}", e),
    });
}
