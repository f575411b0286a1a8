use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};

use loqa_dictate::settings::{default_settings_path, SettingsStore};
use loqa_dictate::{Config, LoopbackEngine, Widget};

#[derive(Debug, Parser)]
#[command(name = "loqa-dictate", about = "Voice dictation widget, loopback demo")]
struct Args {
    /// Config file base path (extension optional)
    #[arg(long, default_value = "config/loqa-dictate")]
    config: String,

    /// Demo session length in seconds
    #[arg(long, default_value_t = 3)]
    seconds: u64,

    /// Write the captured WAV here
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);

    let settings_path = cfg
        .settings_path
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(default_settings_path);
    let store = SettingsStore::load(settings_path)?;
    info!(
        "settings: style {:?}, transcription via {:?}, polish via {:?}",
        store.settings().current_style,
        store.settings().transcription_provider,
        store.settings().polish_provider,
    );

    let engine = LoopbackEngine::new(cfg.engine.loopback());
    let (handoff_tx, mut handoff_rx) = mpsc::unbounded_channel();
    let widget = Widget::spawn(Box::new(engine.clone()), &engine, handoff_tx).await?;

    info!("toggling a {}s demo session via the hotkey", args.seconds);
    engine.press_hotkey();
    tokio::time::sleep(Duration::from_secs(args.seconds)).await;
    engine.press_hotkey();

    match tokio::time::timeout(Duration::from_secs(5), handoff_rx.recv()).await {
        Ok(Some(captured)) => {
            info!(
                "captured session {}: {}s, {} bytes",
                captured.session_id,
                captured.duration_seconds,
                captured.audio.len()
            );
            if let Some(path) = &args.output {
                std::fs::write(path, &captured.audio)?;
                info!("wrote capture to {}", path.display());
            }
        }
        Ok(None) | Err(_) => warn!("no capture arrived; final state {:?}", widget.state()),
    }

    let state = widget.state();
    info!(
        "final status: {:?}, elapsed {}s, level {:.2}",
        state.status, state.elapsed_seconds, state.audio_level
    );

    widget.close().await;
    Ok(())
}
