//! Persisted widget settings
//!
//! A flat key-value document loaded once at process start and written back
//! on every mutation. The schema is forward compatible: unknown keys in the
//! file are ignored, missing keys take their defaults. The session
//! controller only ever reads these; the settings screen owns mutation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Text style applied by the polish step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Formal,
    Casual,
    ExtremelyCasual,
}

impl Default for Style {
    fn default() -> Self {
        Self::Casual
    }
}

/// Speech-to-text provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionProvider {
    Groq,
    Openai,
    Deepgram,
}

impl Default for TranscriptionProvider {
    fn default() -> Self {
        Self::Groq
    }
}

/// Style-rewriting provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolishProvider {
    Groq,
    Gemini,
    Openai,
}

impl Default for PolishProvider {
    fn default() -> Self {
        Self::Groq
    }
}

/// The persisted settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub current_style: Style,
    pub transcription_provider: TranscriptionProvider,
    pub polish_provider: PolishProvider,
    pub launch_at_login: bool,
    pub show_in_menu_bar: bool,
    pub play_sounds: bool,
    /// Seconds of silence before a capture is considered finished.
    pub silence_threshold: u32,
    /// Preferred style per application identifier.
    pub app_styles: HashMap<String, Style>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            current_style: Style::default(),
            transcription_provider: TranscriptionProvider::default(),
            polish_provider: PolishProvider::default(),
            launch_at_login: false,
            show_in_menu_bar: true,
            play_sounds: true,
            silence_threshold: 3,
            app_styles: HashMap::new(),
        }
    }
}

impl Settings {
    /// Style to use for a given application, falling back to the current
    /// global style.
    pub fn style_for_app(&self, app_id: &str) -> Style {
        self.app_styles
            .get(app_id)
            .copied()
            .unwrap_or(self.current_style)
    }
}

/// Default location of the settings document.
pub fn default_settings_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("loqa-dictate").join("settings.json")
}

/// File-backed settings store. Every setter persists immediately.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load the document at `path`, falling back to defaults when the file
    /// does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let settings = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("malformed settings document: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no settings document at {}, using defaults", path.display());
                Settings::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read settings: {}", path.display()))
            }
        };

        Ok(Self { path, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_style(&mut self, style: Style) -> Result<()> {
        self.settings.current_style = style;
        self.save()
    }

    pub fn set_transcription_provider(&mut self, provider: TranscriptionProvider) -> Result<()> {
        self.settings.transcription_provider = provider;
        self.save()
    }

    pub fn set_polish_provider(&mut self, provider: PolishProvider) -> Result<()> {
        self.settings.polish_provider = provider;
        self.save()
    }

    pub fn set_launch_at_login(&mut self, value: bool) -> Result<()> {
        self.settings.launch_at_login = value;
        self.save()
    }

    pub fn set_show_in_menu_bar(&mut self, value: bool) -> Result<()> {
        self.settings.show_in_menu_bar = value;
        self.save()
    }

    pub fn set_play_sounds(&mut self, value: bool) -> Result<()> {
        self.settings.play_sounds = value;
        self.save()
    }

    pub fn set_silence_threshold(&mut self, seconds: u32) -> Result<()> {
        self.settings.silence_threshold = seconds;
        self.save()
    }

    pub fn set_app_style(&mut self, app_id: impl Into<String>, style: Style) -> Result<()> {
        self.settings.app_styles.insert(app_id.into(), style);
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&self.settings)
            .context("failed to serialize settings")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("failed to write settings: {}", self.path.display()))?;
        Ok(())
    }
}
