use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::backend::LoopbackConfig;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub engine: EngineConfig,
    /// Settings document location; defaults to the user config dir.
    pub settings_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub level_interval_ms: u64,
    pub tone_hz: f32,
    pub amplitude: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            engine: EngineConfig::default(),
            settings_path: None,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "loqa-dictate".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let defaults = LoopbackConfig::default();
        Self {
            sample_rate: defaults.sample_rate,
            level_interval_ms: defaults.level_interval.as_millis() as u64,
            tone_hz: defaults.tone_hz,
            amplitude: defaults.amplitude,
        }
    }
}

impl EngineConfig {
    pub fn loopback(&self) -> LoopbackConfig {
        LoopbackConfig {
            sample_rate: self.sample_rate,
            level_interval: Duration::from_millis(self.level_interval_ms),
            tone_hz: self.tone_hz,
            amplitude: self.amplitude,
        }
    }
}

impl Config {
    /// Load from a config file if one exists; every field has a default.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
