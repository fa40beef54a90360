use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{BrightnessModel, DaycycleError, Result};

/// Top-level configuration structure for the application.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub playback: PlaybackConfig,
    pub brightness: BrightnessModel,
}

impl AppConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.playback.validate()?;
        self.brightness.validate()
    }
}

/// Transport cadence and step sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Wall-clock time between two ticks while playing.
    pub tick_interval_ms: u64,
    /// Hours added to the clock position per tick.
    pub tick_hours: f64,
    /// Hours moved by `next` and `previous`.
    pub step_hours: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            tick_hours: 1.0,
            step_hours: 2.0,
        }
    }
}

impl PlaybackConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(DaycycleError::invalid_config(
                "playback.tick_interval_ms must be positive",
            ));
        }
        for (name, hours) in [("tick_hours", self.tick_hours), ("step_hours", self.step_hours)] {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(DaycycleError::invalid_config(format!(
                    "playback.{name} must be a positive number of hours"
                )));
            }
        }
        Ok(())
    }
}
