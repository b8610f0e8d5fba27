use crate::core::DeliveryMode;
use crate::playback::{PlaybackConfig, AUTO_RUN_INTERVAL, FAST_FORWARD_STEP_SIZE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Persistent settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub default_mode: DeliveryMode,
    pub auto_run_interval_ms: u64,
    pub fast_forward_step: usize,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            default_mode: DeliveryMode::Batch,
            auto_run_interval_ms: AUTO_RUN_INTERVAL.as_millis() as u64,
            fast_forward_step: FAST_FORWARD_STEP_SIZE,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("surface-playback").join("settings.json"))
    }

    /// Load from the user config directory, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            warn!("Ignoring settings: {:#}", e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            auto_run_interval: Duration::from_millis(self.auto_run_interval_ms),
            fast_forward_step: self.fast_forward_step.max(1),
            ..PlaybackConfig::default()
        }
    }
}
