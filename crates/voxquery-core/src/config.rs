use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoxQueryError};

/// Top-level configuration for VoxQuery.
///
/// Loaded from `~/.voxquery/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxQueryConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl VoxQueryConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoxQueryConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file that may not exist.
    ///
    /// Returns `Ok(None)` when there is no file at `path`; read and parse
    /// failures of an existing file are still errors.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: VoxQueryConfig = toml::from_str(&content)?;
                info!("Configuration loaded from {}", path.display());
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VoxQueryError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// How a language switch waits before restarting recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartStrategy {
    /// Restart after `restart_delay_ms`, regardless of the recognizer.
    #[default]
    Delay,
    /// Restart as soon as the recognizer reports its session ended, with
    /// `restart_delay_ms` as an upper bound.
    AwaitEnd,
}

/// Speech recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Initial recognition language, either a code (`ger`) or a locale tag (`de-DE`).
    pub default_language: String,
    /// Delay between aborting and restarting on a language switch.
    pub restart_delay_ms: u64,
    pub restart_strategy: RestartStrategy,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            default_language: "en-US".to_string(),
            restart_delay_ms: 400,
            restart_strategy: RestartStrategy::Delay,
        }
    }
}

/// Overlay behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Start listening as soon as the overlay opens.
    pub listen_on_open: bool,
}
