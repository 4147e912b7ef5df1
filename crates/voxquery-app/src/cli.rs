//! CLI argument definitions for the VoxQuery application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use voxquery_core::VoxQueryConfig;

/// VoxQuery — dictate search queries through a voice overlay.
#[derive(Parser, Debug)]
#[command(name = "voxquery", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Initial recognition language, as a code (`ger`) or locale tag (`de-DE`).
    #[arg(long = "language")]
    pub language: Option<String>,

    /// Start listening as soon as the overlay opens.
    #[arg(long = "listen-on-open")]
    pub listen_on_open: bool,

    /// Run as if the platform had no speech recognition.
    #[arg(long = "no-capability")]
    pub no_capability: bool,

    /// Print the session report as JSON on exit.
    #[arg(long = "report")]
    pub report: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VOXQUERY_CONFIG env var > platform default (~/.voxquery/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("VOXQUERY_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut VoxQueryConfig) {
        if let Some(ref language) = self.language {
            config.recognition.default_language = language.clone();
        }
        if self.listen_on_open {
            config.overlay.listen_on_open = true;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".voxquery").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".voxquery").join("config.toml");
    }
    PathBuf::from("config.toml")
}
