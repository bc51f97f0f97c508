//! Configuration management

mod schema;

pub use schema::{Config, GeneralConfig};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::rules::MethodCatalog;

impl Config {
    /// Load configuration from a file or default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(PathBuf::from)
            .or_else(Self::default_path)
            .context("Could not determine config path")?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Payment method candidates for the method search
    pub fn method_catalog(&self) -> MethodCatalog {
        MethodCatalog::new(self.payment_methods.clone())
    }

    /// Where the TUI writes its log: the configured file or the state directory
    pub fn log_path(&self) -> Option<PathBuf> {
        self.general
            .log_file
            .as_deref()
            .map(crate::expand_path)
            .or_else(|| Self::state_dir().map(|d| d.join("payrule.log")))
    }

    /// Get the default config file path
    /// Uses the platform config directory (via dirs::config_dir), falling back to ~/.config
    pub fn default_path() -> Option<PathBuf> {
        let config_base =
            dirs::config_dir().or_else(|| dirs::home_dir().map(|d| d.join(".config")))?;
        Some(config_base.join("payrule").join("config.toml"))
    }

    /// Get the state directory (logs), falling back to ~/.local/state
    pub fn state_dir() -> Option<PathBuf> {
        dirs::state_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("state")))
            .map(|d| d.join("payrule"))
    }
}
