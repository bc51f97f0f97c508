//! Configuration schema

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rules::DEFAULT_CANDIDATES;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Payment methods offered in the method search
    #[serde(default = "default_payment_methods")]
    pub payment_methods: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            payment_methods: default_payment_methods(),
        }
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Path to log file
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Maximum number of activity log entries kept in the TUI
    #[serde(default = "default_log_retention")]
    pub log_retention: usize,

    /// Theme name
    #[serde(default)]
    pub theme: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            log_retention: default_log_retention(),
            theme: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_retention() -> usize {
    1000
}

fn default_payment_methods() -> Vec<String> {
    DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect()
}
