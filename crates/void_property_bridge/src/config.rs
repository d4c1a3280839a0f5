//! Bridge configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `VOID_BRIDGE_TRACE=1`, `VOID_BRIDGE_LOG=debug`
//! 2. Config file passed to `void_bridge_init`
//! 3. Defaults
//!
//! # Example Config File
//!
//! ```toml
//! trace_calls = false      # log every exported call at trace level
//! install_logger = true    # install env_logger on init
//! log_filter = "info"      # default filter when RUST_LOG is unset
//! ```

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime options for the property bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Log every exported call at trace level
    pub trace_calls: bool,
    /// Install `env_logger` when the bridge starts
    pub install_logger: bool,
    /// Filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            trace_calls: false,
            install_logger: true,
            log_filter: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| BridgeError::config_read(path, e))?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded bridge config from {}", path.display());
        Ok(config)
    }

    /// Parse config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Override fields from `VOID_BRIDGE_*` variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("VOID_BRIDGE_TRACE").ok().as_deref(),
            std::env::var("VOID_BRIDGE_LOG").ok().as_deref(),
        );
    }

    fn apply_overrides(&mut self, trace: Option<&str>, filter: Option<&str>) {
        if let Some(trace) = trace {
            self.trace_calls = trace == "1" || trace.eq_ignore_ascii_case("true");
        }
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            self.log_filter = filter.to_string();
        }
    }

    /// Install `env_logger` if enabled; an existing logger is left in place
    pub fn install_logger(&self) {
        if !self.install_logger {
            return;
        }
        let installed = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_filter.as_str()),
        )
        .try_init();
        if installed.is_err() {
            log::debug!("Logger already installed, keeping it");
        }
    }
}
