//! Error types for the property bridge

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bridge setup
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors raised while configuring or starting the bridge
///
/// The exported property functions never fail this way; absence is
/// reported through their sentinel return values.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// `void_bridge_init` called while a bridge is live
    #[error("Property bridge is already initialized")]
    AlreadyInitialized,

    /// Operation needs a live bridge
    #[error("Property bridge is not initialized")]
    NotInitialized,

    /// Config file could not be read
    #[error("Failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`BridgeConfig`](crate::BridgeConfig)
    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Path handed across the C ABI is not valid UTF-8
    #[error("Config path is not valid UTF-8")]
    InvalidPath,
}

impl BridgeError {
    /// Create a config read error
    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Status code reported across the C ABI
    pub fn status(&self) -> i32 {
        match self {
            Self::AlreadyInitialized => 1,
            Self::NotInitialized => 2,
            Self::ConfigRead { .. } => 3,
            Self::ConfigParse(_) => 4,
            Self::InvalidPath => 5,
        }
    }
}
