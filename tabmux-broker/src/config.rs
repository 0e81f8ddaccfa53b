//! Broker configuration
//!
//! Loaded from `config.toml` in the XDG config directory; every field
//! has a default so the file is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tabmux_utils::{config_file, socket_path, Result, TabmuxError};

/// Root configuration for the broker daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Unix socket path override (defaults to the XDG runtime location)
    pub socket_path: Option<PathBuf>,
    /// Depth of the broker event queue
    pub event_queue_depth: usize,
    /// Depth of each tab's reply queue
    pub reply_queue_depth: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            event_queue_depth: 256,
            reply_queue_depth: 64,
        }
    }
}

impl BrokerConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let path = config_file();
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TabmuxError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration from string
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| TabmuxError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.event_queue_depth == 0 {
            return Err(TabmuxError::config("event_queue_depth must be at least 1"));
        }
        if self.reply_queue_depth == 0 {
            return Err(TabmuxError::config("reply_queue_depth must be at least 1"));
        }
        Ok(())
    }

    /// Load and validate
    pub fn load_and_validate() -> Result<Self> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// The socket path to bind, honoring the override
    pub fn resolve_socket_path(&self) -> PathBuf {
        self.socket_path.clone().unwrap_or_else(socket_path)
    }
}
