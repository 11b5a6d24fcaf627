//! Runtime configuration.
//!
//! Defaults-first TOML configuration loaded from `~/.winops/config.toml`.
//! A missing file is not an error; a malformed or out-of-range one is.
//!
//! ```toml
//! # ~/.winops/config.toml
//! grace_secs = 30
//! poll_interval_ms = 100
//! capture_buffer_bytes = 1048576
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Seconds a foreground launch may block before being promoted to a
/// tracked, still-running process with partial output.
pub const DEFAULT_GRACE_SECS: u64 = 30;
/// How often exit watchers poll a child for completion.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
/// Capacity of each captured stream buffer.
pub const DEFAULT_CAPTURE_BUFFER_BYTES: usize = 1024 * 1024;

/// Tunables for process supervision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinopsConfig {
    /// Grace interval for foreground launches, in seconds.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,

    /// Exit-watcher poll interval, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-stream capture buffer capacity, in bytes. Oldest output is
    /// evicted once a chatty child exceeds it.
    #[serde(default = "default_capture_buffer_bytes")]
    pub capture_buffer_bytes: usize,
}

fn default_grace_secs() -> u64 {
    DEFAULT_GRACE_SECS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_capture_buffer_bytes() -> usize {
    DEFAULT_CAPTURE_BUFFER_BYTES
}

impl Default for WinopsConfig {
    fn default() -> Self {
        Self {
            grace_secs: DEFAULT_GRACE_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            capture_buffer_bytes: DEFAULT_CAPTURE_BUFFER_BYTES,
        }
    }
}

impl WinopsConfig {
    /// Load configuration from the user config file, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        match user_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path. A missing file yields the
    /// defaults; parse and validation failures are surfaced.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::IoError { source: e }),
        };

        let config: WinopsConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would disable supervision outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grace_secs == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "grace_secs must be non-zero".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "poll_interval_ms must be non-zero".to_string(),
            });
        }
        if self.capture_buffer_bytes == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "capture_buffer_bytes must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn grace_interval(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".winops").join("config.toml"))
}
