//! Configuration for a service built on this crate.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Identity and defaults for one OS-registered service.
///
/// The identity strings default to empty; a real deployment must set a
/// name that is unique on the machine (plus a display name and description)
/// before installing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Internal name registered with the service-control manager
    pub name: String,

    /// Human-readable name shown by service management tools
    pub display_name: String,

    /// Description shown by service management tools
    pub description: String,

    /// Operation timeout, in seconds, for any sockets the service opens
    pub socket_timeout_secs: u64,

    /// Log level used when RUST_LOG is not set
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: String::new(),
            description: String::new(),
            socket_timeout_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the file named by `SVCFRAME_CONFIG` (or
    /// `svcframe.json` in the working directory), falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("SVCFRAME_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("svcframe.json"));
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file {:?}", path))
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs(self.socket_timeout_secs)
    }
}
