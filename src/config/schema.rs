//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the management
//! process. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the management process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MgmtConfig {
    /// Listener acquisition settings.
    pub listen: ListenConfig,

    /// Daemonization settings.
    pub daemon: DaemonConfig,
}

/// Listener acquisition configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Listen specs, `[name=]endpoint[,transport]` each.
    pub specs: Vec<String>,

    /// Port applied when an endpoint names none.
    pub default_port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            specs: vec![":80".to_string()],
            default_port: 80,
        }
    }
}

/// Daemonization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Stay attached to the terminal instead of detaching.
    pub foreground: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { foreground: false }
    }
}
