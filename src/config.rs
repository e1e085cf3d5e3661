/*!
 * Configuration types for irods-demo
 */

use crate::error::{DemoError, Result};
use irods_core_interface::{PackingPolicy, DEFAULT_PACKING_BUFFER_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Fallbacks for connection options missing from the command line
    #[serde(default)]
    pub connection: ConnectionDefaults,

    /// Native client library settings
    #[serde(default)]
    pub client: ClientSettings,
}

/// Connection option fallbacks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDefaults {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub zone: Option<String>,

    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub source: Option<String>,
}

/// Settings of the native protocol client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Bytes buffered before a write packet is sent
    #[serde(default = "default_buffer_size")]
    pub put_buffer_size: usize,

    /// Bytes requested per read packet
    #[serde(default = "default_buffer_size")]
    pub get_buffer_size: usize,

    /// Name the server records for this client
    #[serde(default = "default_application_name")]
    pub application_name: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            put_buffer_size: default_buffer_size(),
            get_buffer_size: default_buffer_size(),
            application_name: default_application_name(),
        }
    }
}

impl ClientSettings {
    pub fn packing_policy(&self) -> PackingPolicy {
        PackingPolicy {
            put_buffer_size: self.put_buffer_size,
            get_buffer_size: self.get_buffer_size,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including protocol frames
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_buffer_size() -> usize {
    DEFAULT_PACKING_BUFFER_SIZE
}

fn default_application_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

impl DemoConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DemoError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: DemoConfig = toml::from_str(&contents)
            .map_err(|e| DemoError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.client.put_buffer_size == 0 || self.client.get_buffer_size == 0 {
            return Err(DemoError::Config(
                "client buffer sizes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
