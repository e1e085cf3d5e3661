/*!
 * Command line option parsing
 */

use crate::config::{ConnectionDefaults, LogLevel};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: &str = "1247";
pub const DEFAULT_USER: &str = "anonymous";
pub const DEFAULT_ZONE: &str = "demoZone";
pub const DEFAULT_TARGET: &str = "/path/to/target";
pub const DEFAULT_SOURCE: &str = "/path/to/source";

/// Parsed command line
///
/// Connection options are kept as raw strings; the port is only turned into a
/// number when the connection descriptor is built. `-h` belongs to `--host`, so
/// help is reachable through `--help` alone.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "irods-demo")]
#[command(
    version,
    about = "Write a test string to an iRODS data object, then stream another one to stdout",
    long_about = None,
    disable_help_flag = true
)]
pub struct OptionSet {
    /// iRODS host
    #[arg(short = 'h', long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// iRODS port
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<String>,

    /// iRODS user
    #[arg(short = 'u', long = "user", value_name = "USER")]
    pub user: Option<String>,

    /// iRODS zone
    #[arg(short = 'z', long = "zone", value_name = "ZONE")]
    pub zone: Option<String>,

    /// Target path (written)
    #[arg(short = 't', long = "target", value_name = "PATH")]
    pub target: Option<String>,

    /// Source path (read and copied to stdout)
    #[arg(short = 's', long = "source", value_name = "PATH")]
    pub source: Option<String>,

    /// Path to a TOML config file supplying defaults and client settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevelArg,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Write JSON logs to this file instead of stderr
    #[arg(long = "log", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevelArg {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

impl OptionSet {
    /// Parse the process arguments
    pub fn from_env() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Fill options absent from the command line with config file values
    pub fn with_defaults(mut self, defaults: &ConnectionDefaults) -> Self {
        fill(&mut self.host, defaults.host.as_ref());
        fill(&mut self.port, defaults.port.map(|p| p.to_string()).as_ref());
        fill(&mut self.user, defaults.user.as_ref());
        fill(&mut self.zone, defaults.zone.as_ref());
        fill(&mut self.target, defaults.target.as_ref());
        fill(&mut self.source, defaults.source.as_ref());
        self
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Port exactly as given; see `credentials::parse_port`
    pub fn port(&self) -> &str {
        self.port.as_deref().unwrap_or(DEFAULT_PORT)
    }

    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or(DEFAULT_USER)
    }

    pub fn zone(&self) -> &str {
        self.zone.as_deref().unwrap_or(DEFAULT_ZONE)
    }

    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or(DEFAULT_TARGET)
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    /// Effective log level, `--verbose` winning over `--log-level`
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level.into()
        }
    }
}

fn fill(slot: &mut Option<String>, fallback: Option<&String>) {
    if slot.is_none() {
        *slot = fallback.cloned();
    }
}
