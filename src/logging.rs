/*!
 * Logging and tracing initialization
 *
 * Standard output carries the downloaded data object, so human-readable logs
 * always go to stderr.
 */

use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LogLevel;
use crate::error::{DemoError, Result};

/// Initialize structured logging
///
/// The filter is built from `level` alone; `RUST_LOG` is not consulted.
pub fn init_logging(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let env_filter = build_filter(level)?;

    if let Some(log_path) = log_file {
        init_file_logging(log_path, env_filter)?;
    } else {
        init_stderr_logging(env_filter);
    }

    Ok(())
}

/// Filter directive covering this crate and the interface crate
pub fn filter_directive(level: LogLevel) -> String {
    let level = level.to_tracing_level();
    format!("irods_demo={},irods_core_interface={}", level, level)
}

fn build_filter(level: LogLevel) -> Result<EnvFilter> {
    EnvFilter::try_new(filter_directive(level))
        .map_err(|e| DemoError::Config(format!("Failed to create log filter: {}", e)))
}

/// Initialize logging to stderr
fn init_stderr_logging(env_filter: EnvFilter) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_ansi(std::io::stderr().is_terminal())
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Initialize logging to a file
fn init_file_logging(log_path: &Path, env_filter: EnvFilter) -> Result<()> {
    let file = File::create(log_path)
        .map_err(|e| DemoError::Config(format!("Failed to create log file: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(file)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

/// Initialize logging with custom format for testing
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter = EnvFilter::new(filter_directive(LogLevel::Trace));

        let fmt_layer = fmt::layer().with_test_writer().with_target(false).compact();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .ok(); // Ignore error if already initialized
    });
}
