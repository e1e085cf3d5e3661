/*!
 * irods-demo - minimal iRODS data grid client
 *
 * Authenticates against a zone, writes a fixed test string to one data object
 * and streams another back out:
 * - Command line options with config file fallbacks
 * - Terminal password collection
 * - Packing stream decorators over raw remote streams
 * - A native iRODS protocol client behind the `irods-core-interface` traits
 */

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod options;
pub mod protocol;
pub mod session;
pub mod stream;
pub mod transfer;

// Re-export commonly used types
pub use config::{ClientSettings, DemoConfig, LogLevel};
pub use error::{DemoError, Result};
pub use options::OptionSet;
pub use transfer::{TransferReport, TEST_PAYLOAD};

pub use irods_core_interface::{GridError, IrodsAccount};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
