//! irods-core-interface: capability seam between the demo driver and a grid client
//!
//! The demo program only ever needs three things from an iRODS client library:
//!
//! 1. **Authenticate** a connection descriptor and obtain a session
//! 2. **Open for write** a remote data object (truncating any prior content)
//! 3. **Open for read** a remote data object
//!
//! These are expressed as the [`AccessObjectFactory`], [`GridSession`],
//! [`RemoteWrite`] and [`RemoteRead`] traits. The native protocol client and the
//! in-memory test doubles both implement them.
//!
//! # Example
//!
//! ```rust,no_run
//! use irods_core_interface::{AccessObjectFactory, IrodsAccount};
//!
//! async fn show<F: AccessObjectFactory>(factory: &F, account: &IrodsAccount) -> irods_core_interface::Result<()> {
//!     let session = factory.authenticate(account).await?;
//!     let mut input = session.open_read("/tempZone/home/alice/notes.txt").await?;
//!     let mut buf = vec![0u8; 4096];
//!     let n = input.read(&mut buf).await?;
//!     println!("{}", String::from_utf8_lossy(&buf[..n]));
//!     input.close().await
//! }
//! ```

mod account;

pub use account::IrodsAccount;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    /// Any failure while establishing an authenticated session
    #[error("authentication failed for {account}")]
    AuthenticationFailed {
        account: String,
        #[source]
        source: Box<GridError>,
    },

    #[error("could not connect to {endpoint}")]
    Connection {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// Negative status returned by the server
    #[error("server returned {code} ({name}){}", render_messages(.messages))]
    Server {
        code: i32,
        name: &'static str,
        messages: Vec<String>,
    },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_messages(messages: &[String]) -> String {
    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}

impl GridError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, GridError::AuthenticationFailed { .. })
    }

    /// Server status code, if this error came from the server
    pub fn server_code(&self) -> Option<i32> {
        match self {
            GridError::Server { code, .. } => Some(*code),
            GridError::AuthenticationFailed { source, .. } => source.server_code(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;

/// Packet sizes used by the packing stream decorators
///
/// This is client-library configuration: the demo driver never sets or reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingPolicy {
    /// Bytes accumulated before a write packet is sent
    pub put_buffer_size: usize,

    /// Bytes requested per read packet
    pub get_buffer_size: usize,
}

pub const DEFAULT_PACKING_BUFFER_SIZE: usize = 4 * 1024 * 1024;

impl Default for PackingPolicy {
    fn default() -> Self {
        Self {
            put_buffer_size: DEFAULT_PACKING_BUFFER_SIZE,
            get_buffer_size: DEFAULT_PACKING_BUFFER_SIZE,
        }
    }
}

/// Authenticates connection descriptors
#[async_trait]
pub trait AccessObjectFactory: Send + Sync {
    /// Perform the authentication handshake for `account`
    ///
    /// The returned session owns its network connection until it is dropped.
    async fn authenticate(&self, account: &IrodsAccount) -> Result<Box<dyn GridSession>>;
}

/// An authenticated connection to a zone, acting as its own file factory
#[async_trait]
pub trait GridSession: Send + Sync {
    /// The account this session was authenticated as
    fn account(&self) -> &IrodsAccount;

    /// Packet sizes for streams opened through this session
    fn packing_policy(&self) -> PackingPolicy {
        PackingPolicy::default()
    }

    /// Open a raw output stream to `path` in write-truncate mode
    ///
    /// The data object is created if missing; existing content is discarded,
    /// never appended to.
    async fn open_write(&self, path: &str) -> Result<Box<dyn RemoteWrite>>;

    /// Open a raw input stream from `path`
    async fn open_read(&self, path: &str) -> Result<Box<dyn RemoteRead>>;
}

/// Write half of an open data object
#[async_trait]
pub trait RemoteWrite: Send {
    /// Write all of `buf`
    async fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Release the server-side descriptor
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Read half of an open data object
#[async_trait]
pub trait RemoteRead: Send {
    /// Read up to `buf.len()` bytes; `Ok(0)` means end of data
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Release the server-side descriptor
    async fn close(self: Box<Self>) -> Result<()>;
}

/// iRODS paths are absolute and never empty
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GridError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty".to_string(),
        });
    }
    if !path.starts_with('/') {
        return Err(GridError::InvalidPath {
            path: path.to_string(),
            reason: "path must be absolute".to_string(),
        });
    }
    Ok(())
}
