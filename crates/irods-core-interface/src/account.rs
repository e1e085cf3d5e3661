//! Connection descriptor for an iRODS zone

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Everything needed to reach and log into one iRODS zone.
///
/// Built once per run and never mutated afterwards. The home directory is
/// always derived from the zone as `/<zone>/home`.
#[derive(Clone)]
pub struct IrodsAccount {
    host: String,
    port: u16,
    user_name: String,
    password: SecretString,
    zone: String,
    home_directory: String,
    default_storage_resource: String,
}

impl IrodsAccount {
    /// Create an account with an empty default storage resource
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user_name: impl Into<String>,
        password: SecretString,
        zone: impl Into<String>,
    ) -> Self {
        let zone = zone.into();
        let home_directory = format!("/{}/home", zone);

        Self {
            host: host.into(),
            port,
            user_name: user_name.into(),
            password,
            zone,
            home_directory,
            default_storage_resource: String::new(),
        }
    }

    /// Set the storage resource new data objects are placed on
    pub fn with_default_storage_resource(mut self, resource: impl Into<String>) -> Self {
        self.default_storage_resource = resource.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn home_directory(&self) -> &str {
        &self.home_directory
    }

    pub fn default_storage_resource(&self) -> &str {
        &self.default_storage_resource
    }

    /// `host:port`, suitable for socket connection
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the password is the empty string
    pub fn has_empty_password(&self) -> bool {
        self.password.expose_secret().is_empty()
    }
}

impl fmt::Display for IrodsAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}@{}:{}", self.user_name, self.zone, self.host, self.port)
    }
}

impl fmt::Debug for IrodsAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrodsAccount")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .field("zone", &self.zone)
            .field("home_directory", &self.home_directory)
            .field("default_storage_resource", &self.default_storage_resource)
            .finish()
    }
}
