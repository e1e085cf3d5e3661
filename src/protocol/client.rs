//! Native client: sessions and data object streams over one connection

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use irods_core_interface::{
    validate_path, AccessObjectFactory, GridError, GridSession, IrodsAccount, PackingPolicy,
    RemoteRead, RemoteWrite, Result,
};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use super::api::{
    DATA_OBJ_CLOSE_AN, DATA_OBJ_OPEN_AN, DATA_OBJ_READ_AN, DATA_OBJ_WRITE_AN,
    DEFAULT_CREATE_MODE, DEST_RESC_NAME_KW, O_RDONLY, WRITE_TRUNCATE_FLAGS,
};
use super::auth::authenticate_native;
use super::connection::Connection;
use super::pack;
use crate::config::ClientSettings;

type SharedConnection = Arc<Mutex<Connection>>;

/// Authenticates accounts against a live server
#[derive(Debug, Clone, Default)]
pub struct NativeAccessFactory {
    settings: ClientSettings,
}

impl NativeAccessFactory {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl AccessObjectFactory for NativeAccessFactory {
    async fn authenticate(&self, account: &IrodsAccount) -> Result<Box<dyn GridSession>> {
        let mut conn = Connection::connect(account).await?;
        conn.startup(account, &self.settings.application_name).await?;
        authenticate_native(&mut conn, account).await?;

        Ok(Box::new(NativeSession {
            account: account.clone(),
            policy: self.settings.packing_policy(),
            conn: Arc::new(Mutex::new(conn)),
        }))
    }
}

/// Authenticated connection; dropping it closes the socket
pub struct NativeSession {
    account: IrodsAccount,
    policy: PackingPolicy,
    conn: SharedConnection,
}

impl NativeSession {
    async fn open(&self, path: &str, open_flags: i32) -> Result<i32> {
        validate_path(path)?;

        let resource = self.account.default_storage_resource();
        let keywords: Vec<(&str, &str)> = if resource.is_empty() {
            Vec::new()
        } else {
            vec![(DEST_RESC_NAME_KW, resource)]
        };
        let body = pack::data_obj_inp(path, open_flags, DEFAULT_CREATE_MODE, &keywords);

        let reply = self
            .conn
            .lock()
            .await
            .api_call(DATA_OBJ_OPEN_AN, Some(body), Bytes::new())
            .await?;
        debug!(path, descriptor = reply.int_info, open_flags, "Opened data object");
        Ok(reply.int_info)
    }
}

#[async_trait]
impl GridSession for NativeSession {
    fn account(&self) -> &IrodsAccount {
        &self.account
    }

    fn packing_policy(&self) -> PackingPolicy {
        self.policy
    }

    async fn open_write(&self, path: &str) -> Result<Box<dyn RemoteWrite>> {
        let descriptor = self.open(path, WRITE_TRUNCATE_FLAGS).await?;
        Ok(Box::new(IrodsFileOutputStream {
            conn: Arc::clone(&self.conn),
            descriptor,
        }))
    }

    async fn open_read(&self, path: &str) -> Result<Box<dyn RemoteRead>> {
        let descriptor = self.open(path, O_RDONLY).await?;
        Ok(Box::new(IrodsFileInputStream {
            conn: Arc::clone(&self.conn),
            descriptor,
        }))
    }
}

async fn close_descriptor(conn: &SharedConnection, descriptor: i32) -> Result<()> {
    conn.lock()
        .await
        .api_call(
            DATA_OBJ_CLOSE_AN,
            Some(pack::opened_data_obj_inp(descriptor, 0)),
            Bytes::new(),
        )
        .await?;
    debug!(descriptor, "Closed data object");
    Ok(())
}

/// Unbuffered writes; each call is one write request
pub struct IrodsFileOutputStream {
    conn: SharedConnection,
    descriptor: i32,
}

#[async_trait]
impl RemoteWrite for IrodsFileOutputStream {
    async fn write(&mut self, buf: &[u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let reply = self
            .conn
            .lock()
            .await
            .api_call(
                DATA_OBJ_WRITE_AN,
                Some(pack::opened_data_obj_inp(self.descriptor, buf.len())),
                Bytes::copy_from_slice(buf),
            )
            .await?;

        if reply.int_info as usize != buf.len() {
            return Err(GridError::Protocol(format!(
                "short write: server accepted {} of {} bytes",
                reply.int_info,
                buf.len()
            )));
        }
        trace!(descriptor = self.descriptor, bytes = buf.len(), "Wrote packet");
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        close_descriptor(&self.conn, self.descriptor).await
    }
}

/// Unbuffered reads; each call is one read request
pub struct IrodsFileInputStream {
    conn: SharedConnection,
    descriptor: i32,
}

#[async_trait]
impl RemoteRead for IrodsFileInputStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let reply = self
            .conn
            .lock()
            .await
            .api_call(
                DATA_OBJ_READ_AN,
                Some(pack::opened_data_obj_inp(self.descriptor, buf.len())),
                Bytes::new(),
            )
            .await?;

        let received = reply.bs.len();
        if received > buf.len() {
            return Err(GridError::Protocol(format!(
                "server returned {} bytes for a {} byte read",
                received,
                buf.len()
            )));
        }
        buf[..received].copy_from_slice(&reply.bs);
        trace!(descriptor = self.descriptor, bytes = received, "Read packet");
        Ok(received)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        close_descriptor(&self.conn, self.descriptor).await
    }
}
