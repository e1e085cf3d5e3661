/*!
 * Transfer driver: one put, then one get
 */

use irods_core_interface::{AccessObjectFactory, GridSession, IrodsAccount, RemoteRead};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::error::Result;
use crate::session::authenticate;
use crate::stream::{open_input, open_output};

/// Fixed payload written to the target path
pub const TEST_PAYLOAD: &[u8] = b"This is a test of the iRODS Jargon System.\n";

/// Size of each caller read while copying the source out
pub const COPY_CHUNK_SIZE: usize = 8 * 1024;

/// Bytes moved by a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferReport {
    pub bytes_put: u64,
    pub bytes_got: u64,
}

/// Write [`TEST_PAYLOAD`] to `target`, replacing whatever was there
///
/// The stream is closed whether or not the write succeeded; a write error wins
/// over a close error.
#[tracing::instrument(skip(session))]
pub async fn put_file(session: &dyn GridSession, target: &str) -> Result<u64> {
    let mut output = open_output(session, target).await?;
    let written = output.write(TEST_PAYLOAD).await;
    let closed = output.close().await;
    written.and(closed)?;

    info!(bytes = TEST_PAYLOAD.len(), "Put complete");
    Ok(TEST_PAYLOAD.len() as u64)
}

/// Copy every byte of `source` to `out`, verbatim
#[tracing::instrument(skip(session, out))]
pub async fn get_file<W>(session: &dyn GridSession, source: &str, out: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut input = open_input(session, source).await?;
    let copied = copy_out(input.as_mut(), out).await;
    let closed: Result<()> = input.close().await.map_err(Into::into);
    let copied = copied.and_then(|n| closed.map(|_| n))?;

    info!(bytes = copied, "Get complete");
    Ok(copied)
}

async fn copy_out<W>(input: &mut dyn RemoteRead, out: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = input.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n]).await?;
        total += n as u64;
    }
    out.flush().await?;
    Ok(total)
}

/// Authenticate, put, then get
pub async fn run<W>(
    factory: &dyn AccessObjectFactory,
    account: &IrodsAccount,
    target: &str,
    source: &str,
    out: &mut W,
) -> Result<TransferReport>
where
    W: AsyncWrite + Unpin + Send,
{
    let session = authenticate(factory, account).await?;
    let bytes_put = put_file(session.as_ref(), target).await?;
    let bytes_got = get_file(session.as_ref(), source, out).await?;

    Ok(TransferReport {
        bytes_put,
        bytes_got,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use irods_core_interface::{GridError, RemoteWrite};
    use secrecy::SecretString;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Store = Arc<Mutex<HashMap<String, Vec<u8>>>>;

    struct MemSession {
        account: IrodsAccount,
        store: Store,
        fail_reads: bool,
    }

    struct MemWrite {
        store: Store,
        path: String,
    }

    #[async_trait]
    impl RemoteWrite for MemWrite {
        async fn write(&mut self, buf: &[u8]) -> irods_core_interface::Result<()> {
            self.store
                .lock()
                .unwrap()
                .entry(self.path.clone())
                .or_default()
                .extend_from_slice(buf);
            Ok(())
        }

        async fn close(self: Box<Self>) -> irods_core_interface::Result<()> {
            Ok(())
        }
    }

    struct MemRead {
        data: Vec<u8>,
        pos: usize,
        fail: bool,
    }

    #[async_trait]
    impl RemoteRead for MemRead {
        async fn read(&mut self, buf: &mut [u8]) -> irods_core_interface::Result<usize> {
            if self.fail {
                return Err(GridError::Protocol("read refused".to_string()));
            }
            let n = (self.data.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        async fn close(self: Box<Self>) -> irods_core_interface::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl GridSession for MemSession {
        fn account(&self) -> &IrodsAccount {
            &self.account
        }

        async fn open_write(&self, path: &str) -> irods_core_interface::Result<Box<dyn RemoteWrite>> {
            self.store.lock().unwrap().insert(path.to_string(), Vec::new());
            Ok(Box::new(MemWrite {
                store: Arc::clone(&self.store),
                path: path.to_string(),
            }))
        }

        async fn open_read(&self, path: &str) -> irods_core_interface::Result<Box<dyn RemoteRead>> {
            let data = self.store.lock().unwrap().get(path).cloned().ok_or_else(|| {
                GridError::Server {
                    code: -808000,
                    name: "CAT_NO_ROWS_FOUND",
                    messages: vec![],
                }
            })?;
            Ok(Box::new(MemRead {
                data,
                pos: 0,
                fail: self.fail_reads,
            }))
        }
    }

    fn session(store: Store) -> MemSession {
        MemSession {
            account: IrodsAccount::new(
                "localhost",
                1247,
                "alice",
                SecretString::new(String::new().into_boxed_str()),
                "tempZone",
            ),
            store,
            fail_reads: false,
        }
    }

    #[tokio::test]
    async fn test_put_replaces_content() {
        let store: Store = Arc::default();
        store
            .lock()
            .unwrap()
            .insert("/tempZone/t".to_string(), b"old content that is longer".to_vec());

        let session = session(Arc::clone(&store));
        let n = put_file(&session, "/tempZone/t").await.unwrap();

        assert_eq!(n, TEST_PAYLOAD.len() as u64);
        assert_eq!(store.lock().unwrap()["/tempZone/t"], TEST_PAYLOAD);
    }

    #[tokio::test]
    async fn test_get_copies_verbatim() {
        let store: Store = Arc::default();
        let content: Vec<u8> = (0..=255u8).cycle().take(3 * COPY_CHUNK_SIZE + 17).collect();
        store
            .lock()
            .unwrap()
            .insert("/tempZone/s".to_string(), content.clone());

        let session = session(store);
        let mut out = Vec::new();
        let n = get_file(&session, "/tempZone/s", &mut out).await.unwrap();

        assert_eq!(n, content.len() as u64);
        assert_eq!(out, content);
    }

    #[tokio::test]
    async fn test_get_empty_source() {
        let store: Store = Arc::default();
        store.lock().unwrap().insert("/z/empty".to_string(), Vec::new());

        let mut out = Vec::new();
        let n = get_file(&session(store), "/z/empty", &mut out).await.unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_source() {
        let mut out = Vec::new();
        let err = get_file(&session(Arc::default()), "/z/missing", &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("CAT_NO_ROWS_FOUND"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_get_read_failure_reported() {
        let store: Store = Arc::default();
        store.lock().unwrap().insert("/z/s".to_string(), b"data".to_vec());
        let mut session = session(store);
        session.fail_reads = true;

        let mut out = Vec::new();
        let err = get_file(&session, "/z/s", &mut out).await.unwrap_err();
        assert!(err.to_string().contains("read refused"));
    }
}
