/*!
 * Packing stream decorators
 *
 * Raw remote streams turn every call into a network round trip. The
 * decorators here batch caller I/O into packets sized by the session's
 * [`PackingPolicy`].
 */

use async_trait::async_trait;
use irods_core_interface::{GridSession, RemoteRead, RemoteWrite, Result};
use tracing::debug;

/// Buffers writes and sends them in packets of `packet_size` bytes
pub struct PackingOutputStream {
    inner: Box<dyn RemoteWrite>,
    buffer: Vec<u8>,
    packet_size: usize,
}

impl PackingOutputStream {
    pub fn new(inner: Box<dyn RemoteWrite>, packet_size: usize) -> Self {
        let packet_size = packet_size.max(1);
        Self {
            inner,
            buffer: Vec::with_capacity(packet_size),
            packet_size,
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    async fn flush_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.inner.write(&self.buffer).await?;
        self.buffer.clear();
        Ok(())
    }
}

#[async_trait]
impl RemoteWrite for PackingOutputStream {
    async fn write(&mut self, buf: &[u8]) -> Result<()> {
        let mut rest = buf;
        while !rest.is_empty() {
            let room = self.packet_size - self.buffer.len();
            let take = room.min(rest.len());
            self.buffer.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.buffer.len() == self.packet_size {
                self.flush_buffer().await?;
            }
        }
        Ok(())
    }

    /// Flush the remainder, then release the inner stream even if the flush failed
    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let flushed = this.flush_buffer().await;
        let closed = this.inner.close().await;
        flushed.and(closed)
    }
}

/// Reads ahead in packets of `packet_size` bytes
pub struct PackingInputStream {
    inner: Box<dyn RemoteRead>,
    buffer: Vec<u8>,
    pos: usize,
    filled: usize,
    eof: bool,
}

impl PackingInputStream {
    pub fn new(inner: Box<dyn RemoteRead>, packet_size: usize) -> Self {
        Self {
            inner,
            buffer: vec![0u8; packet_size.max(1)],
            pos: 0,
            filled: 0,
            eof: false,
        }
    }
}

#[async_trait]
impl RemoteRead for PackingInputStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos == self.filled {
            if self.eof {
                return Ok(0);
            }
            let n = self.inner.read(&mut self.buffer).await?;
            if n == 0 {
                self.eof = true;
                return Ok(0);
            }
            self.pos = 0;
            self.filled = n;
        }

        let n = (self.filled - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.inner.close().await
    }
}

/// Open `path` for write-truncate behind a packing decorator
pub async fn open_output(session: &dyn GridSession, path: &str) -> Result<Box<dyn RemoteWrite>> {
    let raw = session.open_write(path).await?;
    let packet_size = session.packing_policy().put_buffer_size;
    debug!(path, packet_size, "Opened output stream");
    Ok(Box::new(PackingOutputStream::new(raw, packet_size)))
}

/// Open `path` for reading behind a packing decorator
pub async fn open_input(session: &dyn GridSession, path: &str) -> Result<Box<dyn RemoteRead>> {
    let raw = session.open_read(path).await?;
    let packet_size = session.packing_policy().get_buffer_size;
    debug!(path, packet_size, "Opened input stream");
    Ok(Box::new(PackingInputStream::new(raw, packet_size)))
}
