//! Message framing
//!
//! ```text
//! +----------------+------------------+------+-------+----+
//! | header len u32 | MsgHeader_PI XML | body | error | bs |
//! +----------------+------------------+------+-------+----+
//! ```
//!
//! The header length is big-endian. Section lengths come from the header.

use bytes::{BufMut, Bytes, BytesMut};
use irods_core_interface::{GridError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::pack::{self, PackWriter};

/// Largest header accepted from the server
pub const MAX_HEADER_LEN: usize = 4096;

/// Largest single section accepted from the server
pub const MAX_SECTION_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Connect,
    Version,
    ApiRequest,
    ApiReply,
    Disconnect,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Connect => "RODS_CONNECT",
            MessageType::Version => "RODS_VERSION",
            MessageType::ApiRequest => "RODS_API_REQ",
            MessageType::ApiReply => "RODS_API_REPLY",
            MessageType::Disconnect => "RODS_DISCONNECT",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "RODS_CONNECT" => Ok(MessageType::Connect),
            "RODS_VERSION" => Ok(MessageType::Version),
            "RODS_API_REQ" => Ok(MessageType::ApiRequest),
            "RODS_API_REPLY" => Ok(MessageType::ApiReply),
            "RODS_DISCONNECT" => Ok(MessageType::Disconnect),
            other => Err(GridError::Protocol(format!("unknown message type {:?}", other))),
        }
    }
}

/// One framed message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub msg_type: MessageType,
    /// API number on requests, status on replies
    pub int_info: i32,
    pub body: Bytes,
    pub error: Bytes,
    pub bs: Bytes,
}

impl Message {
    pub fn new(msg_type: MessageType, int_info: i32) -> Self {
        Self {
            msg_type,
            int_info,
            body: Bytes::new(),
            error: Bytes::new(),
            bs: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    pub fn with_error(mut self, error: Bytes) -> Self {
        self.error = error;
        self
    }

    pub fn with_bs(mut self, bs: Bytes) -> Self {
        self.bs = bs;
        self
    }

    fn header(&self) -> String {
        PackWriter::new("MsgHeader_PI")
            .str("type", self.msg_type.as_str())
            .int("msgLen", self.body.len() as i64)
            .int("errorLen", self.error.len() as i64)
            .int("bsLen", self.bs.len() as i64)
            .int("intInfo", self.int_info as i64)
            .finish()
    }

    /// Encode into a single contiguous frame
    pub fn encode(&self) -> Bytes {
        let header = self.header();
        let mut frame = BytesMut::with_capacity(
            4 + header.len() + self.body.len() + self.error.len() + self.bs.len(),
        );
        frame.put_u32(header.len() as u32);
        frame.put_slice(header.as_bytes());
        frame.put_slice(&self.body);
        frame.put_slice(&self.error);
        frame.put_slice(&self.bs);
        frame.freeze()
    }
}

pub async fn write_message<W>(writer: &mut W, message: &Message) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&message.encode()).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_message<R>(reader: &mut R) -> Result<Message>
where
    R: AsyncRead + Unpin,
{
    let header_len = reader.read_u32().await? as usize;
    if header_len == 0 || header_len > MAX_HEADER_LEN {
        return Err(GridError::Protocol(format!(
            "message header length {} out of range",
            header_len
        )));
    }

    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header).await?;
    let header = pack::parse(&header)?;
    header.expect_root("MsgHeader_PI")?;

    let msg_type = MessageType::parse(header.require("type")?)?;
    let int_info = i32::try_from(header.int("intInfo")?)
        .map_err(|_| GridError::Protocol("intInfo out of range".to_string()))?;

    let body = read_section(reader, section_len(&header, "msgLen")?).await?;
    let error = read_section(reader, section_len(&header, "errorLen")?).await?;
    let bs = read_section(reader, section_len(&header, "bsLen")?).await?;

    Ok(Message {
        msg_type,
        int_info,
        body,
        error,
        bs,
    })
}

fn section_len(header: &pack::PackedFields, tag: &str) -> Result<usize> {
    let len = header.int(tag)?;
    if len < 0 || len as usize > MAX_SECTION_LEN {
        return Err(GridError::Protocol(format!("{} {} out of range", tag, len)));
    }
    Ok(len as usize)
}

async fn read_section<R>(reader: &mut R, len: usize) -> Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    if len == 0 {
        return Ok(Bytes::new());
    }
    let mut section = BytesMut::zeroed(len);
    reader.read_exact(&mut section).await?;
    Ok(section.freeze())
}
