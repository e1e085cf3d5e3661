//! One TCP connection to an iRODS server

use bytes::Bytes;
use irods_core_interface::{GridError, IrodsAccount, Result};
use tokio::io::{AsyncRead, AsyncWrite, BufStream};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use super::api::error_name;
use super::message::{read_message, write_message, Message, MessageType};
use super::pack;

pub type Transport = BufStream<TcpStream>;

/// Reply to an API request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    /// Non-negative status or result (descriptor, byte count)
    pub int_info: i32,
    pub body: Bytes,
    pub bs: Bytes,
}

/// What the server reported during startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVersion {
    pub release: String,
    pub api: String,
}

pub struct Connection<S = Transport> {
    stream: S,
}

impl Connection<Transport> {
    /// Open a TCP connection to the account's endpoint
    pub async fn connect(account: &IrodsAccount) -> Result<Self> {
        let endpoint = account.endpoint();
        debug!(endpoint = %endpoint, "Connecting");

        let tcp = TcpStream::connect((account.host(), account.port()))
            .await
            .map_err(|source| GridError::Connection {
                endpoint: endpoint.clone(),
                source,
            })?;
        tcp.set_nodelay(true)
            .map_err(|source| GridError::Connection { endpoint, source })?;

        Ok(Self::new(BufStream::new(tcp)))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Exchange the startup pack for the server version
    pub async fn startup(
        &mut self,
        account: &IrodsAccount,
        application_name: &str,
    ) -> Result<ServerVersion> {
        let request = Message::new(MessageType::Connect, 0)
            .with_body(pack::startup_pack(account, application_name));
        self.send(&request).await?;

        let reply = self.receive().await?;
        if reply.msg_type != MessageType::Version {
            return Err(GridError::Protocol(format!(
                "expected RODS_VERSION, received {}",
                reply.msg_type.as_str()
            )));
        }

        let version = pack::parse(&reply.body)?;
        version.expect_root("Version_PI")?;
        let status = version.int("status")?;
        if status < 0 {
            return Err(server_error(status as i32, &reply.error));
        }

        let version = ServerVersion {
            release: version.get("relVersion").unwrap_or_default().to_string(),
            api: version.get("apiVersion").unwrap_or_default().to_string(),
        };
        debug!(release = %version.release, api = %version.api, "Server accepted startup");
        Ok(version)
    }

    /// Send one API request and wait for its reply
    pub async fn api_call(&mut self, api: i32, body: Option<Bytes>, bs: Bytes) -> Result<ApiReply> {
        let request = Message::new(MessageType::ApiRequest, api)
            .with_body(body.unwrap_or_default())
            .with_bs(bs);
        self.send(&request).await?;

        let reply = self.receive().await?;
        if reply.msg_type != MessageType::ApiReply {
            return Err(GridError::Protocol(format!(
                "expected RODS_API_REPLY to API {}, received {}",
                api,
                reply.msg_type.as_str()
            )));
        }
        if reply.int_info < 0 {
            return Err(server_error(reply.int_info, &reply.error));
        }

        Ok(ApiReply {
            int_info: reply.int_info,
            body: reply.body,
            bs: reply.bs,
        })
    }

    async fn send(&mut self, message: &Message) -> Result<()> {
        trace!(
            msg_type = message.msg_type.as_str(),
            int_info = message.int_info,
            body = message.body.len(),
            bs = message.bs.len(),
            "Sending message"
        );
        write_message(&mut self.stream, message).await
    }

    async fn receive(&mut self) -> Result<Message> {
        let message = read_message(&mut self.stream).await?;
        trace!(
            msg_type = message.msg_type.as_str(),
            int_info = message.int_info,
            body = message.body.len(),
            error = message.error.len(),
            bs = message.bs.len(),
            "Received message"
        );
        Ok(message)
    }
}

/// Build a server error from a status and an optional `RError_PI`
fn server_error(code: i32, error: &[u8]) -> GridError {
    let messages = if error.is_empty() {
        Vec::new()
    } else {
        match pack::parse(error) {
            Ok(fields) => fields
                .get_all("msg")
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            Err(e) => {
                debug!(error = %e, "Ignoring unreadable RError_PI");
                Vec::new()
            }
        }
    };

    GridError::Server {
        code,
        name: error_name(code),
        messages,
    }
}
