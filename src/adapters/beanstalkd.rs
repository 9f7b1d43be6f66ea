//! beanstalkd Adapter
//!
//! Implements the job-queue ports over beanstalkd's text protocol. Only the
//! two read-only commands the bridge needs are spoken: `list-tubes` and
//! `stats-tube`. Both answer `OK <bytes>\r\n<yaml>\r\n`.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tracing::debug;

use crate::domain::ports::{QueueConnection, QueueDialer, RawTubeStats};
use crate::error::ClientError;

/// Error replies beanstalkd may send instead of `OK`
const SERVER_ERRORS: &[&str] = &[
    "NOT_FOUND",
    "OUT_OF_MEMORY",
    "INTERNAL_ERROR",
    "BAD_FORMAT",
    "UNKNOWN_COMMAND",
];

/// Upper bound on an `OK <bytes>` body; larger replies are rejected unread.
pub const MAX_REPLY_BYTES: usize = 16 * 1024 * 1024;

/// Dials beanstalkd over TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeanstalkdDialer;

impl BeanstalkdDialer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueueDialer for BeanstalkdDialer {
    async fn dial(&self, addr: &str) -> Result<Box<dyn QueueConnection>, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        debug!("Connected to beanstalkd at {}", addr);
        Ok(Box::new(BeanstalkdConnection::new(stream)))
    }
}

/// One beanstalkd TCP session. Closed when dropped.
#[derive(Debug)]
pub struct BeanstalkdConnection {
    stream: BufStream<TcpStream>,
}

impl BeanstalkdConnection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: BufStream::new(stream),
        }
    }

    /// Send one command line and return the body of its `OK` reply.
    async fn request(&mut self, command: &str) -> Result<Vec<u8>, ClientError> {
        self.stream.write_all(command.as_bytes()).await?;
        self.stream.write_all(b"\r\n").await?;
        self.stream.flush().await?;

        let mut header = String::new();
        if self.stream.read_line(&mut header).await? == 0 {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "beanstalkd closed the connection",
            )));
        }
        let header = header.trim_end_matches(['\r', '\n']);

        let len = match header.split_once(' ') {
            Some(("OK", len)) => len
                .parse::<usize>()
                .map_err(|_| ClientError::UnexpectedResponse(header.to_string()))?,
            _ if SERVER_ERRORS.contains(&header) => {
                return Err(ClientError::Server(header.to_string()))
            }
            _ => return Err(ClientError::UnexpectedResponse(header.to_string())),
        };

        let framed = match len.checked_add(2) {
            Some(framed) if len <= MAX_REPLY_BYTES => framed,
            _ => {
                return Err(ClientError::UnexpectedResponse(format!(
                    "reply body of {} bytes exceeds limit of {}",
                    len, MAX_REPLY_BYTES
                )))
            }
        };

        let mut body = vec![0u8; framed];
        self.stream.read_exact(&mut body).await?;
        if !body.ends_with(b"\r\n") {
            return Err(ClientError::UnexpectedResponse(
                "reply body not terminated by CRLF".to_string(),
            ));
        }
        body.truncate(len);
        Ok(body)
    }
}

#[async_trait]
impl QueueConnection for BeanstalkdConnection {
    async fn list_tubes(&mut self) -> Result<Vec<String>, ClientError> {
        let body = self.request("list-tubes").await?;
        decode_tube_list(&body)
    }

    async fn stats_tube(&mut self, tube: &str) -> Result<RawTubeStats, ClientError> {
        let body = self.request(&format!("stats-tube {}", tube)).await?;
        decode_stats(&body)
    }
}

/// Decode the YAML sequence sent for `list-tubes`.
///
/// Names are kept as sent. Deserializing straight into `String` skips YAML
/// scalar typing, so `0x1F` or `1e3` are not turned into numbers.
pub fn decode_tube_list(body: &[u8]) -> Result<Vec<String>, ClientError> {
    serde_yaml::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Decode the flat YAML mapping sent for `stats-tube`.
pub fn decode_stats(body: &[u8]) -> Result<RawTubeStats, ClientError> {
    serde_yaml::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}
