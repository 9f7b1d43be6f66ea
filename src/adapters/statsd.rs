//! StatsD Adapter
//!
//! Implements the metrics ports with plain UDP datagrams, one per gauge:
//! `<prefix>.<name>:<value>|g`.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use tokio::net::{lookup_host, UdpSocket};
use tracing::debug;

use crate::domain::ports::{GaugeSink, MetricsConnector};
use crate::error::ClientError;

/// Creates UDP StatsD clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsdConnector;

impl StatsdConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricsConnector for StatsdConnector {
    async fn connect(&self, addr: &str, prefix: &str) -> Result<Box<dyn GaugeSink>, ClientError> {
        let target = lookup_host(addr).await?.next().ok_or_else(|| {
            ClientError::Io(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address found for {}", addr),
            ))
        })?;

        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(target).await?;
        debug!("StatsD client sending to {}", target);

        Ok(Box::new(StatsdClient {
            socket,
            prefix: prefix.to_string(),
        }))
    }
}

/// UDP StatsD client bound to one server.
#[derive(Debug)]
pub struct StatsdClient {
    socket: UdpSocket,
    prefix: String,
}

#[async_trait]
impl GaugeSink for StatsdClient {
    async fn gauge(&self, name: &str, value: u64, sample_rate: f32) -> Result<(), ClientError> {
        let packet = format_gauge(&self.prefix, name, value, sample_rate);
        self.socket.send(packet.as_bytes()).await?;
        Ok(())
    }
}

/// Render one gauge datagram. The sample rate is only written when below 1.
pub fn format_gauge(prefix: &str, name: &str, value: u64, sample_rate: f32) -> String {
    let mut packet = if prefix.is_empty() {
        format!("{}:{}|g", name, value)
    } else {
        format!("{}.{}:{}|g", prefix, name, value)
    };
    if sample_rate < 1.0 {
        packet.push_str(&format!("|@{}", sample_rate));
    }
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_gauge_with_prefix() {
        assert_eq!(
            format_gauge("beanstalk", "emails.ready", 7, 1.0),
            "beanstalk.emails.ready:7|g"
        );
    }

    #[test]
    fn test_format_gauge_without_prefix() {
        assert_eq!(format_gauge("", "jobs.total", 0, 1.0), "jobs.total:0|g");
    }

    #[test]
    fn test_format_gauge_sample_rate() {
        assert_eq!(format_gauge("p", "x", 1, 0.5), "p.x:1|g|@0.5");
    }

    #[tokio::test]
    async fn test_gauge_datagram_reaches_server() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();

        let sink = StatsdConnector::new().connect(&addr, "myapp").await.unwrap();
        sink.gauge("jobs.ready", 3, 1.0).await.unwrap();

        let mut buf = [0u8; 512];
        let n = server.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"myapp.jobs.ready:3|g");
    }

    #[tokio::test]
    async fn test_connect_malformed_address() {
        let result = StatsdConnector::new().connect("no-port-here", "p").await;
        assert!(result.is_err());
    }
}
