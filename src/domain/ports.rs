//! Domain Ports (Port/Adapter Pattern)
//!
//! The pipeline talks to beanstalkd and StatsD only through these traits.
//! Infrastructure adapters implement them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Pipeline                                │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                    Ports (Traits)                    │    │
//! │  │  QueueDialer │ QueueConnection │ MetricsConnector   │    │
//! │  │  GaugeSink                                           │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                  Adapters (Impls)                    │    │
//! │  │  BeanstalkdDialer │ StatsdConnector │ in-memory     │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ClientError;

/// Raw `stats-tube` record: field name → value as sent by the daemon
pub type RawTubeStats = HashMap<String, String>;

// =============================================================================
// Job Queue Ports
// =============================================================================

/// Opens connections to the job-queue daemon.
///
/// A fresh connection is dialed every cycle; nothing is pooled.
#[async_trait]
pub trait QueueDialer: Send + Sync {
    async fn dial(&self, addr: &str) -> Result<Box<dyn QueueConnection>, ClientError>;
}

/// An open job-queue connection. Dropping it releases the connection.
#[async_trait]
pub trait QueueConnection: Send {
    /// Names of every tube the daemon knows about.
    async fn list_tubes(&mut self) -> Result<Vec<String>, ClientError>;

    /// Statistics record for one tube.
    async fn stats_tube(&mut self, tube: &str) -> Result<RawTubeStats, ClientError>;
}

// =============================================================================
// Metrics Ports
// =============================================================================

/// Creates clients for the metrics daemon.
#[async_trait]
pub trait MetricsConnector: Send + Sync {
    /// Connect to `addr`; the returned sink prepends `prefix` to every name.
    async fn connect(&self, addr: &str, prefix: &str) -> Result<Box<dyn GaugeSink>, ClientError>;
}

/// A metrics client able to emit gauges.
#[async_trait]
pub trait GaugeSink: Send + Sync {
    /// Emit an absolute gauge value.
    async fn gauge(&self, name: &str, value: u64, sample_rate: f32) -> Result<(), ClientError>;
}
