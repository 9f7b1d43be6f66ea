//! Domain Layer
//!
//! - **Snapshot** (`snapshot.rs`) - Counter set, per-cycle snapshot and metric points
//! - **Ports** (`ports.rs`) - Trait abstractions for beanstalkd and StatsD
//!
//! # Usage
//!
//! ```ignore
//! use beanstalk_statsd::domain::{QueueDialer, Snapshot};
//!
//! async fn tube_names<D: QueueDialer>(dialer: &D) -> Result<Vec<String>> {
//!     let mut conn = dialer.dial("127.0.0.1:11300").await?;
//!     conn.list_tubes().await
//! }
//! ```

pub mod ports;
pub mod snapshot;

pub use ports::{GaugeSink, MetricsConnector, QueueConnection, QueueDialer, RawTubeStats};
pub use snapshot::{Counter, MetricPoint, Snapshot, TubeCounters};
