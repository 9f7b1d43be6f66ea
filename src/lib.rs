//! beanstalkd → StatsD bridge
//!
//! Periodically reads per-tube job counters from beanstalkd and republishes
//! them to StatsD as gauges named `<prefix>.<tube>.<counter>`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐   list-tubes    ┌───────────┐  gauges   ┌───────────┐
//! │ beanstalkd│ ──stats-tube──▶ │  Driver   │ ────────▶ │  StatsD   │
//! └───────────┘                 │ collect → │           └───────────┘
//!                               │ publish → │
//!                               │ sleep     │
//!                               └───────────┘
//! ```
//!
//! # Modules
//!
//! - [`adapters`] - beanstalkd/StatsD clients and in-memory stand-ins
//! - [`config`] - Runtime configuration and flag helpers
//! - [`domain`] - Snapshot value objects and collaborator ports
//! - [`error`] - Error types
//! - [`pipeline`] - Collector, publisher and driver loop
//! - [`watch`] - Watched-tube selection

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod watch;

// Re-export commonly used types
pub use config::{parse_duration, Config, Verbosity};
pub use domain::{Counter, MetricPoint, Snapshot, TubeCounters};
pub use error::{ClientError, Error, Result};
pub use pipeline::{collect, publish, Driver};
pub use watch::WatchSet;
