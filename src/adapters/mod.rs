//! Infrastructure Adapters
//!
//! Implementations of the domain ports.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Ports (Traits)                                │
//! │  QueueDialer/QueueConnection │ MetricsConnector/GaugeSink       │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  BeanstalkdDialer (TCP) │ StatsdConnector (UDP)                  │
//! │  InMemoryBeanstalkd     │ RecordingStatsd                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod beanstalkd;
mod memory;
mod statsd;

pub use beanstalkd::{decode_stats, decode_tube_list, BeanstalkdConnection, BeanstalkdDialer};
pub use memory::{stats_record, GaugeCall, InMemoryBeanstalkd, RecordingStatsd};
pub use statsd::{format_gauge, StatsdClient, StatsdConnector};
