//! Pipeline module
//!
//! The polling loop: collect tube stats from beanstalkd, publish them to
//! StatsD, sleep, repeat.

mod collector;
mod driver;
mod publisher;

pub use collector::{collect, parse_counters};
pub use driver::Driver;
pub use publisher::{publish, SAMPLE_RATE};
