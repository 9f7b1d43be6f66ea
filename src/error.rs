//! Error types for the beanstalkd → StatsD bridge

use std::fmt;

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Which external daemon an operation was talking to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Daemon {
    Beanstalkd,
    Statsd,
}

impl fmt::Display for Daemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Daemon::Beanstalkd => write!(f, "beanstalkd"),
            Daemon::Statsd => write!(f, "statsd"),
        }
    }
}

/// Transport-level failures reported by the beanstalkd and StatsD clients
#[derive(Error, Debug)]
pub enum ClientError {
    /// I/O error on the underlying socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered with an error reply (e.g. `NOT_FOUND`)
    #[error("server replied {0}")]
    Server(String),

    /// The server answered with something outside the protocol
    #[error("unexpected response: {0:?}")]
    UnexpectedResponse(String),

    /// A reply body could not be decoded
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// Errors that can occur in the bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed startup configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Duration parse error
    #[error("failed to parse duration: {0}")]
    DurationParse(String),

    /// Could not reach beanstalkd or StatsD
    #[error("failed to connect to {daemon} at {addr}: {source}")]
    ConnectFailed {
        daemon: Daemon,
        addr: String,
        #[source]
        source: ClientError,
    },

    /// beanstalkd rejected `list-tubes`
    #[error("failed to list tubes: {0}")]
    ListFailed(#[source] ClientError),

    /// beanstalkd rejected `stats-tube` for one tube
    #[error("failed to get stats for tube {tube}: {source}")]
    StatsFailed {
        tube: String,
        #[source]
        source: ClientError,
    },

    /// A counter in a stats record was not a non-negative integer.
    ///
    /// The daemon's reply format is not what we expect; reporting anything
    /// further would misreport silently.
    #[error("tube {tube} reported a non-integer {counter} value {value:?}")]
    InvariantViolation {
        tube: String,
        counter: &'static str,
        value: String,
    },
}

impl Error {
    /// True for errors that must stop the process instead of the cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvariantViolation { .. })
    }
}
