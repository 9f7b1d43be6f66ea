//! Runtime configuration
//!
//! The [`Config`] value is assembled once in `main` from the command line and
//! passed by reference into every component. Nothing reads ambient state.

use std::ffi::OsString;
use std::time::Duration;

use tracing::Level;

use crate::error::{Error, Result};
use crate::watch::WatchSet;

/// Default beanstalkd address
pub const DEFAULT_BEANSTALKD_ADDR: &str = "127.0.0.1:11300";

/// Default StatsD address
pub const DEFAULT_STATSD_ADDR: &str = "127.0.0.1:8125";

/// Default metric name prefix
pub const DEFAULT_PREFIX: &str = "beanstalk";

/// Long flags that may also be written Go-style with a single dash
const LONG_FLAGS: &[&str] = &["beanstalkd", "statsd", "prefix", "period", "tubes", "log-json"];

// =============================================================================
// Verbosity
// =============================================================================

/// Output verbosity selected with `-v`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Errors and warnings only
    Quiet,
    /// Per-tube progress
    Info,
    /// Every published point
    Debug,
}

impl Verbosity {
    /// Map the numeric `-v` level; anything above 2 is treated as 2.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::Quiet,
            1 => Verbosity::Info,
            _ => Verbosity::Debug,
        }
    }

    /// Most verbose tracing level that should be emitted
    pub fn level(self) -> Level {
        match self {
            Verbosity::Quiet => Level::WARN,
            Verbosity::Info => Level::INFO,
            Verbosity::Debug => Level::DEBUG,
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Info
    }
}

// =============================================================================
// Config
// =============================================================================

/// Immutable bridge configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// beanstalkd `host:port`
    pub beanstalkd_addr: String,

    /// StatsD `host:port`
    pub statsd_addr: String,

    /// Prefix applied by the StatsD client to every metric name
    pub prefix: String,

    /// Log verbosity
    pub verbosity: Verbosity,

    /// Sleep between cycles
    pub period: Duration,

    /// Tubes to report
    pub tubes: WatchSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            beanstalkd_addr: DEFAULT_BEANSTALKD_ADDR.to_string(),
            statsd_addr: DEFAULT_STATSD_ADDR.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            verbosity: Verbosity::default(),
            period: Duration::from_secs(1),
            tubes: WatchSet::All,
        }
    }
}

// =============================================================================
// Flag normalisation
// =============================================================================

/// Rewrite Go-style single-dash long flags (`-tubes x`, `-period=2s`) into
/// the double-dash form clap understands. Everything else passes through.
pub fn normalize_flag_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(idx, arg)| {
            if idx == 0 || passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_FLAGS.contains(&name) {
                        OsString::from(format!("--{}", rest))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

// =============================================================================
// Duration Parsing
// =============================================================================

/// Parse a Go-style duration string (e.g. "500ms", "1.5h", "2h45m").
///
/// Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`, `d`. A trailing number without
/// a unit is read as seconds. The result must be greater than zero.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::DurationParse("empty duration string".to_string()));
    }

    let mut total_nanos: f64 = 0.0;
    let mut rest = s;

    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (num_str, tail) = rest.split_at(num_len);
        let value: f64 = num_str
            .parse()
            .map_err(|_| Error::DurationParse(format!("invalid number in duration: {}", s)))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let nanos_per_unit = match unit.to_lowercase().as_str() {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" | "" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            "d" => 86_400e9,
            other => {
                return Err(Error::DurationParse(format!(
                    "unknown duration unit: {}",
                    other
                )))
            }
        };

        total_nanos += value * nanos_per_unit;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(Error::DurationParse(format!("duration out of range: {}", s)));
    }

    let duration = Duration::from_nanos(total_nanos.round() as u64);
    if duration.is_zero() {
        return Err(Error::DurationParse(
            "duration must be greater than 0".to_string(),
        ));
    }

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    // =========================================================================
    // Config Tests
    // =========================================================================

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.beanstalkd_addr, "127.0.0.1:11300");
        assert_eq!(config.statsd_addr, "127.0.0.1:8125");
        assert_eq!(config.prefix, "beanstalk");
        assert_eq!(config.verbosity, Verbosity::Info);
        assert_eq!(config.period, Duration::from_secs(1));
        assert_eq!(config.tubes, WatchSet::All);
    }

    // =========================================================================
    // Verbosity Tests
    // =========================================================================

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::from_level(0), Verbosity::Quiet);
        assert_eq!(Verbosity::from_level(1), Verbosity::Info);
        assert_eq!(Verbosity::from_level(2), Verbosity::Debug);
        assert_eq!(Verbosity::from_level(9), Verbosity::Debug);

        assert_eq!(Verbosity::Quiet.level(), Level::WARN);
        assert_eq!(Verbosity::Info.level(), Level::INFO);
        assert_eq!(Verbosity::Debug.level(), Level::DEBUG);
    }

    // =========================================================================
    // normalize_flag_args Tests
    // =========================================================================

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_flag_args(args.iter().copied())
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_normalize_go_style_flags() {
        assert_eq!(
            normalized(&["bin", "-tubes", "a,b", "-period=2s", "-v", "2"]),
            vec!["bin", "--tubes", "a,b", "--period=2s", "-v", "2"]
        );
    }

    #[test]
    fn test_normalize_leaves_gnu_style_and_values_alone() {
        assert_eq!(
            normalized(&["bin", "--statsd", "-prefix", "-x", "--", "-tubes"]),
            vec!["bin", "--statsd", "--prefix", "-x", "--", "-tubes"]
        );
    }

    #[test]
    fn test_normalize_keeps_program_name() {
        assert_eq!(normalized(&["-tubes"]), vec!["-tubes"]);
    }

    // =========================================================================
    // parse_duration Tests
    // =========================================================================

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_duration("250us").unwrap(), Duration::from_micros(250));
        assert_eq!(parse_duration("250µs").unwrap(), Duration::from_micros(250));
        assert_eq!(parse_duration("10ns").unwrap(), Duration::from_nanos(10));
    }

    #[test]
    fn test_parse_duration_combined_and_fractional() {
        assert_eq!(parse_duration("2h45m").unwrap(), Duration::from_secs(9900));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("0.5s").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_duration_bare_number_is_seconds() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration(" 5s ").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_duration_uppercase_units() {
        assert_eq!(parse_duration("1H").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("100MS").unwrap(), Duration::from_millis(100));
    }

    #[test]
    fn test_parse_duration_errors() {
        assert_matches!(parse_duration(""), Err(Error::DurationParse(_)));
        assert_matches!(parse_duration("   "), Err(Error::DurationParse(_)));
        assert_matches!(parse_duration("0s"), Err(Error::DurationParse(_)));
        assert_matches!(parse_duration("s"), Err(Error::DurationParse(_)));
        assert_matches!(parse_duration("5x"), Err(Error::DurationParse(_)));
        assert_matches!(parse_duration("-1s"), Err(Error::DurationParse(_)));
        assert_matches!(parse_duration("1..5s"), Err(Error::DurationParse(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_parse_duration_millis(ms in 1u64..10_000_000) {
            prop_assert_eq!(
                parse_duration(&format!("{}ms", ms)).unwrap(),
                Duration::from_millis(ms)
            );
        }

        #[test]
        fn prop_parse_duration_minutes_and_seconds(m in 0u64..1000, s in 1u64..60) {
            prop_assert_eq!(
                parse_duration(&format!("{}m{}s", m, s)).unwrap(),
                Duration::from_secs(m * 60 + s)
            );
        }
    }
}
