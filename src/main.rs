//! beanstalkd → StatsD bridge
//!
//! Polls beanstalkd for per-tube counters and pushes them to StatsD as
//! gauges, every `--period`, until killed.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use beanstalk_statsd::adapters::{BeanstalkdDialer, StatsdConnector};
use beanstalk_statsd::config::{
    normalize_flag_args, DEFAULT_BEANSTALKD_ADDR, DEFAULT_PREFIX, DEFAULT_STATSD_ADDR,
};
use beanstalk_statsd::{parse_duration, Config, Driver, Verbosity, WatchSet};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Publish beanstalkd tube stats to StatsD
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Beanstalkd address
    #[arg(long, default_value = DEFAULT_BEANSTALKD_ADDR)]
    beanstalkd: String,

    /// StatsD server address
    #[arg(long, default_value = DEFAULT_STATSD_ADDR)]
    statsd: String,

    /// StatsD prefix for all stats
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Output verbosity level. Use 0 (quiet), 1 or 2
    #[arg(short = 'v', long = "verbosity", default_value_t = 1)]
    verbosity: u8,

    /// How often to send stats. Ex.: 1s (second), 2m (minutes), 400ms (milliseconds)
    #[arg(long, default_value = "1s", value_parser = parse_duration)]
    period: Duration,

    /// Comma separated list of tubes to watch. Use * to watch all
    #[arg(long, default_value = "*")]
    tubes: String,

    /// Output logs as JSON
    #[arg(long)]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse_from(normalize_flag_args(std::env::args_os()));

    let mut config = Config {
        beanstalkd_addr: args.beanstalkd,
        statsd_addr: args.statsd,
        prefix: args.prefix,
        verbosity: Verbosity::from_level(args.verbosity),
        period: args.period,
        ..Config::default()
    };

    init_logging(config.verbosity, args.log_json);

    config.tubes = match WatchSet::parse(&args.tubes) {
        Ok(tubes) => tubes,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let driver = Driver::new(config, BeanstalkdDialer::new(), StatsdConnector::new());

    let config = driver.config();
    info!("Starting beanstalkd → StatsD bridge");
    info!("  beanstalkd: {}", config.beanstalkd_addr);
    info!("  StatsD: {} (prefix {:?})", config.statsd_addr, config.prefix);
    info!("  verbosity: {:?}", config.verbosity);

    match driver.run().await {
        Ok(never) => match never {},
        Err(e) => {
            error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(verbosity: Verbosity, json: bool) {
    let filter =
        EnvFilter::from_default_env().add_directive(LevelFilter::from_level(verbosity.level()).into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
