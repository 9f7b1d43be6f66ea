//! Stats Collector
//!
//! Reads per-tube counters from beanstalkd for every watched tube.

use tracing::{debug, instrument};

use crate::config::Config;
use crate::domain::ports::{QueueDialer, RawTubeStats};
use crate::domain::snapshot::{Counter, Snapshot, TubeCounters};
use crate::error::{Daemon, Error, Result};

/// Collect a snapshot of every watched tube.
///
/// Any failure aborts the whole cycle: no partial snapshot is returned, not
/// even when only one tube's stats request fails. The connection is dropped
/// on every return path.
#[instrument(skip_all, fields(beanstalkd = %config.beanstalkd_addr))]
pub async fn collect<D>(config: &Config, dialer: &D) -> Result<Snapshot>
where
    D: QueueDialer + ?Sized,
{
    let mut conn = dialer
        .dial(&config.beanstalkd_addr)
        .await
        .map_err(|source| Error::ConnectFailed {
            daemon: Daemon::Beanstalkd,
            addr: config.beanstalkd_addr.clone(),
            source,
        })?;

    let tubes = conn.list_tubes().await.map_err(Error::ListFailed)?;

    let mut snapshot = Snapshot::new();
    for tube in tubes {
        if !config.tubes.is_watched(&tube) {
            debug!("Skipping unwatched tube {}", tube);
            continue;
        }

        let record = conn
            .stats_tube(&tube)
            .await
            .map_err(|source| Error::StatsFailed {
                tube: tube.clone(),
                source,
            })?;

        let counters = parse_counters(&tube, &record)?;
        snapshot.insert(tube, counters);
    }

    debug!("Collected stats for {} tube(s)", snapshot.len());
    Ok(snapshot)
}

/// Extract the seven counters from a `stats-tube` record.
///
/// A missing or non-integer value yields [`Error::InvariantViolation`].
pub fn parse_counters(tube: &str, record: &RawTubeStats) -> Result<TubeCounters> {
    Counter::ALL
        .iter()
        .map(|&counter| {
            let raw = record
                .get(counter.stats_key())
                .map(String::as_str)
                .unwrap_or_default();
            raw.parse::<u64>()
                .map(|value| (counter, value))
                .map_err(|_| Error::InvariantViolation {
                    tube: tube.to_string(),
                    counter: counter.as_str(),
                    value: raw.to_string(),
                })
        })
        .collect()
}
