//! Stats Publisher
//!
//! Sends every counter of a [`Snapshot`] to StatsD as a gauge.

use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::domain::ports::MetricsConnector;
use crate::domain::snapshot::{tube_points, Snapshot};
use crate::error::{Daemon, Error, Result};

/// Gauges are always sent unsampled.
pub const SAMPLE_RATE: f32 = 1.0;

/// Publish `snapshot` as `<tube>.<counter>` gauges.
///
/// Only a failed connect is reported to the caller. Individual sends are
/// fire-and-forget; a failed send is logged and the remaining points still
/// go out.
#[instrument(skip_all, fields(statsd = %config.statsd_addr, tubes = snapshot.len()))]
pub async fn publish<M>(config: &Config, snapshot: &Snapshot, connector: &M) -> Result<()>
where
    M: MetricsConnector + ?Sized,
{
    let sink = connector
        .connect(&config.statsd_addr, &config.prefix)
        .await
        .map_err(|source| Error::ConnectFailed {
            daemon: Daemon::Statsd,
            addr: config.statsd_addr.clone(),
            source,
        })?;

    for (tube, counters) in snapshot.iter() {
        info!("Sending stats of tube {}", tube);
        for point in tube_points(tube, counters) {
            if let Err(e) = sink.gauge(&point.name, point.value, SAMPLE_RATE).await {
                warn!("Failed to send gauge {}: {}", point.name, e);
                continue;
            }
            debug!("{}.{}: {}", config.prefix, point.name, point.value);
        }
    }

    Ok(())
}
