//! Driver loop
//!
//! collect → publish → sleep, forever. Each cycle dials fresh connections
//! and runs to completion before the sleep starts, so cycles never overlap.

use std::convert::Infallible;

use tracing::{error, info};

use crate::config::Config;
use crate::domain::ports::{MetricsConnector, QueueDialer};
use crate::domain::snapshot::Snapshot;
use crate::error::Result;

use super::collector::collect;
use super::publisher::publish;

/// Ties a beanstalkd dialer and a StatsD connector to one configuration.
pub struct Driver<D, M> {
    config: Config,
    dialer: D,
    connector: M,
}

impl<D, M> Driver<D, M>
where
    D: QueueDialer,
    M: MetricsConnector,
{
    pub fn new(config: Config, dialer: D, connector: M) -> Self {
        Self {
            config,
            dialer,
            connector,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one cycle and return what was published.
    ///
    /// A failed collection is logged and an empty snapshot is published in
    /// its place. Only a fatal error is returned.
    pub async fn run_cycle(&self) -> Result<Snapshot> {
        let snapshot = match collect(&self.config, &self.dialer).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("Collection failed (retrying next cycle): {}", e);
                Snapshot::new()
            }
        };

        if let Err(e) = publish(&self.config, &snapshot, &self.connector).await {
            error!("Publishing failed (retrying next cycle): {}", e);
        }

        Ok(snapshot)
    }

    /// Loop until a fatal error occurs.
    pub async fn run(&self) -> Result<Infallible> {
        info!(
            "Publishing stats of tubes [{}] every {:?}",
            self.config.tubes, self.config.period
        );
        loop {
            self.run_cycle().await?;
            tokio::time::sleep(self.config.period).await;
        }
    }
}
