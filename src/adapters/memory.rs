//! In-memory collaborators
//!
//! A fake beanstalkd and a recording StatsD sink implementing the domain
//! ports, for tests and dry runs without real daemons.

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::ports::{GaugeSink, MetricsConnector, QueueConnection, QueueDialer, RawTubeStats};
use crate::domain::snapshot::{Counter, TubeCounters};
use crate::error::ClientError;

/// Build a `stats-tube` record the way beanstalkd reports it.
pub fn stats_record(tube: &str, counters: &TubeCounters) -> RawTubeStats {
    let mut record = RawTubeStats::new();
    record.insert("name".to_string(), tube.to_string());
    for counter in Counter::ALL {
        let value = counters.get(&counter).copied().unwrap_or(0);
        record.insert(counter.stats_key().to_string(), value.to_string());
    }
    record.insert("current-using".to_string(), "1".to_string());
    record.insert("current-watching".to_string(), "1".to_string());
    record.insert("pause".to_string(), "0".to_string());
    record
}

// =============================================================================
// Fake beanstalkd
// =============================================================================

#[derive(Debug, Default)]
struct QueueState {
    tubes: Vec<(String, RawTubeStats)>,
    refuse_dial: bool,
    fail_list: bool,
    failing_tubes: HashSet<String>,
}

/// In-memory beanstalkd.
///
/// Clones share state, so a test can keep a handle after moving one into
/// the pipeline.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBeanstalkd {
    state: Arc<RwLock<QueueState>>,
    dials: Arc<AtomicUsize>,
    open: Arc<AtomicUsize>,
}

impl InMemoryBeanstalkd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tube reporting `counters` (unset counters read as zero).
    pub fn add_tube(&self, tube: &str, counters: &TubeCounters) {
        self.add_raw_tube(tube, stats_record(tube, counters));
    }

    /// Add a tube with an arbitrary stats record.
    pub fn add_raw_tube(&self, tube: &str, record: RawTubeStats) {
        let mut state = self.state.write();
        state.tubes.retain(|(name, _)| name != tube);
        state.tubes.push((tube.to_string(), record));
    }

    /// Refuse connections.
    pub fn set_refuse_dial(&self, refuse: bool) {
        self.state.write().refuse_dial = refuse;
    }

    /// Answer `list-tubes` with an error.
    pub fn set_fail_list(&self, fail: bool) {
        self.state.write().fail_list = fail;
    }

    /// Answer `stats-tube` for `tube` with `NOT_FOUND`.
    pub fn fail_stats_for(&self, tube: &str) {
        self.state.write().failing_tubes.insert(tube.to_string());
    }

    /// Number of successful dials so far
    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    /// Connections dialed and not yet dropped
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueDialer for InMemoryBeanstalkd {
    async fn dial(&self, addr: &str) -> Result<Box<dyn QueueConnection>, ClientError> {
        if self.state.read().refuse_dial {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("connection refused by {}", addr),
            )));
        }
        self.dials.fetch_add(1, Ordering::SeqCst);
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryConnection {
            state: self.state.clone(),
            open: self.open.clone(),
        }))
    }
}

struct InMemoryConnection {
    state: Arc<RwLock<QueueState>>,
    open: Arc<AtomicUsize>,
}

impl Drop for InMemoryConnection {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl QueueConnection for InMemoryConnection {
    async fn list_tubes(&mut self) -> Result<Vec<String>, ClientError> {
        let state = self.state.read();
        if state.fail_list {
            return Err(ClientError::Server("INTERNAL_ERROR".to_string()));
        }
        Ok(state.tubes.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn stats_tube(&mut self, tube: &str) -> Result<RawTubeStats, ClientError> {
        let state = self.state.read();
        if state.failing_tubes.contains(tube) {
            return Err(ClientError::Server("NOT_FOUND".to_string()));
        }
        state
            .tubes
            .iter()
            .find(|(name, _)| name == tube)
            .map(|(_, record)| record.clone())
            .ok_or_else(|| ClientError::Server("NOT_FOUND".to_string()))
    }
}

// =============================================================================
// Recording StatsD
// =============================================================================

/// One recorded `gauge` call
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeCall {
    pub prefix: String,
    pub name: String,
    pub value: u64,
    pub sample_rate: f32,
}

/// StatsD stand-in that records every gauge it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatsd {
    calls: Arc<RwLock<Vec<GaugeCall>>>,
    connects: Arc<AtomicUsize>,
    refuse_connect: Arc<AtomicBool>,
    fail_sends: Arc<AtomicBool>,
}

impl RecordingStatsd {
    pub fn new() -> Self {
        Self::default()
    }

    /// All gauge calls received so far.
    pub fn calls(&self) -> Vec<GaugeCall> {
        self.calls.read().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.read().is_empty()
    }

    pub fn clear(&self) {
        self.calls.write().clear();
    }

    /// Number of successful connects so far
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn set_refuse_connect(&self, refuse: bool) {
        self.refuse_connect.store(refuse, Ordering::SeqCst);
    }

    /// Make every `gauge` call fail (nothing is recorded).
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetricsConnector for RecordingStatsd {
    async fn connect(&self, addr: &str, prefix: &str) -> Result<Box<dyn GaugeSink>, ClientError> {
        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("cannot resolve {}", addr),
            )));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingSink {
            prefix: prefix.to_string(),
            calls: self.calls.clone(),
            fail_sends: self.fail_sends.clone(),
        }))
    }
}

struct RecordingSink {
    prefix: String,
    calls: Arc<RwLock<Vec<GaugeCall>>>,
    fail_sends: Arc<AtomicBool>,
}

#[async_trait]
impl GaugeSink for RecordingSink {
    async fn gauge(&self, name: &str, value: u64, sample_rate: f32) -> Result<(), ClientError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "send failed",
            )));
        }
        self.calls.write().push(GaugeCall {
            prefix: self.prefix.clone(),
            name: name.to_string(),
            value,
            sample_rate,
        });
        Ok(())
    }
}
