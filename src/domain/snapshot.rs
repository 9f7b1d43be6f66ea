//! Queue snapshot value objects
//!
//! A [`Snapshot`] is built fresh by every collection cycle and dropped once
//! published.

use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Counter
// =============================================================================

/// The closed set of per-tube counters reported as gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    Buried,
    Ready,
    Delayed,
    Reserved,
    Urgent,
    Waiting,
    Total,
}

impl Counter {
    /// Every counter, in reporting order
    pub const ALL: [Counter; 7] = [
        Counter::Buried,
        Counter::Ready,
        Counter::Delayed,
        Counter::Reserved,
        Counter::Urgent,
        Counter::Waiting,
        Counter::Total,
    ];

    /// Metric name suffix
    pub fn as_str(self) -> &'static str {
        match self {
            Counter::Buried => "buried",
            Counter::Ready => "ready",
            Counter::Delayed => "delayed",
            Counter::Reserved => "reserved",
            Counter::Urgent => "urgent",
            Counter::Waiting => "waiting",
            Counter::Total => "total",
        }
    }

    /// Key of this counter in a beanstalkd `stats-tube` record
    pub fn stats_key(self) -> &'static str {
        match self {
            Counter::Buried => "current-jobs-buried",
            Counter::Ready => "current-jobs-ready",
            Counter::Delayed => "current-jobs-delayed",
            Counter::Reserved => "current-jobs-reserved",
            Counter::Urgent => "current-jobs-urgent",
            Counter::Waiting => "current-waiting",
            Counter::Total => "total-jobs",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counter values for one tube
pub type TubeCounters = BTreeMap<Counter, u64>;

// =============================================================================
// Metric Point
// =============================================================================

/// One gauge to send: `<tube>.<counter>` and its absolute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricPoint {
    pub name: String,
    pub value: u64,
}

// =============================================================================
// Snapshot
// =============================================================================

/// Tube name → counter values, for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    tubes: BTreeMap<String, TubeCounters>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record counters for a tube, replacing any previous entry.
    pub fn insert(&mut self, tube: impl Into<String>, counters: TubeCounters) {
        self.tubes.insert(tube.into(), counters);
    }

    pub fn get(&self, tube: &str) -> Option<&TubeCounters> {
        self.tubes.get(tube)
    }

    pub fn len(&self) -> usize {
        self.tubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tubes.is_empty()
    }

    pub fn tube_names(&self) -> impl Iterator<Item = &str> {
        self.tubes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TubeCounters)> {
        self.tubes.iter().map(|(name, counters)| (name.as_str(), counters))
    }
}

/// Gauge points for one tube, named `<tube>.<counter>`.
pub fn tube_points<'a>(
    tube: &'a str,
    counters: &'a TubeCounters,
) -> impl Iterator<Item = MetricPoint> + 'a {
    counters.iter().map(move |(counter, value)| MetricPoint {
        name: format!("{}.{}", tube, counter),
        value: *value,
    })
}

impl FromIterator<(String, TubeCounters)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, TubeCounters)>>(iter: I) -> Self {
        Self {
            tubes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_names_are_distinct() {
        let names: std::collections::BTreeSet<_> =
            Counter::ALL.iter().map(|c| c.as_str()).collect();
        let keys: std::collections::BTreeSet<_> =
            Counter::ALL.iter().map(|c| c.stats_key()).collect();
        assert_eq!(names.len(), 7);
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn test_counter_stats_keys() {
        assert_eq!(Counter::Reserved.stats_key(), "current-jobs-reserved");
        assert_eq!(Counter::Waiting.stats_key(), "current-waiting");
        assert_eq!(Counter::Total.stats_key(), "total-jobs");
        assert_eq!(Counter::Reserved.to_string(), "reserved");
    }

    #[test]
    fn test_points_are_named_tube_dot_counter() {
        let counters = TubeCounters::from([(Counter::Ready, 3), (Counter::Buried, 0)]);

        let mut points: Vec<_> = tube_points("jobs", &counters).collect();
        points.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            points,
            vec![
                MetricPoint { name: "jobs.buried".into(), value: 0 },
                MetricPoint { name: "jobs.ready".into(), value: 3 },
            ]
        );
    }

    #[test]
    fn test_empty_tube_has_no_points() {
        assert!(Snapshot::new().is_empty());
        assert_eq!(tube_points("jobs", &TubeCounters::new()).count(), 0);
    }

    #[test]
    fn test_insert_replaces_tube() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("a", TubeCounters::from([(Counter::Total, 1)]));
        snapshot.insert("a", TubeCounters::from([(Counter::Total, 2)]));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("a").unwrap()[&Counter::Total], 2);
        assert_eq!(snapshot.tube_names().collect::<Vec<_>>(), vec!["a"]);
    }
}
