//! Core metric types shared by the collector, sampler, and sinks.
//!
//! A sampling pass produces one [`EventBatch`] per readable stats file. Each
//! batch carries the routing tag, a single timestamp shared by all records in
//! the batch, and the parsed [`MetricRecord`]s themselves.
//!
//! # Example
//!
//! ```rust
//! use docker_metrics::metric::MetricKind;
//!
//! assert_eq!(MetricKind::for_key("cpuacct_stat_user"), MetricKind::Counter);
//! assert_eq!(MetricKind::for_key("memory_stat_rss"), MetricKind::Gauge);
//! ```

use serde::Serialize;

/// Key prefixes that mark a metric as monotonically increasing.
///
/// `memory_stat_pg` covers the paging event counters in `memory.stat`
/// (`pgfault`, `pgpgin`, ...); everything else in that file is a level.
const COUNTER_KEY_PREFIXES: [&str; 3] = ["cpuacct", "blkio", "memory_stat_pg"];

/// Whether a metric accumulates over time or reports a current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// A monotonically increasing count, e.g. completed I/O operations.
    Counter,
    /// A point-in-time level, e.g. resident set size.
    Gauge,
}

impl MetricKind {
    /// Classifies a fully qualified metric key by its prefix.
    ///
    /// All cpuacct and blkio metrics are cumulative, as are the paging
    /// event counters in `memory.stat`. Every other key is a gauge.
    pub fn for_key(key: &str) -> Self {
        if COUNTER_KEY_PREFIXES
            .iter()
            .any(|prefix| key.starts_with(prefix))
        {
            Self::Counter
        } else {
            Self::Gauge
        }
    }

    /// Returns the wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

/// A single parsed metric, attributed to the container it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRecord {
    /// Fully qualified key, e.g. `memory_stat_cache`.
    pub key: String,
    /// Parsed non-negative value.
    pub value: u64,
    /// Counter or gauge, derived from the key.
    #[serde(rename = "type")]
    pub kind: MetricKind,
    /// Hostname of the machine the container runs on.
    pub hostname: String,
    /// Container ID as reported by the runtime.
    pub id: String,
    /// Container name with any leading `/` stripped.
    pub name: String,
}

/// All records parsed from one stats file in one sampling pass.
///
/// The timestamp is captured once per batch, so every record read from the
/// same file shares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBatch {
    /// Routing tag, `<prefix>.<filename>` (e.g. `docker.memory.stat`).
    pub tag: String,
    /// Seconds since the Unix epoch at the time the file was read.
    pub timestamp: u64,
    /// Records in file order.
    pub records: Vec<MetricRecord>,
}

/// One stats file to sample: the cgroup controller it lives under and its
/// filename within the container's cgroup directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricJob {
    /// Cgroup controller directory, e.g. `memory`.
    pub controller: &'static str,
    /// Stats file name, e.g. `memory.stat`.
    pub filename: &'static str,
}

impl MetricJob {
    /// Returns the key prefix for records from this file, which is the
    /// filename with dots replaced by underscores (`blkio.sectors` becomes
    /// `blkio_sectors`).
    pub fn metric_type(&self) -> String {
        self.filename.replace('.', "_")
    }
}

/// The fixed set of stats files sampled for every container.
pub const METRIC_JOBS: [MetricJob; 6] = [
    MetricJob {
        controller: "memory",
        filename: "memory.stat",
    },
    MetricJob {
        controller: "cpuacct",
        filename: "cpuacct.stat",
    },
    MetricJob {
        controller: "blkio",
        filename: "blkio.io_serviced",
    },
    MetricJob {
        controller: "blkio",
        filename: "blkio.io_service_bytes",
    },
    MetricJob {
        controller: "blkio",
        filename: "blkio.io_queued",
    },
    MetricJob {
        controller: "blkio",
        filename: "blkio.sectors",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_counter_keys() {
        assert_eq!(MetricKind::for_key("cpuacct_stat_user"), MetricKind::Counter);
        assert_eq!(
            MetricKind::for_key("cpuacct_stat_system"),
            MetricKind::Counter
        );
        assert_eq!(
            MetricKind::for_key("blkio_io_serviced_read"),
            MetricKind::Counter
        );
        assert_eq!(MetricKind::for_key("blkio_sectors"), MetricKind::Counter);
        assert_eq!(
            MetricKind::for_key("memory_stat_pgfault"),
            MetricKind::Counter
        );
        assert_eq!(
            MetricKind::for_key("memory_stat_pgpgin"),
            MetricKind::Counter
        );
    }

    #[test]
    fn test_classify_gauge_keys() {
        assert_eq!(MetricKind::for_key("memory_stat_cache"), MetricKind::Gauge);
        assert_eq!(MetricKind::for_key("memory_stat_rss"), MetricKind::Gauge);
        assert_eq!(
            MetricKind::for_key("memory_stat_hierarchical_memory_limit"),
            MetricKind::Gauge
        );
        assert_eq!(MetricKind::for_key(""), MetricKind::Gauge);
    }

    #[test]
    fn test_classify_matches_any_pg_key() {
        // The prefix rule is deliberately broad: every `memory_stat_pg*` key
        // counts as cumulative, not just the documented paging counters.
        assert_eq!(
            MetricKind::for_key("memory_stat_pgmajfault"),
            MetricKind::Counter
        );
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(MetricKind::Counter.as_str(), "counter");
        assert_eq!(MetricKind::Gauge.as_str(), "gauge");
        assert_eq!(
            serde_json::to_string(&MetricKind::Counter).unwrap(),
            "\"counter\""
        );
    }

    #[test]
    fn test_record_serializes_kind_as_type() {
        let record = MetricRecord {
            key: "memory_stat_cache".to_string(),
            value: 32768,
            kind: MetricKind::Gauge,
            hostname: "host-1".to_string(),
            id: "abc123".to_string(),
            name: "sample_container".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "gauge");
        assert_eq!(json["key"], "memory_stat_cache");
        assert_eq!(json["value"], 32768);
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_metric_type_replaces_dots() {
        let job = MetricJob {
            controller: "blkio",
            filename: "blkio.io_service_bytes",
        };
        assert_eq!(job.metric_type(), "blkio_io_service_bytes");
        assert_eq!(METRIC_JOBS[0].metric_type(), "memory_stat");
    }

    #[test]
    fn test_jobs_cover_all_controllers() {
        let controllers: Vec<&str> = METRIC_JOBS.iter().map(|job| job.controller).collect();
        assert!(controllers.contains(&"memory"));
        assert!(controllers.contains(&"cpuacct"));
        assert!(controllers.contains(&"blkio"));
        assert_eq!(METRIC_JOBS.len(), 6);
    }
}
