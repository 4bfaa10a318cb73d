//! The sampling pass and its single-flight guard.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::cgroup::Collector;
use crate::discovery::ContainerRef;
use crate::metric::{EventBatch, METRIC_JOBS};

/// Runs sampling passes over the full container and stats-file matrix.
///
/// At most one pass runs at a time. The tick driving the sampler carries no
/// re-entrancy guarantee, so the sampler enforces it itself: a tick that
/// arrives while the previous pass is still reading the filesystem is
/// dropped, never interleaved. Overlapping passes would mix filesystem
/// snapshots from different instants under the same timestamps.
#[derive(Debug)]
pub struct Sampler {
    collector: Collector,
    in_flight: AtomicBool,
}

impl Sampler {
    pub fn new(collector: Collector) -> Self {
        Self {
            collector,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Runs one pass over `containers`, or returns `None` when a previous
    /// pass is still in flight.
    ///
    /// Collection failures are logged and cost only the affected
    /// (container, stats file) pair; the pass keeps going.
    pub fn try_sample(&self, containers: &[ContainerRef]) -> Option<Vec<EventBatch>> {
        let Some(_pass) = self.begin_pass() else {
            log::warn!("previous sampling pass still running, dropping this tick");
            return None;
        };
        Some(self.run_pass(containers))
    }

    fn begin_pass(&self) -> Option<PassGuard<'_>> {
        if self.in_flight.swap(true, Ordering::Acquire) {
            return None;
        }
        Some(PassGuard {
            in_flight: &self.in_flight,
        })
    }

    fn run_pass(&self, containers: &[ContainerRef]) -> Vec<EventBatch> {
        let mut batches = Vec::new();
        for container in containers {
            for job in &METRIC_JOBS {
                match self.collector.collect_file(container, job) {
                    Ok(Some(batch)) => batches.push(batch),
                    Ok(None) => {}
                    Err(err) => log::error!(
                        "failed to collect `{}` for container `{}`: {err}",
                        job.filename,
                        container.id
                    ),
                }
            }
        }
        batches
    }
}

/// Clears the in-flight flag when the pass ends, also on panic.
struct PassGuard<'a> {
    in_flight: &'a AtomicBool,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
