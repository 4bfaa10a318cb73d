use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::discovery::ContainerRef;
use crate::metric::{EventBatch, MetricJob, MetricKind, MetricRecord};

use super::layout::CgroupLayout;
use super::parser::{LineFormat, OpenError, StatFileParser};

/// Reads one container's stats files and turns them into tagged record
/// batches.
///
/// The collector is constructed once per process with the detected layout
/// and the process-wide hostname, and is shared read-only by every sampling
/// pass. Files are opened fresh on every collection and never held across
/// passes.
#[derive(Debug)]
pub struct Collector {
    cgroup_root: PathBuf,
    layout: CgroupLayout,
    tag_prefix: String,
    hostname: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("failed to read stats file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Collector {
    pub fn new(
        cgroup_root: impl Into<PathBuf>,
        layout: CgroupLayout,
        tag_prefix: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            cgroup_root: cgroup_root.into(),
            layout,
            tag_prefix: tag_prefix.into(),
            hostname: hostname.into(),
        }
    }

    /// Collects one stats file for one container.
    ///
    /// Returns `Ok(None)` when the file does not exist, which is a normal
    /// outcome: not every controller is populated for every container. An
    /// existing file whose lines all fail to parse still produces a batch,
    /// just an empty one.
    ///
    /// All records in the returned batch share a single timestamp, captured
    /// once per call.
    ///
    /// # Errors
    ///
    /// Fails if the file vanished between the existence check and the open,
    /// or if reading it fails mid-stream. Either way the failure is scoped
    /// to this (container, job) pair; callers move on to the next one.
    pub fn collect_file(
        &self,
        container: &ContainerRef,
        job: &MetricJob,
    ) -> Result<Option<EventBatch>, Error> {
        let path =
            self.layout
                .stat_file_path(&self.cgroup_root, job.controller, &container.id, job.filename);
        if !path.exists() {
            return Ok(None);
        }

        let metric_type = job.metric_type();
        let format = LineFormat::for_file(job.controller, job.filename);
        let parser = StatFileParser::open(&path, format, metric_type)?;

        let timestamp = unix_timestamp();
        let name = strip_name(&container.name);

        let mut records = Vec::new();
        for entry in parser {
            let sample = entry.map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            let Some(sample) = sample else {
                continue;
            };
            records.push(MetricRecord {
                kind: MetricKind::for_key(&sample.key),
                key: sample.key,
                value: sample.value,
                hostname: self.hostname.clone(),
                id: container.id.clone(),
                name: name.to_owned(),
            });
        }

        Ok(Some(EventBatch {
            tag: format!("{}.{}", self.tag_prefix, job.filename),
            timestamp,
            records,
        }))
    }
}

/// Container names arrive from the runtime with a leading `/`.
fn strip_name(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}
