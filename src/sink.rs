//! Delivery of finished record batches.
//!
//! The sampling loop never writes records itself; it hands complete
//! [`EventBatch`]es to a [`Sink`]. The batch is the unit of delivery: all
//! records of one batch are submitted together or not at all.

use std::io::{self, Write};
use std::sync::Mutex;

use serde::Serialize;

use crate::metric::{EventBatch, MetricRecord};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to serialize record: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("failed to write record: {0}")]
    WriteError(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Accepts batches of metric records for delivery.
pub trait Sink {
    /// Delivers one batch. A failed delivery drops that batch only; the
    /// caller keeps going with later batches.
    fn emit_batch(&self, batch: &EventBatch) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// One JSON object per record on a line of its own, in the shape
/// `{"tag": ..., "time": ..., "record": {...}}`.
#[derive(Serialize)]
struct EventLine<'a> {
    tag: &'a str,
    time: u64,
    record: &'a MetricRecord,
}

/// A [`Sink`] that writes records as JSON lines to any [`Write`] target,
/// stdout by default.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer, consuming the sink.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().expect("sink writer lock poisoned")
    }
}

impl<W: Write + Send> Sink for JsonLinesSink<W> {
    async fn emit_batch(&self, batch: &EventBatch) -> Result<()> {
        let mut writer = self.writer.lock().expect("sink writer lock poisoned");
        for record in &batch.records {
            let line = EventLine {
                tag: &batch.tag,
                time: batch.timestamp,
                record,
            };
            serde_json::to_writer(&mut *writer, &line)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}
