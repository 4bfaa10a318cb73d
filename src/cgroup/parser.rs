//! Line-oriented parsing for cgroup v1 accounting files.
//!
//! The sampled files come in three shapes, covered by one [`LineFormat`]
//! variant each:
//!
//! - [`LineFormat::KeyValue`]: `<key> <value>` lines as found in
//!   `memory.stat` and `cpuacct.stat`.
//! - [`LineFormat::BlkioKeyed`]: `<major>:<minor> <key> <value>` lines as
//!   found in `blkio.io_serviced` and friends. The device numbers are
//!   validated and discarded, the key is lowercased.
//! - [`LineFormat::BlkioSectors`]: `<major>:<minor> <value>` lines as found
//!   in `blkio.sectors`, which has no per-key column. The metric type itself
//!   names the value.
//!
//! A line that does not match its format yields no sample and is skipped
//! without error. In particular the aggregate `Total <value>` line the
//! kernel appends to blkio files carries no device numbers and is dropped.
//!
//! # Example
//!
//! ```rust
//! use docker_metrics::cgroup::{LineFormat, StatFileParser};
//!
//! let data = "\
//! 8:0 Read 822
//! 8:0 Write 1
//! Total 823
//! ";
//! let parser = StatFileParser::from_reader(data.as_bytes(), LineFormat::BlkioKeyed, "blkio_io_serviced");
//! let samples: Vec<_> = parser.filter_map(|entry| entry.unwrap()).collect();
//!
//! assert_eq!(samples.len(), 2);
//! assert_eq!(samples[0].key, "blkio_io_serviced_read");
//! assert_eq!(samples[0].value, 822);
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A single successfully parsed line: the fully qualified metric key and its
/// value. Classification and container attribution happen later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    pub key: String,
    pub value: u64,
}

/// The line grammar of a stats file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// `<key> <value>`, e.g. `cache 32768`.
    KeyValue,
    /// `<major>:<minor> <key> <value>`, e.g. `8:0 Read 822`.
    BlkioKeyed,
    /// `<major>:<minor> <value>`, e.g. `8:0 816`.
    BlkioSectors,
}

impl LineFormat {
    /// Selects the grammar for a stats file.
    ///
    /// Dispatch order matters: `blkio.sectors` has no per-key column, so the
    /// filename check must win over the blkio controller rule. Every other
    /// blkio file uses the keyed grammar, everything else plain key-value.
    pub fn for_file(controller: &str, filename: &str) -> Self {
        if filename == "blkio.sectors" {
            Self::BlkioSectors
        } else if controller == "blkio" {
            Self::BlkioKeyed
        } else {
            Self::KeyValue
        }
    }

    /// Parses a single line, returning `None` if it does not match the
    /// grammar. `metric_type` is the key prefix derived from the filename
    /// (`memory_stat`, `blkio_io_serviced`, ...).
    pub fn parse_line(self, metric_type: &str, line: &str) -> Option<RawSample> {
        match self {
            Self::KeyValue => parse_key_value(metric_type, line),
            Self::BlkioKeyed => parse_blkio_keyed(metric_type, line),
            Self::BlkioSectors => parse_blkio_sectors(metric_type, line),
        }
    }
}

/// Splits at the first whitespace; the remainder must parse as an unsigned
/// integer once surrounding whitespace is trimmed.
fn parse_key_value(metric_type: &str, line: &str) -> Option<RawSample> {
    let (key, rest) = line.split_once(|c: char| c.is_whitespace())?;
    if key.is_empty() {
        return None;
    }
    let value = rest.trim().parse::<u64>().ok()?;
    Some(RawSample {
        key: format!("{metric_type}_{key}"),
        value,
    })
}

/// `<major>:<minor> <key> <value>`; the key is lowercased so that `Read`
/// and `Write` become stable key suffixes.
fn parse_blkio_keyed(metric_type: &str, line: &str) -> Option<RawSample> {
    let rest = strip_device_numbers(line)?;
    let (key, rest) = rest.split_once(' ')?;
    if key.is_empty() {
        return None;
    }
    let value = leading_u64(rest)?;
    Some(RawSample {
        key: format!("{metric_type}_{}", key.to_lowercase()),
        value,
    })
}

/// `<major>:<minor> <value>`; the metric type itself is the key.
fn parse_blkio_sectors(metric_type: &str, line: &str) -> Option<RawSample> {
    let rest = strip_device_numbers(line)?;
    let value = leading_u64(rest)?;
    Some(RawSample {
        key: metric_type.to_owned(),
        value,
    })
}

/// Validates and removes the `<major>:<minor> ` device prefix, returning the
/// remainder of the line. Both device numbers must be all-decimal.
fn strip_device_numbers(line: &str) -> Option<&str> {
    let (major, rest) = line.split_once(':')?;
    if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (minor, rest) = rest.split_once(' ')?;
    if minor.is_empty() || !minor.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(rest)
}

/// Parses the leading run of decimal digits in `field`. Content after the
/// digits is ignored, but at least one digit must be present.
fn leading_u64(field: &str) -> Option<u64> {
    let end = field
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(field.len());
    if end == 0 {
        return None;
    }
    field[..end].parse::<u64>().ok()
}

/// The path given to [`StatFileParser::open`] could not be opened.
///
/// Existence is checked by the caller before constructing a parser, so this
/// normally only fires when the file vanished in between.
#[derive(Debug, thiserror::Error)]
#[error("failed to open stats file `{path}`: {source}")]
pub struct OpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Streams a stats file line by line, applying one [`LineFormat`] grammar.
///
/// Iterating yields one entry per line in file order: `Ok(Some(sample))` for
/// a line that matched, `Ok(None)` for a line that did not, and `Err` if the
/// underlying read failed. The file is opened once and held only for the
/// duration of the iteration.
#[derive(Debug)]
pub struct StatFileParser<R> {
    reader: R,
    format: LineFormat,
    metric_type: String,
    line: String,
}

impl StatFileParser<BufReader<File>> {
    /// Opens `path` for line-buffered reading.
    ///
    /// # Errors
    ///
    /// Returns an [`OpenError`] naming the path if the file cannot be
    /// opened.
    pub fn open(
        path: impl AsRef<Path>,
        format: LineFormat,
        metric_type: impl Into<String>,
    ) -> Result<Self, OpenError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| OpenError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file), format, metric_type))
    }
}

impl<R: BufRead> StatFileParser<R> {
    /// Wraps an already buffered reader, mainly for tests and doctests.
    pub fn from_reader(reader: R, format: LineFormat, metric_type: impl Into<String>) -> Self {
        Self {
            reader,
            format,
            metric_type: metric_type.into(),
            line: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for StatFileParser<R> {
    type Item = io::Result<Option<RawSample>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.line.clear();
        match self.reader.read_line(&mut self.line) {
            Ok(0) => None,
            Ok(_) => {
                let line = self.line.trim_end_matches(['\n', '\r']);
                Some(Ok(self.format.parse_line(&self.metric_type, line)))
            }
            Err(err) => Some(Err(err)),
        }
    }
}
