//! Reading per-container metrics out of the cgroup v1 filesystem.
//!
//! Docker exposes resource accounting for every container it runs as plain
//! text files under the cgroup hierarchy. This module locates those files
//! for a given container, parses the handful of line formats they use, and
//! assembles the results into tagged record batches.
//!
//! # Key components
//!
//! - [`CgroupLayout`] — Resolves the per-container directory scheme (plain
//!   `docker/` directories vs. systemd scopes) and builds stats file paths.
//! - [`LineFormat`] and [`StatFileParser`] — The three line grammars found
//!   in the sampled files, applied line by line over a buffered reader.
//! - [`Collector`] — Ties the two together for one (container, stats file)
//!   pair and stamps each parsed sample with container identity, hostname,
//!   and a per-batch timestamp.
//!
//! # Sampled files
//!
//! For each container, whichever of the following exist are read:
//!
//! - `memory.stat`
//! - `cpuacct.stat`
//! - `blkio.io_serviced`, `blkio.io_service_bytes`, `blkio.io_queued`,
//!   and `blkio.sectors`
//!
//! # Platform requirements
//!
//! - Linux with the cgroup v1 hierarchy mounted.
//! - Read access to the cgroup root (usually `/sys/fs/cgroup`).
mod collector;
mod layout;
mod parser;

pub use collector::{Collector, Error};
pub use layout::CgroupLayout;
pub use parser::{LineFormat, OpenError, RawSample, StatFileParser};
