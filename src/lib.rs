//! docker-metrics: a Docker container metrics collector built on the cgroup
//! v1 filesystem.
//!
//! On a fixed interval, the collector asks the Docker daemon for the running
//! containers, reads each container's accounting files (`memory.stat`,
//! `cpuacct.stat`, and the `blkio` counters), and turns every parsed line
//! into a tagged, timestamped metric record. Records travel in per-file
//! batches to a pluggable [`sink::Sink`]; the bundled sink prints JSON
//! lines to stdout.
//!
//! The moving parts live in one module each: [`discovery`] finds
//! containers, [`cgroup`] locates and parses their stats files, [`sampler`]
//! drives one single-flight pass over all of them, and [`sink`] delivers
//! the results. [`run`] wires them together according to [`config::Config`].

use std::sync::Arc;

use crate::cgroup::{CgroupLayout, Collector};
use crate::config::Config;
use crate::discovery::{Discovery, DockerDiscovery, StaticContainers};
use crate::error::ResultOkLogExt;
use crate::metric::EventBatch;
use crate::sampler::Sampler;
use crate::sink::{JsonLinesSink, Sink};

pub mod cgroup;
pub mod config;
pub mod discovery;
pub mod error;
pub mod metric;
pub mod sampler;
pub mod sink;

/// Runs the collector with the environment-derived configuration, sampling
/// until the process receives an interrupt.
///
/// Containers come from the Docker daemon socket unless a fixed list is
/// configured, and records go to stdout as JSON lines.
///
/// # Errors
///
/// Possible errors include:
/// - Malformed configuration variables (see [`config::Config::from_env`]).
/// - Failure to read the hostname from `/etc/hostname` or
///   `/proc/sys/kernel/hostname`.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    match config.containers.clone() {
        Some(containers) => {
            log::info!(
                "sampling {} configured containers instead of discovering",
                containers.len()
            );
            run_with(config, StaticContainers::new(containers), JsonLinesSink::stdout()).await
        }
        None => {
            let discovery = DockerDiscovery::new(&config.docker_socket);
            run_with(config, discovery, JsonLinesSink::stdout()).await
        }
    }
}

/// Runs the sampling loop with explicit collaborators.
///
/// Every tick lists the containers, takes one sampling pass over them on a
/// blocking worker, and hands the resulting batches to the sink task. Ticks
/// that land while a pass is still running are skipped, as are ticks whose
/// container listing fails. A failing pass never stops the loop; the next
/// tick still fires.
pub async fn run_with<D, S>(
    config: Config,
    discovery: D,
    sink: S,
) -> Result<(), Box<dyn std::error::Error>>
where
    D: Discovery,
    S: Sink + Send + 'static,
{
    let hostname = std::fs::read_to_string("/etc/hostname")
        .or_else(|_| std::fs::read_to_string("/proc/sys/kernel/hostname"))?
        .trim()
        .to_owned();
    log::debug!("Hostname: {}", &hostname);

    let layout = CgroupLayout::detect(&config.cgroup_root);
    log::info!(
        "cgroup root `{}` uses the {layout} layout",
        config.cgroup_root.display()
    );

    let collector = Collector::new(
        config.cgroup_root.clone(),
        layout,
        config.tag_prefix.clone(),
        hostname,
    );
    let sampler = Arc::new(Sampler::new(collector));

    let (tx, mut rx) = tokio::sync::mpsc::channel::<Vec<EventBatch>>(10);
    tokio::spawn(async move {
        while let Some(batches) = rx.recv().await {
            for batch in &batches {
                sink.emit_batch(batch).await.ok_or_log("failed to emit batch");
            }
        }
    });

    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("received interrupt, stopping the sampler");
                break;
            }
        }

        let Some(containers) = discovery
            .list_containers()
            .await
            .ok_or_log("container discovery failed")
        else {
            continue;
        };
        log::trace!("sampling {} containers", containers.len());

        let sampler = Arc::clone(&sampler);
        let batches =
            match tokio::task::spawn_blocking(move || sampler.try_sample(&containers)).await {
                Ok(Some(batches)) => batches,
                Ok(None) => continue,
                Err(err) => {
                    log::error!("sampling pass panicked: {err}");
                    continue;
                }
            };
        if batches.is_empty() {
            continue;
        }
        if tx.send(batches).await.is_err() {
            log::error!("record sink task stopped, shutting down");
            break;
        }
    }

    Ok(())
}
