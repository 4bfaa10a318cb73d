/// Entry point for the docker-metrics collector.
///
/// This binary samples per-container resource usage from the cgroup
/// filesystem on a fixed interval, discovers containers through the Docker
/// daemon socket, and writes tagged metric records to stdout as JSON lines.
///
/// # Errors
///
/// Returns an error if initialization fails (e.g., malformed configuration
/// variables or an unreadable hostname).
///
/// # Examples
///
/// ```bash
/// STATS_INTERVAL=15 TAG_PREFIX=docker cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    docker_metrics::run().await
}
