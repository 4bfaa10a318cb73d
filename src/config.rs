//! Process configuration, read from environment variables.
//!
//! Recognized variables, all optional:
//!
//! - `CGROUP_PATH`: cgroup filesystem root, defaults to `/sys/fs/cgroup`.
//! - `STATS_INTERVAL`: sampling interval in seconds, defaults to 60.
//! - `TAG_PREFIX`: prefix of every emitted tag, defaults to `docker`.
//! - `CONTAINER_LIST`: JSON array of `[id, name]` pairs. When set, these
//!   containers are sampled instead of asking the Docker daemon; mainly
//!   useful for deterministic test setups.
//! - `DOCKER_SOCKET`: path of the daemon socket used for discovery,
//!   defaults to `/var/run/docker.sock`.

use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use crate::discovery::ContainerRef;

pub const DEFAULT_CGROUP_PATH: &str = "/sys/fs/cgroup";
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";
pub const DEFAULT_TAG_PREFIX: &str = "docker";
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid `STATS_INTERVAL` value `{value}`: {source}")]
    IntervalError {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("`STATS_INTERVAL` must be greater than zero")]
    ZeroIntervalError,
    #[error("invalid `CONTAINER_LIST` value: {source}")]
    ContainerListError {
        #[source]
        source: serde_json::Error,
    },
}

/// Resolved configuration, immutable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub cgroup_root: PathBuf,
    pub interval: Duration,
    pub tag_prefix: String,
    /// `Some` overrides container discovery entirely, even when empty.
    pub containers: Option<Vec<ContainerRef>>,
    pub docker_socket: PathBuf,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails if `STATS_INTERVAL` is not a positive integer or
    /// `CONTAINER_LIST` is not a JSON array of `[id, name]` pairs.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let cgroup_root = lookup("CGROUP_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CGROUP_PATH));

        let interval = match lookup("STATS_INTERVAL") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|source| Error::IntervalError {
                    value: raw.clone(),
                    source,
                })?;
                if secs == 0 {
                    return Err(Error::ZeroIntervalError);
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_STATS_INTERVAL,
        };

        let tag_prefix = lookup("TAG_PREFIX").unwrap_or_else(|| DEFAULT_TAG_PREFIX.to_owned());

        let containers = match lookup("CONTAINER_LIST") {
            Some(raw) => Some(parse_container_list(&raw)?),
            None => None,
        };

        let docker_socket = lookup("DOCKER_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKER_SOCKET));

        Ok(Self {
            cgroup_root,
            interval,
            tag_prefix,
            containers,
            docker_socket,
        })
    }
}

fn parse_container_list(raw: &str) -> Result<Vec<ContainerRef>, Error> {
    let pairs: Vec<(String, String)> =
        serde_json::from_str(raw).map_err(|source| Error::ContainerListError { source })?;
    Ok(pairs
        .into_iter()
        .map(|(id, name)| ContainerRef { id, name })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.cgroup_root, PathBuf::from("/sys/fs/cgroup"));
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.tag_prefix, "docker");
        assert!(config.containers.is_none());
        assert_eq!(config.docker_socket, PathBuf::from("/var/run/docker.sock"));
    }

    #[test]
    fn test_overrides() {
        let pairs = [
            ("CGROUP_PATH", "/host/sys/fs/cgroup"),
            ("STATS_INTERVAL", "15"),
            ("TAG_PREFIX", "metrics"),
            ("DOCKER_SOCKET", "/run/user/1000/docker.sock"),
        ];
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.cgroup_root, PathBuf::from("/host/sys/fs/cgroup"));
        assert_eq!(config.interval, Duration::from_secs(15));
        assert_eq!(config.tag_prefix, "metrics");
        assert_eq!(
            config.docker_socket,
            PathBuf::from("/run/user/1000/docker.sock")
        );
    }

    #[test]
    fn test_container_list() {
        let pairs = [(
            "CONTAINER_LIST",
            r#"[["sadais1337hacker", "/sample_container"], ["feedc0de", "/other"]]"#,
        )];
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        let containers = config.containers.unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].id, "sadais1337hacker");
        assert_eq!(containers[0].name, "/sample_container");
        assert_eq!(containers[1].id, "feedc0de");
    }

    #[test]
    fn test_empty_container_list_still_overrides_discovery() {
        let pairs = [("CONTAINER_LIST", "[]")];
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.containers, Some(Vec::new()));
    }

    #[test]
    fn test_rejects_non_numeric_interval() {
        let pairs = [("STATS_INTERVAL", "soon")];
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, Error::IntervalError { value, .. } if value == "soon"));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let pairs = [("STATS_INTERVAL", "0")];
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, Error::ZeroIntervalError));
    }

    #[test]
    fn test_rejects_malformed_container_list() {
        let pairs = [("CONTAINER_LIST", "not json")];
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, Error::ContainerListError { .. }));
    }
}
