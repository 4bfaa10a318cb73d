//! Sources for the set of containers to sample.
//!
//! Every sampling pass asks a [`Discovery`] implementation for the current
//! containers. In production that is [`DockerDiscovery`], which queries the
//! Docker daemon over its Unix socket; tests and fixed deployments can use
//! [`StaticContainers`] instead.

mod docker;

pub use docker::DockerDiscovery;

/// Identity of one container: the runtime-assigned ID and the
/// runtime-reported name (usually with a leading `/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to query the container runtime: {0}")]
    RequestError(#[source] hyper_util::client::legacy::Error),
    #[error("container runtime returned HTTP status {0}")]
    StatusError(hyper::StatusCode),
    #[error("failed to read the container runtime response: {0}")]
    BodyError(#[source] hyper::Error),
    #[error("failed to decode the container list: {0}")]
    DecodeError(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Lists the containers a sampling pass should visit.
pub trait Discovery {
    /// Returns the containers in a stable order. Called once per tick; a
    /// failure skips that tick without stopping the sampling loop.
    fn list_containers(&self) -> impl std::future::Future<Output = Result<Vec<ContainerRef>>> + Send;
}

/// A fixed container list, configured up front instead of discovered.
#[derive(Debug, Clone, Default)]
pub struct StaticContainers {
    containers: Vec<ContainerRef>,
}

impl StaticContainers {
    pub fn new(containers: Vec<ContainerRef>) -> Self {
        Self { containers }
    }
}

impl Discovery for StaticContainers {
    async fn list_containers(&self) -> Result<Vec<ContainerRef>> {
        Ok(self.containers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_containers_return_the_same_list() {
        let containers = vec![
            ContainerRef {
                id: "one".to_string(),
                name: "/first".to_string(),
            },
            ContainerRef {
                id: "two".to_string(),
                name: "/second".to_string(),
            },
        ];
        let discovery = StaticContainers::new(containers.clone());

        assert_eq!(discovery.list_containers().await.unwrap(), containers);
        assert_eq!(discovery.list_containers().await.unwrap(), containers);
    }

    #[tokio::test]
    async fn test_static_containers_default_is_empty() {
        let discovery = StaticContainers::default();
        assert!(discovery.list_containers().await.unwrap().is_empty());
    }
}
