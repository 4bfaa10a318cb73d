use std::io;
use std::path::{Path, PathBuf};
use std::{pin, task};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::{Connected, Connection};
use hyper_util::rt::{TokioExecutor, TokioIo};
use serde::Deserialize;

use super::{ContainerRef, Discovery, Error};

/// Container discovery backed by the Docker Engine API.
///
/// Talks plain HTTP/1 to the daemon over its Unix socket and asks
/// `/containers/json` for the currently running containers. The client keeps
/// its connection pooled between ticks.
#[derive(Debug, Clone)]
pub struct DockerDiscovery {
    client: Client<UnixConnector, Full<Bytes>>,
}

impl DockerDiscovery {
    /// Creates a discovery client for the daemon socket at `socket`.
    ///
    /// No connection is made until the first
    /// [`list_containers`](Discovery::list_containers) call.
    pub fn new(socket: impl AsRef<Path>) -> Self {
        let connector = UnixConnector {
            path: socket.as_ref().to_path_buf(),
        };
        let client = Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(connector);
        Self { client }
    }

    async fn fetch_containers(&self) -> Result<Vec<ContainerSummary>, Error> {
        let request = hyper::Request::builder()
            .method(hyper::Method::GET)
            .uri("http://localhost/containers/json")
            .body(Full::<Bytes>::default())
            .expect("static request is well-formed");

        let response = self
            .client
            .request(request)
            .await
            .map_err(Error::RequestError)?;
        let (parts, body) = response.into_parts();
        if !parts.status.is_success() {
            return Err(Error::StatusError(parts.status));
        }

        let body = body.collect().await.map_err(Error::BodyError)?.to_bytes();
        serde_json::from_slice(&body).map_err(Error::DecodeError)
    }
}

impl Discovery for DockerDiscovery {
    async fn list_containers(&self) -> super::Result<Vec<ContainerRef>> {
        let summaries = self.fetch_containers().await?;
        Ok(summaries
            .into_iter()
            .map(ContainerSummary::into_ref)
            .collect())
    }
}

/// The subset of a `/containers/json` entry this crate uses. The daemon
/// reports names with a leading `/`, which is kept here and stripped when
/// records are built.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerSummary {
    id: String,
    #[serde(default)]
    names: Vec<String>,
}

impl ContainerSummary {
    fn into_ref(self) -> ContainerRef {
        let name = self.names.into_iter().next().unwrap_or_default();
        ContainerRef { id: self.id, name }
    }
}

/// A connected daemon socket, adapted to the traits the HTTP client needs.
#[derive(Debug)]
struct UnixStream {
    stream: TokioIo<tokio::net::UnixStream>,
}

impl Connection for UnixStream {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

impl hyper::rt::Read for UnixStream {
    fn poll_read(
        self: pin::Pin<&mut Self>,
        cx: &mut task::Context<'_>,
        buf: hyper::rt::ReadBufCursor<'_>,
    ) -> task::Poll<io::Result<()>> {
        pin::Pin::new(&mut self.get_mut().stream).poll_read(cx, buf)
    }
}

impl hyper::rt::Write for UnixStream {
    fn poll_write(
        self: pin::Pin<&mut Self>,
        cx: &mut task::Context<'_>,
        buf: &[u8],
    ) -> task::Poll<io::Result<usize>> {
        pin::Pin::new(&mut self.get_mut().stream).poll_write(cx, buf)
    }

    fn poll_flush(
        self: pin::Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<io::Result<()>> {
        pin::Pin::new(&mut self.get_mut().stream).poll_flush(cx)
    }

    fn poll_shutdown(
        self: pin::Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<io::Result<()>> {
        pin::Pin::new(&mut self.get_mut().stream).poll_shutdown(cx)
    }
}

/// Connector that ignores the request URI and always dials the configured
/// socket path. The `localhost` authority in requests only exists to satisfy
/// the HTTP client.
#[derive(Debug, Clone)]
struct UnixConnector {
    path: PathBuf,
}

impl tower::Service<hyper::Uri> for UnixConnector {
    type Response = UnixStream;

    type Error = io::Error;

    type Future = pin::Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        _cx: &mut task::Context<'_>,
    ) -> task::Poll<Result<(), Self::Error>> {
        task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: hyper::Uri) -> Self::Future {
        let path = self.path.clone();
        Box::pin(async move {
            let stream = tokio::net::UnixStream::connect(path).await?;

            Ok(UnixStream {
                stream: TokioIo::new(stream),
            })
        })
    }
}
