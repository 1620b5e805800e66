//! Async TCP server built on Tokio (§4.E/F/G/H).
//!
//! Accepts TCP connections and drives each one through [`session::run_session`]:
//! receive a request, dispatch it to a caller-supplied handler, send the
//! response, and decide whether to keep the connection alive. Routing,
//! middleware, TLS and everything above the wire are out of scope for this
//! crate — see the crate root documentation for the boundary.

pub mod config;
pub mod metric;
pub mod recv;
pub mod send;
pub mod session;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::http::{Request, Response};

pub use config::{KeepAliveOptions, RecvOptions, SendOptions, ServerConfig};
pub use metric::{Metric, MetricsSink};
pub use session::Session;

/// Errors produced while standing up or running the server's accept loop.
///
/// Per-connection failures (a bad request, a stalled client) never surface
/// here — they are handled and logged inside [`session::run_session`] and
/// never stop the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// The HTTP/1.x server.
///
/// Binds to a TCP address and dispatches incoming requests to a handler
/// function, one [`tokio::spawn`]ed task per connection.
///
/// # Examples
///
/// ```rust,no_run
/// use httpcore::server::{Server, ServerConfig};
/// use httpcore::http::{Response, StatusCode, Version};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = Server::bind(ServerConfig::new("127.0.0.1:8080")).await?;
///     server.run(|_req, _session| async {
///         Response::new(Version::Http11, StatusCode::OK).body(b"Hello!".to_vec())
///     }).await?;
///     Ok(())
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<ServerConfig>,
    metrics: Option<Arc<MetricsSink>>,
}

impl Server {
    /// Binds a listener per `config.listen_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound (port
    /// already in use, insufficient permissions, ...).
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener =
            TcpListener::bind(&config.listen_addr)
                .await
                .map_err(|e| ServerError::Bind {
                    addr: config.listen_addr.clone(),
                    source: e,
                })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            config: Arc::new(config),
            metrics: None,
        })
    }

    /// Attaches an aggregated metrics sink; every session will record its
    /// per-request [`Metric`] into it.
    #[must_use]
    pub fn with_metrics(mut self, sink: Arc<MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections forever, spawning a [`session::run_session`] task
    /// per connection. Returns only on an unrecoverable listener error —
    /// a transient per-`accept` failure is logged and the loop continues.
    pub async fn run<H, Fut>(self, handler: H) -> Result<(), ServerError>
    where
        H: Fn(Request, Session) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        info!(address = %self.local_addr, "httpcore listening");

        loop {
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            debug!(peer = %peer_addr, "connection accepted");
            let config = Arc::clone(&self.config);
            let metrics = self.metrics.clone();
            let handler = handler.clone();

            tokio::spawn(async move {
                session::run_session(stream, config, metrics, handler).await;
            });
        }
    }
}
