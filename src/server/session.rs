//! The per-connection session driver (§4.H): receive → handle → send, under
//! the keep-alive reuse policy.

use std::future::Future;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::http::{Error, ParserState, Request, Response, StatusCode, Version};

use super::config::ServerConfig;
use super::metric::{next_session_id, MetricsSink};
use super::recv::{recv_request, RecvFailure};
use super::send::send_response;

/// Identity and reuse-count of one connection's lifetime, handed to the
/// handler alongside each [`Request`] it serves.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub id: u64,
    pub reuse_count: usize,
}

impl Session {
    fn new() -> Self {
        Self {
            id: next_session_id(),
            reuse_count: 0,
        }
    }
}

/// Drives one accepted connection until it closes, per §4.H: loop over
/// recv → handler → send, stopping when either side wants to close or the
/// connection's `max_reuse` budget is spent.
pub async fn run_session<H, Fut>(
    mut stream: TcpStream,
    config: Arc<ServerConfig>,
    metrics: Option<Arc<MetricsSink>>,
    handler: H,
) where
    H: Fn(Request, Session) -> Fut,
    Fut: Future<Output = Response>,
{
    let mut session = Session::new();
    let mut buf = BytesMut::with_capacity(8 * 1024);

    debug!(session_id = session.id, "session started");

    loop {
        let (request, metric) =
            match recv_request(&mut stream, &mut buf, &config.recv, config.limits).await {
                Ok(pair) => pair,
                Err(failure) => {
                    warn!(session_id = session.id, error = %failure.error, "recv failed");
                    emit_best_effort_error(&mut stream, &config, &failure).await;
                    break;
                }
            };

        if let Some(sink) = &metrics {
            sink.record(&metric);
        }

        let keep_alive_requested = request.wants_keep_alive();
        let response = handler(request, session).await;
        let response_wants_close = response
            .headers()
            .get("connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("close"));

        if let Err(err) = send_response(&mut stream, &response, &config.send).await {
            warn!(session_id = session.id, error = %err, "send failed");
            break;
        }

        session.reuse_count += 1;
        let within_reuse_limit = session.reuse_count < config.keep_alive.max_reuse;

        if !keep_alive_requested || response_wants_close || !within_reuse_limit {
            break;
        }
    }

    debug!(
        session_id = session.id,
        reuse_count = session.reuse_count,
        "session ended"
    );
    let _ = stream.shutdown().await;
}

/// Best-effort `400`/`408` emission (§4.H, §7): only attempted if the parser
/// had at least started reading a request line — otherwise there is nothing
/// meaningful to respond to, and a bare transport failure has no useful
/// status code at all.
async fn emit_best_effort_error(
    stream: &mut TcpStream,
    config: &ServerConfig,
    failure: &RecvFailure,
) {
    if failure.state == ParserState::NothingYet {
        return;
    }

    let status = match &failure.error {
        Error::Timing(_) => StatusCode::REQUEST_TIMEOUT,
        Error::Parse(_) => StatusCode::BAD_REQUEST,
        Error::Transport(_) => return,
    };

    let response = Response::new(Version::Http11, status).header("Connection", "close");
    let _ = send_response(stream, &response, &config.send).await;
}
