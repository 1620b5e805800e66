//! The receive loop (§4.F): drives [`RequestParser`] from socket reads under
//! layered timeouts, producing exactly one request per call.

use std::time::Instant;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::http::error::{Error, TimingError, TransportError};
use crate::http::{Limits, ParseOutcome, ParserState, Request, RequestParser};

use super::config::RecvOptions;
use super::metric::Metric;

const GROWTH_STEP: usize = 4 * 1024;

/// A receive failure paired with the parser phase it happened in, so the
/// session driver can decide whether a best-effort error response makes
/// sense (§7: only if at least the request line was observed).
#[derive(Debug)]
pub struct RecvFailure {
    pub error: Error,
    pub state: ParserState,
}

impl From<(Error, ParserState)> for RecvFailure {
    fn from((error, state): (Error, ParserState)) -> Self {
        Self { error, state }
    }
}

/// Maps the parser's current phase to the timing error that applies when a
/// read stalls in that phase (§4.F step 2b).
fn state_timeout(state: ParserState) -> TimingError {
    match state {
        ParserState::NothingYet => TimingError::RecvRequestTimeoutWithNothing,
        ParserState::StartLine | ParserState::ExpectingNewline => {
            TimingError::RecvRequestLineTimeout
        }
        ParserState::HeaderName | ParserState::HeaderValue => {
            TimingError::RecvRequestHeadersTimeout
        }
        ParserState::BodyFixed
        | ParserState::BodyChunkedSize
        | ParserState::BodyChunkedData
        | ParserState::BodyChunkedTrailer
        | ParserState::Completed => TimingError::RecvRequestBodyTimeout,
    }
}

fn map_io_error(err: std::io::Error) -> TransportError {
    match err.kind() {
        std::io::ErrorKind::UnexpectedEof => TransportError::EndOfStream,
        std::io::ErrorKind::OutOfMemory => TransportError::BadAlloc,
        _ => TransportError::ShortRead,
    }
}

/// Reads and parses one request from `stream`, reusing `buf` across calls so
/// bytes belonging to a pipelined next request are never discarded.
///
/// `buf` may already hold unconsumed bytes from a previous call (pipelining,
/// §5) — those are parsed before any socket read is attempted.
pub async fn recv_request(
    stream: &mut TcpStream,
    buf: &mut BytesMut,
    opts: &RecvOptions,
    limits: Limits,
) -> Result<(Request, Metric), RecvFailure> {
    let mut parser = RequestParser::new(limits);
    let mut metric = Metric::start();
    let mut offset = 0usize;
    let mut first_byte_seen = false;
    let mut phase_start = Instant::now();

    loop {
        if buf.len() > offset {
            if !first_byte_seen {
                first_byte_seen = true;
                metric.mark_first_byte();
                phase_start = Instant::now();
            }
            let (consumed, outcome) = parser
                .parse(&buf[offset..])
                .map_err(|e| (Error::from(e), parser.state()))?;
            offset += consumed;
            if let ParseOutcome::Complete(request) = outcome {
                metric.finish();
                let _ = buf.split_to(offset);
                return Ok((*request, metric));
            }
        }

        let pool = if first_byte_seen {
            opts.total_timeout
        } else {
            opts.keepalive_timeout
        };
        let budget = match pool.checked_sub(phase_start.elapsed()) {
            Some(b) if !b.is_zero() => b,
            _ => return Err((Error::from(state_timeout(parser.state())), parser.state()).into()),
        };

        if buf.capacity() - buf.len() < GROWTH_STEP {
            buf.reserve(GROWTH_STEP);
        }

        let n = match tokio::time::timeout(budget, stream.read_buf(buf)).await {
            Err(_elapsed) => {
                return Err(
                    (Error::from(state_timeout(parser.state())), parser.state()).into(),
                );
            }
            Ok(Ok(n)) => n,
            Ok(Err(io_err)) => {
                return Err((Error::from(map_io_error(io_err)), parser.state()).into());
            }
        };

        if n == 0 {
            return Err((Error::from(TransportError::EndOfStream), parser.state()).into());
        }

        if !first_byte_seen {
            first_byte_seen = true;
            metric.mark_first_byte();
            phase_start = Instant::now();
        }
        metric.add_bytes(n);
    }
}
