//! The closed set of error kinds the core can produce.
//!
//! Three families, matching the three places a connection can die: the wire
//! grammar (parsing), the transport (socket), and the clock (deadlines).
//! Every variant's [`Display`](std::fmt::Display) message is the stable
//! kebab-case kind name callers and logs key off of — treat these strings as
//! part of the public contract, not prose.

use thiserror::Error;

/// Errors raised while parsing the wire grammar of a request (or, for
/// [`ParseError::InvalidResponse`], while serializing a response).
///
/// All of these are terminal for the parser: once returned, the parser that
/// produced them is [`stale`](ParseError::StaleParser) and must not be fed
/// further bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("bad-line-ending")]
    BadLineEnding,
    #[error("empty-method")]
    EmptyMethod,
    #[error("bad-method")]
    BadMethod,
    #[error("bad-uri")]
    BadUri,
    #[error("bad-scheme")]
    BadScheme,
    #[error("bad-host")]
    BadHost,
    #[error("bad-port")]
    BadPort,
    #[error("bad-path")]
    BadPath,
    #[error("bad-params")]
    BadParams,
    #[error("bad-version")]
    BadVersion,
    #[error("bad-status")]
    BadStatus,
    #[error("bad-reason")]
    BadReason,
    #[error("bad-header")]
    BadHeader,
    #[error("empty-header-name")]
    EmptyHeaderName,
    #[error("bad-header-name")]
    BadHeaderName,
    #[error("empty-header-value")]
    EmptyHeaderValue,
    #[error("bad-header-value")]
    BadHeaderValue,
    #[error("bad-content-length")]
    BadContentLength,
    #[error("bad-transfer-encoding")]
    BadTransferEncoding,
    #[error("multiple-content-length")]
    MultipleContentLength,
    #[error("bad-chunk")]
    BadChunk,
    #[error("bad-chunk-extension")]
    BadChunkExtension,
    #[error("bad-obs-fold")]
    BadObsFold,
    #[error("header-limit")]
    HeaderLimit,
    #[error("body-limit")]
    BodyLimit,
    #[error("buffer-overflow")]
    BufferOverflow,
    #[error("stale-parser")]
    StaleParser,
    #[error("invalid-response")]
    InvalidResponse,
}

/// Errors raised by the socket layer itself, independent of message content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("end-of-stream")]
    EndOfStream,
    #[error("short-read")]
    ShortRead,
    #[error("need-buffer")]
    NeedBuffer,
    #[error("bad-alloc")]
    BadAlloc,
}

/// Errors raised when a deadline elapses before the expected progress was made.
///
/// The specific variant encodes which phase of the receive (or send) the
/// stall happened in, so a handler can distinguish "nobody ever connected
/// anything" from "the client started a request and went silent."
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimingError {
    #[error("recv-timeout")]
    RecvTimeout,
    #[error("recv-request-timeout-with-nothing")]
    RecvRequestTimeoutWithNothing,
    #[error("recv-request-line-timeout")]
    RecvRequestLineTimeout,
    #[error("recv-request-headers-timeout")]
    RecvRequestHeadersTimeout,
    #[error("recv-request-body-timeout")]
    RecvRequestBodyTimeout,
    #[error("send-timeout")]
    SendTimeout,
}

/// The union of every terminal error this crate can surface.
///
/// `need-more` is deliberately absent: it is a [`ParseOutcome`](crate::http::request::ParseOutcome)
/// return value, never an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Timing(#[from] TimingError),
}

pub type Result<T> = std::result::Result<T, Error>;
