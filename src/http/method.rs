//! HTTP request methods.

use std::fmt;

/// An HTTP request method.
///
/// The wire grammar only ever produces the token set below — an
/// unrecognized method token is a hard parse error
/// ([`ParseError::BadMethod`](crate::http::error::ParseError::BadMethod)),
/// not [`Method::Unknown`]. `Unknown` exists so the type can represent a
/// method that arrived through some other path (e.g. constructed
/// programmatically by a proxy) without panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Control,
    Purge,
    Options,
    Connect,
    Unknown,
}

impl Method {
    /// Returns the canonical wire representation, or `"UNKNOWN"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Trace => "TRACE",
            Self::Control => "CONTROL",
            Self::Purge => "PURGE",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Maps a request-line method token to a [`Method`].
    ///
    /// Returns `None` for any token that is not one of the known wire
    /// methods — the caller (the parser) turns that into
    /// [`ParseError::BadMethod`](crate::http::error::ParseError::BadMethod).
    pub fn from_token(token: &[u8]) -> Option<Self> {
        Some(match token {
            b"GET" => Self::Get,
            b"HEAD" => Self::Head,
            b"POST" => Self::Post,
            b"PUT" => Self::Put,
            b"DELETE" => Self::Delete,
            b"TRACE" => Self::Trace,
            b"CONTROL" => Self::Control,
            b"PURGE" => Self::Purge,
            b"OPTIONS" => Self::Options,
            b"CONNECT" => Self::Connect,
            _ => return None,
        })
    }

    /// `true` for methods with no side effects (RFC 9110 §9.2.1).
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Trace | Self::Options)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_tokens() {
        for (token, method) in [
            (&b"GET"[..], Method::Get),
            (b"HEAD", Method::Head),
            (b"POST", Method::Post),
            (b"PUT", Method::Put),
            (b"DELETE", Method::Delete),
            (b"TRACE", Method::Trace),
            (b"CONTROL", Method::Control),
            (b"PURGE", Method::Purge),
            (b"OPTIONS", Method::Options),
            (b"CONNECT", Method::Connect),
        ] {
            assert_eq!(Method::from_token(token), Some(method));
            assert_eq!(method.as_str().as_bytes(), token);
        }
    }

    #[test]
    fn unknown_token_rejected() {
        assert_eq!(Method::from_token(b"FROBNICATE"), None);
    }
}
