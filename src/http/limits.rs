//! Parser resource limits (§4.D "Limits", §9 open question 4).

/// Resource limits enforced by [`RequestParser`](super::request::RequestParser)
/// while consuming a single message.
///
/// All four are independent: a request can trip `header_count` while still
/// comfortably under `header_bytes`, and vice versa. Defaults match §4.D of
/// the specification; `header_count` has no source-of-truth default (the
/// reference implementation this was distilled from never enforced one) so
/// one is specified here per Open Question 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length of the request line, CRLF excluded.
    pub request_line: usize,
    /// Maximum length of a single header line (name + value), CRLF excluded.
    pub header_line: usize,
    /// Maximum cumulative size of the header block (all header lines summed).
    pub header_bytes: usize,
    /// Maximum number of distinct header entries.
    pub header_count: usize,
    /// Maximum total body size, whether framed by length or by chunking.
    pub body_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            request_line: 8 * 1024,
            header_line: 8 * 1024,
            header_bytes: 64 * 1024,
            header_count: 128,
            body_bytes: 64 * 1024 * 1024,
        }
    }
}
