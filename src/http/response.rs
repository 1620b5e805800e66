//! The [`Response`] value type and its deterministic wire serializer.

use bytes::{BufMut, BytesMut};

use super::error::ParseError;
use super::headers::HeaderMap;
use super::status::StatusCode;
use super::version::Version;

/// An HTTP/1.x response, ready to be serialized and sent.
///
/// # Examples
///
/// ```
/// use httpcore::http::{Response, StatusCode, Version};
///
/// let response = Response::new(Version::Http11, StatusCode::OK)
///     .header("Content-Type", "application/json")
///     .body(b"{\"status\":\"ok\"}".to_vec());
///
/// let bytes = response.serialize().unwrap();
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    version: Version,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    /// Creates a new response. `status` starting at [`StatusCode::UNKNOWN`]
    /// (via `StatusCode::new(0)`) makes [`Response::serialize`] fail — a
    /// handler must always set a real code.
    pub fn new(version: Version, status: StatusCode) -> Self {
        Self {
            version,
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response to its HTTP/1.x wire form.
    ///
    /// A `Content-Length` header is always appended reflecting the actual
    /// body length, overriding any caller-supplied one — the wire form must
    /// never claim a length the bytes that follow don't have. Fails with
    /// [`ParseError::InvalidResponse`] if `version` or `status` is
    /// [`Version::Unknown`] / [`StatusCode::UNKNOWN`]: there is no valid
    /// status line to write.
    pub fn serialize(&self) -> Result<BytesMut, ParseError> {
        if self.version == Version::Unknown || self.status.is_unknown() {
            return Err(ParseError::InvalidResponse);
        }

        #[cfg(debug_assertions)]
        for (name, value) in self.headers.iter() {
            debug_assert!(
                !name.as_bytes().contains(&b'\r') && !name.as_bytes().contains(&b'\n'),
                "header name contains a raw CR or LF: {name:?}",
            );
            debug_assert!(
                !value.as_bytes().contains(&b'\r') && !value.as_bytes().contains(&b'\n'),
                "header value contains a raw CR or LF: {value:?}",
            );
        }

        let content_length = self.body.len();
        let estimated_size = 128 + self.headers.len() * 64 + content_length;
        let mut buf = BytesMut::with_capacity(estimated_size);

        buf.put(
            format!(
                "{} {} {}\r\n",
                self.version,
                self.status.as_u16(),
                reason_phrase(self.status),
            )
            .as_bytes(),
        );

        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }
        buf.put(format!("Content-Length: {content_length}\r\n").as_bytes());
        buf.put(&b"\r\n"[..]);

        if !self.body.is_empty() {
            buf.put(self.body.as_slice());
        }

        Ok(buf)
    }
}

fn reason_phrase(status: StatusCode) -> &'static str {
    let canonical = status.canonical_reason();
    if canonical.is_empty() {
        "Unknown"
    } else {
        canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(bytes: BytesMut) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn simple_ok_response() {
        let r = Response::new(Version::Http11, StatusCode::OK).body(b"Hello".to_vec());
        let s = to_string(r.serialize().unwrap());
        assert!(s.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(s.contains("Content-Length: 5\r\n"));
        assert!(s.ends_with("\r\n\r\nHello"));
    }

    #[test]
    fn custom_header() {
        let r = Response::new(Version::Http11, StatusCode::OK)
            .header("X-Request-Id", "abc-123")
            .body(b"ok".to_vec());
        let s = to_string(r.serialize().unwrap());
        assert!(s.contains("X-Request-Id: abc-123\r\n"));
    }

    #[test]
    fn empty_body_still_reports_length_zero() {
        let r = Response::new(Version::Http11, StatusCode::NO_CONTENT);
        let s = to_string(r.serialize().unwrap());
        assert!(s.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn caller_supplied_content_length_is_overridden() {
        let r = Response::new(Version::Http11, StatusCode::OK)
            .header("Content-Length", "999")
            .body(b"abc".to_vec());
        let s = to_string(r.serialize().unwrap());
        assert!(s.contains("Content-Length: 3\r\n"));
        assert!(!s.contains("999"));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let r = Response::new(Version::Unknown, StatusCode::OK);
        assert_eq!(r.serialize().unwrap_err(), ParseError::InvalidResponse);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let r = Response::new(Version::Http11, StatusCode::UNKNOWN);
        assert_eq!(r.serialize().unwrap_err(), ParseError::InvalidResponse);
    }

    #[test]
    fn unrecognized_status_falls_back_to_unknown_reason() {
        let r = Response::new(Version::Http11, StatusCode::new(499));
        let s = to_string(r.serialize().unwrap());
        assert!(s.starts_with("HTTP/1.1 499 Unknown\r\n"));
    }

    #[test]
    fn not_found() {
        let r = Response::new(Version::Http11, StatusCode::NOT_FOUND).body(b"Not Found".to_vec());
        let s = to_string(r.serialize().unwrap());
        assert!(s.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }
}
