//! HTTP protocol versions.

use std::fmt;

/// An HTTP version.
///
/// The wire grammar this crate parses (`"HTTP/" DIGIT "." DIGIT`) only ever
/// accepts `1.0` and `1.1`; any other digit pair is
/// [`ParseError::BadVersion`](crate::http::error::ParseError::BadVersion).
/// `Http2`/`Http3`/`Unknown` exist so the type admits future values (a
/// handler forwarding to an HTTP/2 upstream, for instance) without the core
/// ever producing them itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    Http10,
    Http11,
    Http2,
    Http3,
    Unknown,
}

impl Version {
    /// Parses the two grammar digits (`major`, `minor`) from a request or
    /// status line into a [`Version`]. Returns `None` for anything other
    /// than `1.0`/`1.1` — the only versions this parser accepts on the wire.
    pub fn from_digits(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (1, 0) => Some(Self::Http10),
            (1, 1) => Some(Self::Http11),
            _ => None,
        }
    }

    /// `true` for 1.1 and above (used by keep-alive default-on semantics).
    pub fn at_least_1_1(&self) -> bool {
        matches!(self, Self::Http11 | Self::Http2 | Self::Http3)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
            Self::Http2 => "HTTP/2.0",
            Self::Http3 => "HTTP/3.0",
            Self::Unknown => "HTTP/UNKNOWN",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_1_0_and_1_1() {
        assert_eq!(Version::from_digits(1, 0), Some(Version::Http10));
        assert_eq!(Version::from_digits(1, 1), Some(Version::Http11));
        assert_eq!(Version::from_digits(2, 0), None);
        assert_eq!(Version::from_digits(1, 9), None);
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(Version::Http11.to_string(), "HTTP/1.1");
        assert_eq!(Version::Http10.to_string(), "HTTP/1.0");
    }
}
