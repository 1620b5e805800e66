//! The request-target scheme, populated only for absolute-form targets.

use std::fmt;

/// The scheme of an absolute-form request-target (`scheme://host[:port]path`).
///
/// Origin-form and asterisk-form targets leave this as
/// [`Scheme::Unknown`] — there is nothing on the wire to read it from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    Http,
    Https,
    #[default]
    Unknown,
}

impl Scheme {
    /// Case-insensitive match against the scheme token preceding `"://"`.
    pub fn from_token(token: &[u8]) -> Option<Self> {
        if token.eq_ignore_ascii_case(b"http") {
            Some(Self::Http)
        } else if token.eq_ignore_ascii_case(b"https") {
            Some(Self::Https)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
