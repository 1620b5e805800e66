//! HTTP/1.x wire protocol: the resumable request parser, response
//! serializer, and the primitive types (method, version, scheme, status,
//! headers) they share.
//!
//! Everything above the wire — routing, handlers, middleware — lives
//! outside this crate; see the crate root documentation for the boundary.

pub mod cursor;
pub mod error;
pub mod headers;
pub mod limits;
pub mod method;
pub mod request;
pub mod response;
pub mod scheme;
pub mod status;
pub mod version;

pub use error::{Error, ParseError, Result, TimingError, TransportError};
pub use headers::HeaderMap;
pub use limits::Limits;
pub use method::Method;
pub use request::{ParseOutcome, ParserState, Request, RequestParser};
pub use response::Response;
pub use scheme::Scheme;
pub use status::StatusCode;
pub use version::Version;
