//! # httpcore
//!
//! A resumable HTTP/1.x message parser and connection engine for Tokio.
//!
//! This crate owns exactly two things: an incremental, byte-boundary-independent
//! request parser ([`http::RequestParser`]) and the connection-lifecycle state
//! machine that drives it ([`server::Server`]). Everything above the wire —
//! routing, middleware, TLS, HTTP/2, compression, WebSocket upgrades — is
//! deliberately out of scope; a caller wires those in around the
//! [`http::Request`]/[`http::Response`] values this crate produces and consumes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use httpcore::server::{Server, ServerConfig};
//! use httpcore::http::{Response, StatusCode, Version};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(ServerConfig::new("127.0.0.1:8080")).await?;
//!     println!("Listening on http://127.0.0.1:8080");
//!     server.run(|_req, _session| async {
//!         Response::new(Version::Http11, StatusCode::OK).body(b"Hello, World!".to_vec())
//!     }).await?;
//!     Ok(())
//! }
//! ```

pub mod http;
pub mod server;

pub use http::{Error, HeaderMap, Method, Request, Response, StatusCode, Version};
pub use server::{Server, ServerConfig, ServerError, Session};
