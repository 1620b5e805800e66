//! Server configuration (§6). Construction is purely programmatic — loading
//! these values from a file, environment, or CLI flags is outside this
//! crate's scope.

use std::time::Duration;

use crate::http::Limits;

/// Timeouts governing [`crate::server::recv`].
#[derive(Debug, Clone, Copy)]
pub struct RecvOptions {
    /// Budget for a single request once its first byte has arrived.
    pub total_timeout: Duration,
    /// Budget for the idle wait before a request's first byte arrives —
    /// applies both to a connection's very first request and to every
    /// subsequent keep-alive reuse.
    pub keepalive_timeout: Duration,
}

impl Default for RecvOptions {
    fn default() -> Self {
        Self {
            total_timeout: Duration::from_secs(30),
            keepalive_timeout: Duration::from_secs(60),
        }
    }
}

/// Timeout governing [`crate::server::send`].
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    pub total_timeout: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            total_timeout: Duration::from_secs(30),
        }
    }
}

/// Keep-alive reuse policy consulted by [`crate::server::session`].
#[derive(Debug, Clone, Copy)]
pub struct KeepAliveOptions {
    /// Maximum number of requests served on one connection before it is
    /// closed unconditionally.
    pub max_reuse: usize,
}

impl Default for KeepAliveOptions {
    fn default() -> Self {
        Self { max_reuse: 100 }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub recv: RecvOptions,
    pub send: SendOptions,
    pub limits: Limits,
    pub keep_alive: KeepAliveOptions,
}

impl ServerConfig {
    /// A config with every option at its default, bound to `listen_addr`.
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            recv: RecvOptions::default(),
            send: SendOptions::default(),
            limits: Limits::default(),
            keep_alive: KeepAliveOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = ServerConfig::new("127.0.0.1:0");
        assert_eq!(cfg.keep_alive.max_reuse, 100);
        assert_eq!(cfg.limits.header_count, 128);
        assert_eq!(cfg.limits.body_bytes, 64 * 1024 * 1024);
    }
}
