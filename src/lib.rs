//! # rawpost - blocking HTTP/1.1 POST client
//!
//! A small client that performs one synchronous POST per call over a raw
//! stream socket, plain or TLS-wrapped, and parses the reply itself,
//! including chunked transfer-encoded bodies.
//!
//! ## Features
//!
//! - URL-derived endpoint: host, port, path+query, scheme, Basic credentials
//! - Form (`key=value&...`) or scalar bodies, URL-escaped or raw
//! - Fresh connection per request, always closed afterwards
//! - Connect timeout, optional read timeout
//! - Pluggable diagnostic [`Logger`](diagnostics::Logger) for request/response traces
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rawpost::{HttpClient, Payload};
//!
//! let client = HttpClient::new("http://example.com/form").unwrap();
//! let response = client.post(Payload::pairs([("a", "1"), ("b", "2")])).unwrap();
//! assert_eq!(response.status_code, 200);
//! ```
//!
//! ## Non-goals
//!
//! Connection reuse, redirects, cookies, compression, retries and
//! asynchronous requests are deliberately absent.
//!
//! ## Optional Features
//!
//! - `tls` (default): HTTPS through rustls with the webpki root set. Without
//!   it, `https` URLs are rejected with [`Error::TlsUnavailable`].

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Network abstraction layer: connection traits, transport and the HTTP engine.
pub mod network;

/// Diagnostic trace sinks.
pub mod diagnostics;

pub use diagnostics::{LogFacade, Logger, Silent};
pub use network::application::http::{
    ClientOptions, EndpointConfig, HttpClient, Payload, Response, Scheme, decode_chunked,
};
pub use network::error::{ChunkError, Error, Result};
pub use network::transport::SocketConnector;
