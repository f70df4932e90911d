//! # Application Layer Protocols
//!
//! Protocols built on top of the [`Connection`](crate::network::Connection)
//! traits. Each works with any connector, so the socket layer can be swapped
//! for an in-memory one in tests.

/// HTTP/1.1 POST client.
pub mod http;
