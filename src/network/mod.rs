//! A network abstraction layer for one-shot request/response exchanges
//!
//! This module provides the traits the HTTP engine is written against, the
//! socket transport that implements them, and the application protocol on
//! top. Keeping the engine generic over [`Connect`] lets tests substitute an
//! in-memory connection for a real socket.
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

use std::io;

use crate::network::application::http::EndpointConfig;
use crate::network::error::Result;

/// Common error types for network operations
pub mod error;

/// Plain and TLS stream sockets
pub mod transport;

/// Application layer protocols
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection};
}

pub trait Close {
    /// Close the connection, consuming it
    fn close(self) -> io::Result<()>;
}

/// A blocking, bidirectional byte stream owned by a single exchange
pub trait Connection: io::Read + io::Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Open a fresh connection to the endpoint
    fn connect(&self, endpoint: &EndpointConfig) -> Result<Self::Connection>;
}

impl<T: Connect + ?Sized> Connect for &T {
    type Connection = T::Connection;

    fn connect(&self, endpoint: &EndpointConfig) -> Result<Self::Connection> {
        (**self).connect(endpoint)
    }
}
