//! Common error types for the request/response engine

use core::fmt;
use std::io;

/// Errors raised while configuring, sending or decoding a request.
///
/// Every variant is terminal: nothing in this crate retries, and no partial
/// response is ever handed back alongside an error.
#[derive(Debug)]
pub enum Error {
    /// The URL could not be parsed, lacks a host, or an option document was invalid.
    InvalidConfiguration(String),
    /// An `https` endpoint was requested but the crate was built without TLS support.
    TlsUnavailable,
    /// The socket could not be opened within the connect timeout.
    ConnectionFailure(io::Error),
    /// The request bytes could not be handed to the transport.
    WriteFailure(io::Error),
    /// The response could not be read to end-of-stream.
    ReadFailure(io::Error),
    /// The peer closed the connection without sending anything.
    EmptyResponse,
    /// No CRLF CRLF separator between header block and body.
    MalformedResponse,
    /// The chunked body could not be reassembled.
    ChunkDecode(ChunkError),
}

/// Reasons a chunked body failed to decode.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ChunkError {
    /// A chunk size line was not terminated by CRLF.
    MissingSizeLine,
    /// The size token was not a hexadecimal number.
    InvalidSize(String),
    /// Fewer data bytes followed the size line than it declared.
    Truncated {
        /// Bytes announced by the size line.
        declared: usize,
        /// Bytes actually left in the buffer.
        available: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
            Error::TlsUnavailable => write!(f, "https requested but no TLS transport is available"),
            Error::ConnectionFailure(e) => write!(f, "connection failed: {e}"),
            Error::WriteFailure(e) => write!(f, "failed to write request: {e}"),
            Error::ReadFailure(e) => write!(f, "failed to read response: {e}"),
            Error::EmptyResponse => write!(f, "empty response"),
            Error::MalformedResponse => write!(f, "malformed response: no header/body separator"),
            Error::ChunkDecode(e) => write!(f, "chunk decode error: {e}"),
        }
    }
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkError::MissingSizeLine => write!(f, "chunk size line is not CRLF terminated"),
            ChunkError::InvalidSize(token) => write!(f, "invalid chunk size {token:?}"),
            ChunkError::Truncated {
                declared,
                available,
            } => write!(f, "chunk declares {declared} bytes but only {available} remain"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConnectionFailure(e) | Error::WriteFailure(e) | Error::ReadFailure(e) => Some(e),
            Error::ChunkDecode(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ChunkError {}

impl From<ChunkError> for Error {
    fn from(e: ChunkError) -> Self {
        Error::ChunkDecode(e)
    }
}
