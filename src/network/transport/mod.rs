//! Blocking stream transport.
//!
//! One request is one connection: [`SocketConnector`] opens a fresh socket
//! (optionally wrapped in TLS), [`exchange`] writes the whole request and
//! reads until the peer closes, and the caller closes the socket afterwards
//! whatever the outcome.
//!
//! Only connection establishment (TCP connect plus, for TLS, the handshake)
//! honours the endpoint's connect timeout. Reads block indefinitely unless a
//! read timeout is configured; writes are never timed.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use crate::network::application::http::{EndpointConfig, Scheme};
use crate::network::error::{Error, Result};
use crate::network::{Close, Connect, Connection};

#[cfg(feature = "tls")]
pub mod tls;

const READ_BUF_LEN: usize = 8 * 1024;

/// Reports whether this build can open TLS connections.
pub const fn tls_available() -> bool {
    cfg!(feature = "tls")
}

/// An open socket, plain or TLS-wrapped.
#[derive(Debug)]
pub enum Stream {
    Plain(TcpStream),
    #[cfg(feature = "tls")]
    Tls(Box<tls::TlsStream>),
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.read(buf),
            #[cfg(feature = "tls")]
            Stream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.write(buf),
            #[cfg(feature = "tls")]
            Stream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(s) => s.flush(),
            #[cfg(feature = "tls")]
            Stream::Tls(s) => s.flush(),
        }
    }
}

impl Close for Stream {
    fn close(self) -> io::Result<()> {
        match self {
            Stream::Plain(s) => s.shutdown(Shutdown::Both),
            #[cfg(feature = "tls")]
            Stream::Tls(s) => (*s).close(),
        }
    }
}

impl Connection for Stream {}

/// Opens real sockets to the endpoint's host and port.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketConnector;

/// A zero timeout cannot be handed to the socket layer.
fn connect_timeout(endpoint: &EndpointConfig) -> Result<Duration> {
    match endpoint.timeout_seconds {
        0 => Err(Error::InvalidConfiguration(
            "connect timeout must be at least one second".to_string(),
        )),
        secs => Ok(Duration::from_secs(secs)),
    }
}

impl SocketConnector {
    fn open_tcp(&self, endpoint: &EndpointConfig, timeout: Duration) -> Result<TcpStream> {
        let addrs = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(Error::ConnectionFailure)?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(endpoint.read_timeout)
                        .map_err(Error::ConnectionFailure)?;
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("connect to {addr} failed: {e}");
                    last_err = Some(e);
                }
            }
        }

        Err(Error::ConnectionFailure(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} did not resolve to any address", endpoint.host),
            )
        })))
    }
}

impl Connect for SocketConnector {
    type Connection = Stream;

    fn connect(&self, endpoint: &EndpointConfig) -> Result<Stream> {
        debug!(
            "opening {:?} connection to {}:{}",
            endpoint.scheme, endpoint.host, endpoint.port
        );
        let timeout = connect_timeout(endpoint)?;
        let tcp = self.open_tcp(endpoint, timeout)?;

        match endpoint.scheme {
            Scheme::Plain => Ok(Stream::Plain(tcp)),
            #[cfg(feature = "tls")]
            Scheme::Tls => {
                let tls = tls::TlsStream::connect(&endpoint.host, tcp, timeout, endpoint.read_timeout)?;
                Ok(Stream::Tls(Box::new(tls)))
            }
            #[cfg(not(feature = "tls"))]
            Scheme::Tls => Err(Error::TlsUnavailable),
        }
    }
}

/// Writes `request` in one go, then reads until end-of-stream.
///
/// The connection is left open; closing it is the caller's job so that it
/// happens on every path.
pub fn exchange<C: Connection>(conn: &mut C, request: &[u8]) -> Result<Vec<u8>> {
    conn.write_all(request).map_err(Error::WriteFailure)?;
    conn.flush().map_err(Error::WriteFailure)?;

    let mut response = Vec::new();
    let mut buf = [0u8; READ_BUF_LEN];
    loop {
        match conn.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => response.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // Peers routinely drop TLS without close_notify once the body is out.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!("peer closed without close_notify after {} bytes", response.len());
                break;
            }
            Err(e) => return Err(Error::ReadFailure(e)),
        }
    }

    Ok(response)
}
