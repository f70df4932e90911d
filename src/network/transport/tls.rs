//! rustls client session over a blocking `TcpStream`.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use log::debug;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::network::error::{Error, Result};

static CONFIG: OnceLock<Option<Arc<ClientConfig>>> = OnceLock::new();

/// Shared client config trusting the webpki root set.
///
/// Built once per process; a provider that cannot offer safe protocol
/// versions means there is no usable TLS transport.
fn client_config() -> Result<Arc<ClientConfig>> {
    CONFIG
        .get_or_init(|| {
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

            let provider = Arc::new(rustls::crypto::ring::default_provider());
            match ClientConfig::builder_with_provider(provider).with_safe_default_protocol_versions() {
                Ok(builder) => Some(Arc::new(
                    builder.with_root_certificates(roots).with_no_client_auth(),
                )),
                Err(e) => {
                    log::error!("TLS provider rejected default protocol versions: {e}");
                    None
                }
            }
        })
        .clone()
        .ok_or(Error::TlsUnavailable)
}

/// A TLS session owning its socket.
#[derive(Debug)]
pub struct TlsStream {
    inner: StreamOwned<ClientConnection, TcpStream>,
}

impl TlsStream {
    /// Runs a client handshake for `host` over an already connected socket.
    ///
    /// The whole handshake must finish within `timeout`; afterwards the
    /// socket gets `read_timeout` for reads and no write deadline.
    pub fn connect(
        host: &str,
        mut tcp: TcpStream,
        timeout: Duration,
        read_timeout: Option<Duration>,
    ) -> Result<Self> {
        let name = ServerName::try_from(host.to_string()).map_err(|e| {
            Error::InvalidConfiguration(format!("{host:?} is not a valid TLS server name: {e}"))
        })?;
        let mut session = ClientConnection::new(client_config()?, name)
            .map_err(|e| Error::ConnectionFailure(io::Error::other(e)))?;

        handshake(&mut session, &mut tcp, Instant::now() + timeout).map_err(|e| {
            debug!("TLS handshake with {host} failed: {e}");
            Error::ConnectionFailure(e)
        })?;

        tcp.set_read_timeout(read_timeout)
            .and_then(|()| tcp.set_write_timeout(None))
            .map_err(Error::ConnectionFailure)?;

        Ok(Self {
            inner: StreamOwned::new(session, tcp),
        })
    }

    pub fn close(mut self) -> io::Result<()> {
        self.inner.conn.send_close_notify();
        // The peer may already be gone; the shutdown below is what matters.
        let _ = self.inner.flush();
        self.inner.sock.shutdown(Shutdown::Both)
    }
}

/// Drives `session` until it is no longer handshaking or `deadline` passes.
fn handshake(session: &mut ClientConnection, tcp: &mut TcpStream, deadline: Instant) -> io::Result<()> {
    while session.is_handshaking() {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
            .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "TLS handshake timed out"))?;
        tcp.set_read_timeout(Some(remaining))?;
        tcp.set_write_timeout(Some(remaining))?;

        if session.complete_io(tcp)? == (0, 0) && session.is_handshaking() {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
    }
    Ok(())
}

impl Read for TlsStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for TlsStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
