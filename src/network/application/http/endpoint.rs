//! Connection parameters resolved from a URL.

use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use url::{Host, Url};

use crate::network::error::{Error, Result};
use crate::network::transport;

/// Port used when neither the URL nor its scheme says otherwise.
pub const DEFAULT_PORT: u16 = 80;
/// Port implied by the `https` scheme.
pub const DEFAULT_TLS_PORT: u16 = 443;
/// Connect timeout applied unless overridden.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Whether the socket is used as-is or wrapped in a TLS session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Plain,
    Tls,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Plain => DEFAULT_PORT,
            Scheme::Tls => DEFAULT_TLS_PORT,
        }
    }
}

/// Where and how to connect.
///
/// `host` is never empty once an `EndpointConfig` exists. Empty `username`
/// means no `Authorization` header is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    /// Path plus `?query` when the URL had one.
    pub path: String,
    pub scheme: Scheme,
    pub username: String,
    pub password: String,
    /// Governs connection establishment only; must be non-zero.
    pub timeout_seconds: u64,
    /// Per-read deadline once connected; `None` waits for the peer forever.
    pub read_timeout: Option<Duration>,
}

impl EndpointConfig {
    /// Resolves `scheme://[user[:pass]@]host[:port][/path][?query]`.
    ///
    /// ```
    /// use rawpost::{EndpointConfig, Scheme};
    ///
    /// let ep = EndpointConfig::parse("http://example.com/submit?x=1").unwrap();
    /// assert_eq!(ep.host, "example.com");
    /// assert_eq!(ep.port, 80);
    /// assert_eq!(ep.path, "/submit?x=1");
    /// assert_eq!(ep.scheme, Scheme::Plain);
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)
            .map_err(|e| Error::InvalidConfiguration(format!("cannot parse {input:?}: {e}")))?;

        let host = match url.host() {
            Some(Host::Domain(d)) if !d.is_empty() => d.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            _ => {
                return Err(Error::InvalidConfiguration(format!(
                    "{input:?} has no host"
                )));
            }
        };

        let scheme = match url.scheme() {
            "https" if !transport::tls_available() => return Err(Error::TlsUnavailable),
            "https" => Scheme::Tls,
            _ => Scheme::Plain,
        };

        // `Url::port` hides a port equal to the scheme default, which is
        // exactly the value we would pick anyway.
        let port = url.port().unwrap_or(match url.scheme() {
            "http" | "https" => scheme.default_port(),
            _ => DEFAULT_PORT,
        });

        let mut path = match url.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            host,
            port,
            path,
            scheme,
            username: decode_userinfo(url.username()),
            password: url.password().map(decode_userinfo).unwrap_or_default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            read_timeout: None,
        })
    }

    /// Value for the `Host` header: brackets around IPv6 literals and the
    /// port only when it differs from the scheme default.
    pub fn host_header(&self) -> String {
        let host = if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        if self.port == self.scheme.default_port() {
            host
        } else {
            format!("{host}:{}", self.port)
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("password", &password)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

fn decode_userinfo(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
