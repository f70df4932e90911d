use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};
use serde::Deserialize;

use super::endpoint::EndpointConfig;
use super::payload::Payload;
use super::request::Request;
use super::response::{Response, split_head};
use crate::diagnostics::{Logger, Silent};
use crate::network::error::{Error, Result};
use crate::network::transport::{SocketConnector, exchange};
use crate::network::{Close, Connect};

/// Content type sent unless overridden.
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Option overrides that can be loaded from a JSON document.
///
/// Every field is optional; absent fields leave the client untouched.
///
/// ```
/// use rawpost::ClientOptions;
///
/// let options = ClientOptions::from_json(r#"{"port": 8080, "username": "svc"}"#).unwrap();
/// assert_eq!(options.port, Some(8080));
/// assert_eq!(options.username, Some("svc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientOptions<'a> {
    pub timeout_seconds: Option<u64>,
    pub read_timeout_seconds: Option<u64>,
    pub port: Option<u16>,
    #[serde(borrow)]
    pub username: Option<&'a str>,
    #[serde(borrow)]
    pub password: Option<&'a str>,
    #[serde(borrow)]
    pub content_type: Option<&'a str>,
}

impl<'a> ClientOptions<'a> {
    /// String values are borrowed, so they must not contain JSON escapes.
    pub fn from_json(json: &'a str) -> Result<Self> {
        serde_json_core::from_str(json)
            .map(|(options, _)| options)
            .map_err(|e| Error::InvalidConfiguration(format!("invalid client options: {e}")))
    }
}

/// Blocking POST client bound to one endpoint.
///
/// Each [`post`](HttpClient::post) opens a new connection, sends the whole
/// request, reads until the server closes, then closes its side, whether or
/// not anything failed along the way.
pub struct HttpClient<C: Connect = SocketConnector> {
    endpoint: EndpointConfig,
    connector: C,
    content_type: String,
    logger: Arc<dyn Logger>,
}

impl HttpClient<SocketConnector> {
    /// Creates a client that talks to real sockets.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_connector(url, SocketConnector)
    }
}

impl<C: Connect> HttpClient<C> {
    pub fn with_connector(url: &str, connector: C) -> Result<Self> {
        Ok(Self {
            endpoint: EndpointConfig::parse(url)?,
            connector,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            logger: Arc::new(Silent),
        })
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Connect timeout in seconds, covering the TLS handshake too. Zero is
    /// rejected with [`Error::InvalidConfiguration`] when the next post connects.
    pub fn set_timeout(&mut self, seconds: u64) -> &mut Self {
        self.endpoint.timeout_seconds = seconds;
        self
    }

    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.endpoint.port = port;
        self
    }

    pub fn set_username(&mut self, username: impl Into<String>) -> &mut Self {
        self.endpoint.username = username.into();
        self
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> &mut Self {
        self.endpoint.password = password.into();
        self
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = content_type.into();
        self
    }

    pub fn set_logger(&mut self, logger: impl Logger + 'static) -> &mut Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.set_logger(logger);
        self
    }

    /// Deadline for each read once connected. `None` blocks until the peer
    /// closes, however long that takes.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.endpoint.read_timeout = timeout;
        self
    }

    /// Applies every override present in `options`.
    pub fn apply(&mut self, options: &ClientOptions<'_>) -> &mut Self {
        if let Some(secs) = options.timeout_seconds {
            self.set_timeout(secs);
        }
        if let Some(secs) = options.read_timeout_seconds {
            self.set_read_timeout(Some(Duration::from_secs(secs)));
        }
        if let Some(port) = options.port {
            self.set_port(port);
        }
        if let Some(username) = options.username {
            self.set_username(username);
        }
        if let Some(password) = options.password {
            self.set_password(password);
        }
        if let Some(content_type) = options.content_type {
            self.set_content_type(content_type);
        }
        self
    }

    /// Encodes `payload`, posts it and parses the reply.
    pub fn post(&self, payload: impl Into<Payload>) -> Result<Response> {
        let body = payload.into().encode();
        let request = Request::post(&self.endpoint, &self.content_type, body)?;

        self.trace(|| {
            format!(
                "Connecting to {}:{} ({:?})",
                self.endpoint.host, self.endpoint.port, self.endpoint.scheme
            )
        });
        self.trace(|| format!("Request header:\n{}", request.head()));
        self.trace(|| format!("Request body:\n{}", request.body));

        let mut conn = self.connector.connect(&self.endpoint)?;
        let result = exchange(&mut conn, &request.to_bytes());
        match conn.close() {
            Ok(()) => debug!("closed connection to {}", self.endpoint.host),
            Err(e) => warn!("closing connection to {} failed: {e}", self.endpoint.host),
        }
        let raw = result?;

        let (head, body) = split_head(&raw)?;
        self.trace(|| format!("Response header:\n{}", String::from_utf8_lossy(head)));
        self.trace(|| format!("Response body:\n{}", String::from_utf8_lossy(body)));

        Response::from_parts(head, body)
    }

    fn trace(&self, message: impl FnOnce() -> String) {
        if self.logger.enabled() || log::log_enabled!(log::Level::Trace) {
            let message = message();
            trace!("{message}");
            self.logger.log(&message);
        }
    }
}

impl<C: Connect + core::fmt::Debug> core::fmt::Debug for HttpClient<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpClient")
            .field("endpoint", &self.endpoint)
            .field("connector", &self.connector)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
