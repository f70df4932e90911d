//! Request framing.

use base64ct::{Base64, Encoding};
use heapless::Vec;

use super::endpoint::EndpointConfig;
use crate::network::error::{Error, Result};

const MAX_HEADERS: usize = 8;

/// A request header. Names are fixed by this crate, values are computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: &'static str,
    pub value: String,
}

/// A framed POST request: header block plus body.
#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub headers: Vec<Header, MAX_HEADERS>,
    pub body: String,
}

impl Request {
    /// Frames a POST of `body` to the endpoint.
    ///
    /// Compression is explicitly refused and the connection is always
    /// closed by the server after responding.
    pub fn post(endpoint: &EndpointConfig, content_type: &str, body: String) -> Result<Self> {
        let mut request = Request {
            path: endpoint.path.clone(),
            headers: Vec::new(),
            body,
        };

        request.header("Host", endpoint.host_header())?;
        request.header("Content-Type", content_type)?;
        request.header("Content-Length", request.body.len().to_string())?;
        request.header("Accept-Encoding", "identity")?;
        if endpoint.has_credentials() {
            request.header(
                "Authorization",
                basic_auth(&endpoint.username, &endpoint.password),
            )?;
        }
        request.header("Connection", "close")?;

        Ok(request)
    }

    fn header(&mut self, name: &'static str, value: impl Into<String>) -> Result<()> {
        self.headers
            .push(Header {
                name,
                value: value.into(),
            })
            .map_err(|_| {
                Error::WriteFailure(std::io::Error::other("request header capacity exceeded"))
            })
    }

    /// The request line and headers, CRLF-joined, without the blank line.
    pub fn head(&self) -> String {
        let mut head = format!("POST {} HTTP/1.1", self.path);
        for header in &self.headers {
            head.push_str("\r\n");
            head.push_str(header.name);
            head.push_str(": ");
            head.push_str(&header.value);
        }
        head
    }

    /// Everything that goes on the wire.
    pub fn to_bytes(&self) -> std::vec::Vec<u8> {
        let head = self.head();
        let mut out = std::vec::Vec::with_capacity(head.len() + 4 + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(b"\r\n\r\n");
        out.extend_from_slice(self.body.as_bytes());
        out
    }
}

/// `Basic <base64(username:password)>`
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    format!("Basic {}", Base64::encode_string(credentials.as_bytes()))
}
