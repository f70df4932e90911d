//! Response parsing.
//!
//! The raw buffer is split at the first CRLF CRLF. The header block is
//! tokenized into a map keyed by lower-cased header name (first occurrence
//! wins), from which the few fields we care about are looked up. Missing
//! headers leave their field at its zero value; only a missing separator or
//! an empty buffer is fatal.

use std::borrow::Cow;
use std::collections::HashMap;

use log::warn;

use super::chunk::{decode_chunked, find_slice};
use crate::network::error::{Error, Result};

const HEADER_END: &[u8] = b"\r\n\r\n";

/// A parsed HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Zero when no status line was found.
    pub status_code: u16,
    pub status_text: String,
    pub content_type: String,
    /// The `Content-Length` header, or the decoded length of a chunked body.
    pub content_length: usize,
    pub body: Vec<u8>,
    headers: HashMap<String, String>,
}

impl Response {
    /// Parses a complete response buffer.
    ///
    /// ```
    /// let raw = b"HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\n\r\nnope";
    /// let res = rawpost::Response::parse(raw).unwrap();
    /// assert_eq!(res.status_code, 404);
    /// assert_eq!(res.status_text, "Not Found");
    /// assert_eq!(res.body, b"nope");
    /// ```
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let (head, body) = split_head(raw)?;
        Self::from_parts(head, body)
    }

    /// Builds a response from an already split header block and raw body.
    pub fn from_parts(head: &[u8], raw_body: &[u8]) -> Result<Self> {
        let head = String::from_utf8_lossy(head);
        let (status, headers) = tokenize(&head);

        let mut response = Response {
            headers,
            ..Default::default()
        };
        if let Some((code, text)) = status {
            response.status_code = code;
            response.status_text = text;
        }
        if let Some(content_type) = response.header("content-type") {
            response.content_type = content_type.to_string();
        }
        if let Some(length) = response.header("content-length") {
            response.content_length = leading_number(length);
        }

        if response.is_chunked() {
            response.body = decode_chunked(raw_body)?;
            response.content_length = response.body.len();
        } else {
            if response.header("content-length").is_some()
                && response.content_length != raw_body.len()
            {
                warn!(
                    "Content-Length says {} bytes but body has {}",
                    response.content_length,
                    raw_body.len()
                );
            }
            response.body = raw_body.trim_ascii().to_vec();
        }

        Ok(response)
    }

    /// Case-insensitive header lookup; the first occurrence in the response wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_chunked(&self) -> bool {
        self.header("transfer-encoding")
            .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Splits a raw response into header block and body at the first CRLF CRLF.
pub fn split_head(raw: &[u8]) -> Result<(&[u8], &[u8])> {
    if raw.is_empty() {
        return Err(Error::EmptyResponse);
    }
    let end = find_slice(raw, HEADER_END).ok_or(Error::MalformedResponse)?;
    Ok((&raw[..end], &raw[end + HEADER_END.len()..]))
}

type Status = (u16, String);

/// Finds the status line anywhere in the block and collects `name: value`
/// lines into a map keyed by lower-cased name.
fn tokenize(head: &str) -> (Option<Status>, HashMap<String, String>) {
    let mut status = None;
    let mut headers = HashMap::new();

    for line in head.split("\r\n") {
        if status.is_none() {
            if let Some(parsed) = parse_status_line(line) {
                status = Some(parsed);
                continue;
            }
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            headers
                .entry(name.to_ascii_lowercase())
                .or_insert_with(|| value.trim().to_string());
        }
    }

    (status, headers)
}

/// Finds `HTTP/<d>.<d> <code> <text>` anywhere in `line`, case-insensitively.
fn parse_status_line(line: &str) -> Option<Status> {
    let bytes = line.as_bytes();
    (0..bytes.len().saturating_sub(4))
        .filter(|&i| bytes[i..i + 5].eq_ignore_ascii_case(b"HTTP/"))
        .find_map(|i| parse_status_at(&line[i..]))
}

fn parse_status_at(line: &str) -> Option<Status> {
    let line = line.trim_end();
    let bytes = line.as_bytes();
    if bytes.len() < 10
        || !bytes[5].is_ascii_digit()
        || bytes[6] != b'.'
        || !bytes[7].is_ascii_digit()
        || bytes[8] != b' '
    {
        return None;
    }

    let rest = &line[9..];
    let (code, text) = rest.split_once(' ').unwrap_or((rest, ""));
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some((code.parse().ok()?, text.trim().to_string()))
}

/// Integer value of the leading digit run, so `12abc` reads as 12. Zero when
/// there is none or it overflows.
fn leading_number(value: &str) -> usize {
    let value = value.trim_start();
    let end = value
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().unwrap_or(0)
}
