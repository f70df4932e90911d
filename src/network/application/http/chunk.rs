//! Chunked transfer-encoding decoder.
//!
//! Works on a fully buffered body. Each round skips leading whitespace,
//! reads a hexadecimal size line up to CRLF, then copies exactly that many
//! bytes. A zero size ends the body; trailers after it are discarded.

use crate::network::error::ChunkError;

/// One size-line-plus-data unit of a chunked body.
struct Chunk<'a> {
    size: usize,
    data: &'a [u8],
    rest: &'a [u8],
}

/// Reassembles a chunked body into contiguous bytes.
///
/// ```
/// let body = rawpost::decode_chunked(b"4\r\nWiki\r\n0\r\n\r\n").unwrap();
/// assert_eq!(body, b"Wiki");
/// ```
pub fn decode_chunked(body: &[u8]) -> Result<Vec<u8>, ChunkError> {
    let mut decoded = Vec::with_capacity(body.len());
    let mut remaining = body;

    loop {
        let chunk = next_chunk(remaining)?;
        if chunk.size == 0 {
            return Ok(decoded);
        }
        decoded.extend_from_slice(chunk.data);
        remaining = chunk.rest;
    }
}

fn next_chunk(buf: &[u8]) -> Result<Chunk<'_>, ChunkError> {
    let buf = buf.trim_ascii_start();
    let line_end = find_crlf(buf).ok_or(ChunkError::MissingSizeLine)?;
    let size = parse_size(&buf[..line_end])?;

    let after_line = &buf[line_end + 2..];
    if size > after_line.len() {
        return Err(ChunkError::Truncated {
            declared: size,
            available: after_line.len(),
        });
    }

    Ok(Chunk {
        size,
        data: &after_line[..size],
        rest: &after_line[size..],
    })
}

/// Parses the hex size token, ignoring any `;extension` suffix.
fn parse_size(line: &[u8]) -> Result<usize, ChunkError> {
    let token = match line.iter().position(|&b| b == b';') {
        Some(i) => &line[..i],
        None => line,
    }
    .trim_ascii();

    let invalid = || ChunkError::InvalidSize(String::from_utf8_lossy(line).into_owned());

    if token.is_empty() || !token.iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid());
    }
    // All hex digits, so this is valid UTF-8; only overflow can fail.
    let token = core::str::from_utf8(token).map_err(|_| invalid())?;
    usize::from_str_radix(token, 16).map_err(|_| invalid())
}

pub(crate) fn find_crlf(haystack: &[u8]) -> Option<usize> {
    find_slice(haystack, b"\r\n")
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
pub(crate) fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
