use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rawpost::{Error, HttpClient, Payload};

/// Reads one request (headers plus `Content-Length` bytes of body), answers
/// with `reply` and closes. Returns the request it saw.
fn serve_once(reply: &'static [u8]) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        stream.write_all(reply).unwrap();
        stream.shutdown(Shutdown::Both).ok();
        request
    });

    (port, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| l.strip_prefix("Content-Length: "))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8(data).unwrap()
}

#[test]
fn test_post_over_loopback() {
    let (port, server) = serve_once(
        b"HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}",
    );
    let client = HttpClient::new(&format!("http://127.0.0.1:{port}/items")).unwrap();

    let response = client.post(Payload::pairs([("name", "widget")])).unwrap();
    let request = server.join().unwrap();

    assert_eq!(response.status_code, 201);
    assert_eq!(response.status_text, "Created");
    assert_eq!(response.content_type, "application/json");
    assert_eq!(response.body, b"{}");
    assert!(request.starts_with("POST /items HTTP/1.1\r\n"));
    assert!(request.contains(&format!("Host: 127.0.0.1:{port}\r\n")));
    assert!(request.ends_with("\r\n\r\nname=widget"));
}

#[test]
fn test_chunked_reply_over_loopback() {
    let (port, server) = serve_once(
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n7\r\nchunked\r\n8\r\n payload\r\n0\r\n\r\n",
    );
    let client = HttpClient::new(&format!("http://127.0.0.1:{port}/")).unwrap();

    let response = client.post("ping").unwrap();
    server.join().unwrap();

    assert_eq!(response.body_text(), "chunked payload");
    assert_eq!(response.content_length, 15);
}

#[test]
fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut client = HttpClient::new(&format!("http://127.0.0.1:{port}/")).unwrap();
    client.set_timeout(1);

    let err = client.post("x").unwrap_err();
    assert!(matches!(err, Error::ConnectionFailure(_)), "got {err:?}");
}

#[test]
fn test_unresolvable_host() {
    let client = HttpClient::new("http://does-not-exist.invalid/").unwrap();
    let err = client.post("x").unwrap_err();
    assert!(matches!(err, Error::ConnectionFailure(_)), "got {err:?}");
}

#[test]
fn test_read_timeout_bounds_a_stalled_peer() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        // Say nothing until the client gives up.
        thread::sleep(Duration::from_millis(800));
    });

    let mut client = HttpClient::new(&format!("http://127.0.0.1:{port}/")).unwrap();
    client.set_read_timeout(Some(Duration::from_millis(200)));

    let err = client.post("x").unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, Error::ReadFailure(_)), "got {err:?}");
}

#[test]
fn test_silent_close_is_empty_response() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
    });

    let client = HttpClient::new(&format!("http://127.0.0.1:{port}/")).unwrap();
    let err = client.post("x").unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, Error::EmptyResponse), "got {err:?}");
}

#[test]
fn test_zero_connect_timeout_is_rejected() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let mut client = HttpClient::new(&format!("http://127.0.0.1:{port}/")).unwrap();
    client.set_timeout(0);

    let err = client.post("x").unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)), "got {err:?}");
}

#[cfg(feature = "tls")]
#[test]
fn test_plaintext_reply_to_handshake_is_connection_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut hello = [0u8; 512];
        stream.read(&mut hello).ok();
        stream
            .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
            .ok();
        stream.shutdown(Shutdown::Both).ok();
    });

    let client = HttpClient::new(&format!("https://127.0.0.1:{port}/")).unwrap();
    let err = client.post("x").unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, Error::ConnectionFailure(_)), "got {err:?}");
}

#[cfg(feature = "tls")]
#[test]
fn test_stalled_handshake_honours_connect_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (_stream, _) = listener.accept().unwrap();
        // Accept the socket, then never answer the ClientHello.
        thread::sleep(Duration::from_secs(3));
    });

    let mut client = HttpClient::new(&format!("https://127.0.0.1:{port}/")).unwrap();
    client.set_timeout(1);

    let started = Instant::now();
    let err = client.post("x").unwrap_err();
    let elapsed = started.elapsed();
    server.join().unwrap();

    assert!(matches!(err, Error::ConnectionFailure(_)), "got {err:?}");
    assert!(elapsed < Duration::from_millis(2500), "took {elapsed:?}");
}
