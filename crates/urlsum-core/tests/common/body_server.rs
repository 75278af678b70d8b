//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body to every GET. Can delay the response or stall
//! part-way through the body to exercise fetch timeouts.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct BodyServerOptions {
    /// Sleep before sending anything (status line included).
    pub response_delay: Duration,
    /// Send this many body bytes, then sleep for the duration before the rest.
    pub stall_after: Option<(usize, Duration)>,
}

/// Starts a server in a background thread serving `body`. Returns the base URL
/// (e.g. "http://127.0.0.1:12345", no trailing slash). The server runs until the process exits.
pub fn start(body: impl Into<Vec<u8>>) -> String {
    start_with_options(body, BodyServerOptions::default())
}

/// Like `start` but with a delayed or stalling response.
pub fn start_with_options(body: impl Into<Vec<u8>>, opts: BodyServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body.into());
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, opts));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// A URL on a port nothing listens on (bound, then released).
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, body: &[u8], opts: BodyServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    if !read_request_head(&mut stream) {
        return;
    }
    if !opts.response_delay.is_zero() {
        thread::sleep(opts.response_delay);
    }
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    match opts.stall_after {
        Some((n, pause)) => {
            let n = n.min(body.len());
            let _ = stream.write_all(&body[..n]);
            let _ = stream.flush();
            thread::sleep(pause);
            let _ = stream.write_all(&body[n..]);
        }
        None => {
            let _ = stream.write_all(body);
        }
    }
}

/// Reads until the blank line ending the request head. False if the client went away.
fn read_request_head(stream: &mut TcpStream) -> bool {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return false,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    true
}
