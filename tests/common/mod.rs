//! Shared helpers for integration tests.
#![allow(dead_code)]

use redirector::probe::health_url;
use redirector::{HttpReply, Transport, TransportError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// FakeTransport
// ---------------------------------------------------------------------------

/// Canned replies keyed by host; hosts without a reply are unreachable.
#[derive(Clone, Default)]
pub struct FakeTransport {
    replies: Rc<RefCell<HashMap<String, HttpReply>>>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `{"server": "<tag>"}` for `host`.
    pub fn healthy(self, host: &str, tag: &str) -> Self {
        self.reply(host, HttpReply::ok(format!(r#"{{"server": "{}"}}"#, tag)))
    }

    pub fn reply(self, host: &str, reply: HttpReply) -> Self {
        self.replies.borrow_mut().insert(health_url(host), reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str) -> Result<HttpReply, TransportError> {
        self.calls.borrow_mut().push(url.to_string());
        self.replies
            .borrow()
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError("connection refused".to_string()))
    }
}

// ---------------------------------------------------------------------------
// HealthServer: a tiny blocking HTTP server
// ---------------------------------------------------------------------------

/// Serves the same status and body to every request until the test exits.
pub struct HealthServer {
    pub addr: SocketAddr,
}

impl HealthServer {
    pub fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                // Drain the request head
                while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                    if line == "\r\n" || line == "\n" {
                        break;
                    }
                    line.clear();
                }
                let response = format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { addr }
    }

    pub fn host(&self) -> String {
        self.addr.to_string()
    }
}

/// A localhost address nothing is listening on.
pub fn closed_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}
