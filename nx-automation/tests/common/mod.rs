//! Shared stub HTTP server for transport tests.
//!
//! Accepts a single connection, records the full request, and replies
//! with a canned response. Enough HTTP/1.1 to satisfy reqwest; not a
//! general server.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A request as captured off the wire.
pub struct RecordedRequest {
    /// Request line plus headers, lowercased for case-insensitive checks.
    pub head: String,
    /// Request body bytes.
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn head_contains(&self, needle: &str) -> bool {
        self.head.contains(&needle.to_lowercase())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct StubServer {
    addr: SocketAddr,
    request_rx: oneshot::Receiver<RecordedRequest>,
}

impl StubServer {
    /// Spawn a one-shot server replying 200 with the given content type
    /// and body.
    pub async fn spawn(content_type: &str, response_body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (request_tx, request_rx) = oneshot::channel();

        let content_type = content_type.to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut buf = Vec::new();
            let header_end;
            loop {
                let mut chunk = [0u8; 4096];
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending a full request");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_header_end(&buf) {
                    header_end = pos;
                    break;
                }
            }

            let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);

            let body_start = header_end + 4;
            while buf.len() < body_start + content_length {
                let mut chunk = [0u8; 4096];
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed mid-body");
                buf.extend_from_slice(&chunk[..n]);
            }
            let body = buf[body_start..body_start + content_length].to_vec();

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                content_type,
                response_body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.write_all(&response_body).await.unwrap();
            socket.flush().await.unwrap();

            let _ = request_tx.send(RecordedRequest { head, body });
        });

        Self { addr, request_rx }
    }

    /// Base URL of the stub (used as the automation endpoint root).
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Wait for the recorded request.
    pub async fn recorded(self) -> RecordedRequest {
        self.request_rx.await.expect("stub server never got a request")
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
