#![allow(dead_code)]

use {
    com::{Backend, TelemetryEvent, TelemetryServer},
    std::{net::SocketAddr, sync::Arc},
    telemetry::TelemetrySnapshot,
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        sync::{Mutex, broadcast},
        task::JoinHandle,
        time::{Duration, sleep, timeout},
    },
};

pub async fn next_event(rx: &mut broadcast::Receiver<TelemetryEvent>) -> TelemetryEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event timed out")
        .expect("event channel closed")
}

pub async fn wait_for_open(rx: &mut broadcast::Receiver<TelemetryEvent>) {
    loop {
        if let TelemetryEvent::Open = next_event(rx).await {
            return;
        }
    }
}

pub async fn wait_for_closed(rx: &mut broadcast::Receiver<TelemetryEvent>) {
    loop {
        if let TelemetryEvent::Closed = next_event(rx).await {
            return;
        }
    }
}

pub async fn wait_for_clients(server: &TelemetryServer, count: usize) {
    for _ in 0..100 {
        if server.client_count().await == count {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("server never reached {} clients", count);
}

pub fn ws_uri(addr: SocketAddr) -> http::Uri {
    Backend::from_addr(addr).telemetry_uri().expect("uri")
}

pub fn snapshot(fps: f64) -> TelemetrySnapshot {
    TelemetrySnapshot {
        fps,
        ..TelemetrySnapshot::default()
    }
}

/// An address nothing listens on.
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    listener.local_addr().expect("addr")
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Answers every HTTP request with the same canned response and records what
/// it was asked.
pub struct HttpResponder {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
    task: JoinHandle<()>,
}

impl HttpResponder {
    pub async fn json(status: u16, body: &str) -> Self {
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            if status < 400 { "OK" } else { "Error" },
            body.len(),
            body
        );
        Self::raw(response.into_bytes()).await
    }

    /// Write `response` verbatim and close the connection.
    pub async fn raw(response: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
        let addr = listener.local_addr().expect("addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn({
            let requests = requests.clone();
            async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    if let Some(recorded) = read_request(&mut stream).await {
                        requests.lock().await.push(recorded);
                    }
                    stream.write_all(&response).await.ok();
                    stream.shutdown().await.ok();
                }
            }
        });
        Self {
            addr,
            requests,
            task,
        }
    }

    pub fn backend(&self) -> Backend {
        Backend::from_addr(self.addr)
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().await.clone()
    }
}

impl Drop for HttpResponder {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(Recorded { method, path, body })
}
