use {
    crate::ComError,
    futures_util::{SinkExt, StreamExt},
    std::{
        collections::HashMap,
        net::SocketAddr,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    },
    telemetry::TelemetrySnapshot,
    tokio::{
        net::{TcpListener, ToSocketAddrs},
        sync::RwLock,
        task::JoinHandle,
    },
    tokio_websockets::{Message, ServerBuilder, WebSocketStream},
};

type WsSink = futures_util::stream::SplitSink<WebSocketStream<tokio::net::TcpStream>, Message>;

/// Minimal telemetry source speaking the backend's stream protocol.
///
/// Every connected client receives every message. Used as a loopback backend
/// in tests and for replaying recorded snapshots.
pub struct TelemetryServer {
    clients: Arc<RwLock<HashMap<SocketAddr, WsSink>>>,
    accepted: Arc<AtomicUsize>,
    accept_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl TelemetryServer {
    /// Bind a TCP listener and start accepting WebSocket connections.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let clients: Arc<RwLock<HashMap<SocketAddr, WsSink>>> =
            Arc::new(RwLock::new(HashMap::new()));
        let accepted = Arc::new(AtomicUsize::new(0));

        let accept_task = tokio::spawn({
            let clients = clients.clone();
            let accepted = accepted.clone();
            async move {
                loop {
                    let (tcp_stream, addr) = match listener.accept().await {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            log::warn!("accept error: {}", e);
                            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                            continue;
                        }
                    };

                    let ws_stream = match ServerBuilder::new().accept(tcp_stream).await {
                        Ok((_request, ws_stream)) => ws_stream,
                        Err(e) => {
                            log::warn!("websocket handshake failed for {}: {}", addr, e);
                            continue;
                        }
                    };
                    accepted.fetch_add(1, Ordering::SeqCst);

                    let (write_half, mut read_half) = ws_stream.split();
                    clients.write().await.insert(addr, write_half);

                    // Drain inbound frames so closes are noticed.
                    let clients = clients.clone();
                    tokio::spawn(async move {
                        loop {
                            match read_half.next().await {
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    log::debug!("client {} error: {}", addr, e);
                                    break;
                                }
                                None => break,
                            }
                        }
                        log::debug!("client {} disconnected", addr);
                        clients.write().await.remove(&addr);
                    });
                }
            }
        });

        Ok(Self {
            clients,
            accepted,
            accept_task,
            local_addr,
        })
    }

    /// Send a text message to every client. Clients that fail are dropped.
    pub async fn send_text(&self, text: &str) -> Result<(), ComError> {
        self.broadcast(Message::text(text.to_string())).await
    }

    pub async fn send_binary(&self, payload: Vec<u8>) -> Result<(), ComError> {
        self.broadcast(Message::binary(payload)).await
    }

    pub async fn send_snapshot(&self, snapshot: &TelemetrySnapshot) -> Result<(), ComError> {
        let text = snapshot.to_json()?;
        self.send_text(&text).await
    }

    async fn broadcast(&self, msg: Message) -> Result<(), ComError> {
        let mut lock = self.clients.write().await;
        let mut failed_addrs = Vec::new();

        for (addr, writer) in lock.iter_mut() {
            if let Err(e) = writer.send(msg.clone()).await {
                log::warn!("failed to send to {}: {}", addr, e);
                failed_addrs.push(*addr);
            }
        }

        for addr in failed_addrs {
            lock.remove(&addr);
        }

        Ok(())
    }

    /// Close every client connection from the server side.
    pub async fn disconnect_all(&self) {
        let mut lock = self.clients.write().await;
        for (addr, mut writer) in lock.drain() {
            if let Err(e) = writer.close().await {
                log::debug!("closing {} failed: {}", addr, e);
            }
        }
    }

    /// Number of currently connected clients.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Number of connections accepted since bind.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for TelemetryServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}
