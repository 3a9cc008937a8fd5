use {
    crate::ComError,
    futures_util::{SinkExt, StreamExt},
    std::{
        sync::{
            Arc,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        time::Duration,
    },
    telemetry::{ConnectionState, TelemetrySnapshot},
    tokio::{
        net::TcpStream,
        sync::{broadcast, watch},
        task::JoinHandle,
        time::{sleep, timeout},
    },
    tokio_websockets::{ClientBuilder, MaybeTlsStream, Message, WebSocketStream},
};

type TelemetryStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    reconnect_delay: Duration,
    max_message_size: usize,
    event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ClientConfig {
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

/// Notifications delivered to subscribers, in the order they happened.
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    Open,
    Snapshot(Arc<TelemetrySnapshot>),
    Closed,
}

struct Shared {
    events: broadcast::Sender<TelemetryEvent>,
    latest: watch::Sender<Option<Arc<TelemetrySnapshot>>>,
    state: watch::Sender<ConnectionState>,
    pending_reconnects: AtomicUsize,
    open_connections: AtomicUsize,
}

impl Shared {
    fn opened(&self) {
        self.open_connections.store(1, Ordering::SeqCst);
        self.state.send_replace(ConnectionState::Open);
        // No subscribers is fine.
        let _ = self.events.send(TelemetryEvent::Open);
    }

    fn closed(&self) {
        self.open_connections.store(0, Ordering::SeqCst);
        self.state.send_replace(ConnectionState::Closed);
        let _ = self.events.send(TelemetryEvent::Closed);
    }

    fn publish(&self, snapshot: TelemetrySnapshot) {
        let snapshot = Arc::new(snapshot);
        self.latest.send_replace(Some(Arc::clone(&snapshot)));
        let _ = self.events.send(TelemetryEvent::Snapshot(snapshot));
    }
}

/// Owned handle to a telemetry stream.
///
/// `connect` spawns a task that keeps one WebSocket connection to the backend
/// alive. Whenever the connection closes or cannot be established, the task
/// waits the configured delay and tries again, forever, until the handle is
/// closed or dropped.
pub struct TelemetryClient {
    uri: http::Uri,
    shared: Arc<Shared>,
    shutdown: watch::Sender<bool>,
    closed: AtomicBool,
    task: Option<JoinHandle<()>>,
}

impl TelemetryClient {
    /// Start streaming from `uri`. Returns immediately; must be called from
    /// within a tokio runtime.
    pub fn connect(uri: http::Uri, config: ClientConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity());
        let (latest, _) = watch::channel(None);
        let (state, _) = watch::channel(ConnectionState::Connecting);
        let shared = Arc::new(Shared {
            events,
            latest,
            state,
            pending_reconnects: AtomicUsize::new(0),
            open_connections: AtomicUsize::new(0),
        });
        let (shutdown, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run(
            uri.clone(),
            config,
            Arc::clone(&shared),
            shutdown_rx,
        ));

        Self {
            uri,
            shared,
            shutdown,
            closed: AtomicBool::new(false),
            task: Some(task),
        }
    }

    pub fn uri(&self) -> &http::Uri {
        &self.uri
    }

    /// Receive every event from now on. A receiver that falls more than
    /// `event_capacity` events behind skips the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryEvent> {
        self.shared.events.subscribe()
    }

    /// The most recent snapshot. It survives disconnects.
    pub fn snapshots(&self) -> watch::Receiver<Option<Arc<TelemetrySnapshot>>> {
        self.shared.latest.subscribe()
    }

    pub fn latest(&self) -> Option<Arc<TelemetrySnapshot>> {
        self.shared.latest.borrow().clone()
    }

    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Number of reconnect timers currently armed, 0 or 1.
    pub fn pending_reconnects(&self) -> usize {
        self.shared.pending_reconnects.load(Ordering::SeqCst)
    }

    /// Number of live sockets owned by this handle, 0 or 1.
    pub fn open_connections(&self) -> usize {
        self.shared.open_connections.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Cancel any pending reconnect and close the open connection. Calling
    /// this more than once has no further effect.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        log::debug!("closing telemetry stream {}", self.uri);
        self.shutdown.send_replace(true);
    }

    /// Wait for the connection task to finish. Only useful after `close`.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("telemetry task for {} failed: {}", self.uri, e);
            }
        }
    }
}

impl Drop for TelemetryClient {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run(
    uri: http::Uri,
    config: ClientConfig,
    shared: Arc<Shared>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let builder = ClientBuilder::from_uri(uri.clone());
        let connect = builder.connect();
        let result = tokio::select! {
            result = connect => result,
            _ = shutdown.changed() => break,
        };

        match result {
            Ok((mut stream, _response)) => {
                log::info!("telemetry stream open: {}", uri);
                shared.opened();
                let torn_down = read_stream(&mut stream, &config, &shared, &mut shutdown).await;
                shared.closed();
                if torn_down {
                    break;
                }
                log::warn!("telemetry stream closed: {}", uri);
            }
            Err(e) => {
                log::warn!("telemetry connect to {} failed: {}", uri, e);
                shared.closed();
            }
        }

        shared.pending_reconnects.store(1, Ordering::SeqCst);
        let cancelled = tokio::select! {
            _ = sleep(config.reconnect_delay()) => false,
            _ = shutdown.changed() => true,
        };
        shared.pending_reconnects.store(0, Ordering::SeqCst);
        if cancelled {
            break;
        }
        log::debug!("reconnecting to {}", uri);
    }

    shared.state.send_replace(ConnectionState::Closed);
    log::debug!("telemetry task for {} finished", uri);
}

/// Pump messages until the stream ends. Returns true when it ended because
/// of teardown.
async fn read_stream(
    stream: &mut TelemetryStream,
    config: &ClientConfig,
    shared: &Shared,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    loop {
        let next = tokio::select! {
            next = stream.next() => Some(next),
            _ = shutdown.changed() => None,
        };

        let Some(next) = next else {
            match timeout(CLOSE_TIMEOUT, stream.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::debug!("close handshake failed: {}", e),
                Err(_) => log::debug!("close handshake timed out"),
            }
            return true;
        };

        match next {
            Some(Ok(msg)) => {
                if let Err(e) = handle_message(msg, config, shared) {
                    log::warn!("dropping telemetry message: {}", e);
                }
            }
            Some(Err(e)) => {
                log::warn!("telemetry stream error: {}", e);
                return false;
            }
            None => return false,
        }
    }
}

fn handle_message(msg: Message, config: &ClientConfig, shared: &Shared) -> Result<(), ComError> {
    // Ping, pong and close frames carry no telemetry.
    if !msg.is_text() && !msg.is_binary() {
        return Ok(());
    }
    let payload = msg.into_payload();
    if payload.len() > config.max_message_size() {
        return Err(ComError::MessageTooLarge(
            u32::try_from(payload.len()).unwrap_or(u32::MAX),
        ));
    }
    let snapshot = TelemetrySnapshot::from_slice(&payload)?;
    shared.publish(snapshot);
    Ok(())
}
