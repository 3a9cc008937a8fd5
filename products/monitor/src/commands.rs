use {
    com::{ComError, Controls, LocalState},
    minifb::Key,
    std::sync::Arc,
    telemetry::TelemetrySnapshot,
    tokio::{
        sync::{mpsc, watch},
        task::JoinHandle,
    },
};

pub const THRESHOLD_STEP: f32 = 0.05;
const REQUEST_CAPACITY: usize = 16;

/// Something the operator asked for from the window loop.
#[derive(Debug, Clone)]
pub enum ControlRequest {
    ToggleCamera,
    ToggleDrawOnServer,
    StepThreshold(f32),
    FetchVault,
    FetchAnalytics,
    FetchHistory,
}

/// What came of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlOutcome {
    /// The backend accepted a command; this is the new local state.
    Committed(LocalState),
    /// A command failed or was refused. Local state is unchanged.
    Alert(String),
    /// Summary of a fetched listing.
    Report(String),
}

/// Map a pressed key to a request.
pub fn key_request(key: Key) -> Option<ControlRequest> {
    match key {
        Key::C => Some(ControlRequest::ToggleCamera),
        Key::D => Some(ControlRequest::ToggleDrawOnServer),
        Key::Up => Some(ControlRequest::StepThreshold(THRESHOLD_STEP)),
        Key::Down => Some(ControlRequest::StepThreshold(-THRESHOLD_STEP)),
        Key::V => Some(ControlRequest::FetchVault),
        Key::A => Some(ControlRequest::FetchAnalytics),
        Key::H => Some(ControlRequest::FetchHistory),
        _ => None,
    }
}

/// Window-side end of the controls task. Requests are served one at a time,
/// in order. Observed snapshots bypass the request queue; only the latest one
/// is applied.
pub struct ControlsHandle {
    requests: mpsc::Sender<ControlRequest>,
    observed: watch::Sender<Option<Arc<TelemetrySnapshot>>>,
    outcomes: mpsc::UnboundedReceiver<ControlOutcome>,
    task: JoinHandle<()>,
}

impl ControlsHandle {
    pub fn spawn(controls: Controls) -> Self {
        let (requests, request_rx) = mpsc::channel(REQUEST_CAPACITY);
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();
        let (observed, observed_rx) = watch::channel(None);
        let task = tokio::spawn(run(controls, request_rx, observed_rx, outcome_tx));
        Self {
            requests,
            observed,
            outcomes,
            task,
        }
    }

    /// Queue a request without waiting. Returns false when the queue is full
    /// or the task is gone.
    pub fn request(&self, request: ControlRequest) -> bool {
        match self.requests.try_send(request) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("control request dropped: {}", e);
                false
            }
        }
    }

    /// Keep the local camera state in line with the stream. Never blocks and
    /// never takes a request slot.
    pub fn observe(&self, snapshot: Arc<TelemetrySnapshot>) {
        self.observed.send_replace(Some(snapshot));
    }

    pub fn try_outcome(&mut self) -> Option<ControlOutcome> {
        self.outcomes.try_recv().ok()
    }

    /// Wait for the next outcome.
    pub async fn outcome(&mut self) -> Option<ControlOutcome> {
        self.outcomes.recv().await
    }
}

impl Drop for ControlsHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    mut controls: Controls,
    mut requests: mpsc::Receiver<ControlRequest>,
    mut observed: watch::Receiver<Option<Arc<TelemetrySnapshot>>>,
    outcomes: mpsc::UnboundedSender<ControlOutcome>,
) {
    loop {
        let request = tokio::select! {
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
            changed = observed.changed() => {
                if changed.is_err() {
                    break;
                }
                sync(&mut controls, &mut observed);
                continue;
            }
        };
        // a snapshot seen while the previous command was in flight
        sync(&mut controls, &mut observed);
        let outcome = match request {
            ControlRequest::ToggleCamera => committed("camera toggle", controls.toggle_camera().await),
            ControlRequest::ToggleDrawOnServer => {
                committed("server drawing", controls.toggle_draw_on_server().await)
            }
            ControlRequest::StepThreshold(delta) => {
                committed("confidence threshold", controls.step_threshold(delta).await)
            }
            ControlRequest::FetchVault => match controls.channel().fetch_recent_vault().await {
                Ok(records) => ControlOutcome::Report(match records.first() {
                    Some(latest) => format!(
                        "vault: {} records, latest {} {}",
                        records.len(),
                        latest.class_label(),
                        latest
                            .display_id()
                            .map_or_else(|| "?".to_string(), |id| id.to_string())
                    ),
                    None => "vault: empty".to_string(),
                }),
                Err(e) => alert("vault fetch", e),
            },
            ControlRequest::FetchAnalytics => match controls.channel().fetch_analytics().await {
                Ok(summary) => ControlOutcome::Report(format!(
                    "analytics: {} incidents, {} danger, {} warning",
                    summary.total_incidents, summary.danger_count, summary.warning_count
                )),
                Err(e) => alert("analytics fetch", e),
            },
            ControlRequest::FetchHistory => match controls.channel().fetch_history().await {
                Ok(logs) => ControlOutcome::Report(match logs.first() {
                    Some(latest) => format!(
                        "history: {} incidents, latest [{}] {}",
                        logs.len(),
                        latest.time,
                        latest.message
                    ),
                    None => "history: empty".to_string(),
                }),
                Err(e) => alert("history fetch", e),
            },
        };
        if outcomes.send(outcome).is_err() {
            break;
        }
    }
    log::debug!("controls task finished");
}

fn sync(controls: &mut Controls, observed: &mut watch::Receiver<Option<Arc<TelemetrySnapshot>>>) {
    if let Some(snapshot) = observed.borrow_and_update().as_deref() {
        controls.observe(snapshot);
    }
}

fn committed(what: &str, result: Result<LocalState, ComError>) -> ControlOutcome {
    match result {
        Ok(state) => ControlOutcome::Committed(state),
        Err(e) => alert(what, e),
    }
}

fn alert(what: &str, error: ComError) -> ControlOutcome {
    log::warn!("{} failed: {}", what, error);
    ControlOutcome::Alert(format!("{what} failed: {error}"))
}
