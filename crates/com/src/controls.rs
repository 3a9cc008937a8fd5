use {
    crate::{CommandChannel, ComError},
    std::time::Duration,
    telemetry::{Settings, SettingsPatch, TelemetrySnapshot},
    tokio::time::Instant,
};

/// Cool-down after a camera toggle completes, successful or not.
pub const TOGGLE_COOLDOWN: Duration = Duration::from_millis(800);

pub const MIN_THRESHOLD: f32 = 0.10;
pub const MAX_THRESHOLD: f32 = 0.95;

/// What the operator believes the backend is set to. Only changed after the
/// backend accepted a command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalState {
    pub settings: Settings,
    pub camera_active: bool,
}

/// Refuses a new toggle until the cool-down after the previous one elapsed.
#[derive(Debug, Clone)]
pub struct ToggleGate {
    cooldown: Duration,
    ready_at: Option<Instant>,
}

impl Default for ToggleGate {
    fn default() -> Self {
        Self::new(TOGGLE_COOLDOWN)
    }
}

impl ToggleGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            ready_at: None,
        }
    }

    pub fn check(&self, now: Instant) -> Result<(), ComError> {
        match self.ready_at {
            Some(ready_at) if now < ready_at => Err(ComError::Cooldown(ready_at - now)),
            _ => Ok(()),
        }
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.check(now).is_ok()
    }

    /// Start the cool-down. Called when a toggle request finishes.
    pub fn complete(&mut self, now: Instant) {
        self.ready_at = Some(now + self.cooldown);
    }
}

/// Operator controls over the command channel.
pub struct Controls {
    channel: CommandChannel,
    state: LocalState,
    gate: ToggleGate,
}

impl Controls {
    pub fn new(channel: CommandChannel) -> Self {
        Self {
            channel,
            state: LocalState::default(),
            gate: ToggleGate::default(),
        }
    }

    pub fn with_state(mut self, state: LocalState) -> Self {
        self.state = state;
        self
    }

    pub fn with_gate(mut self, gate: ToggleGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn state(&self) -> LocalState {
        self.state
    }

    pub fn channel(&self) -> &CommandChannel {
        &self.channel
    }

    /// Adopt the camera state reported by the backend.
    pub fn observe(&mut self, snapshot: &TelemetrySnapshot) {
        self.state.camera_active = snapshot.camera_active;
    }

    /// Ask the backend to flip the camera.
    pub async fn toggle_camera(&mut self) -> Result<LocalState, ComError> {
        self.set_camera(!self.state.camera_active).await
    }

    pub async fn set_camera(&mut self, enabled: bool) -> Result<LocalState, ComError> {
        self.gate.check(Instant::now())?;
        let result = self.channel.toggle_camera(enabled).await;
        self.gate.complete(Instant::now());
        result?;
        self.state.camera_active = enabled;
        log::info!("camera {}", if enabled { "enabled" } else { "disabled" });
        Ok(self.state)
    }

    pub async fn update_settings(&mut self, patch: SettingsPatch) -> Result<LocalState, ComError> {
        self.channel.update_settings(&patch).await?;
        self.state.settings.apply(&patch);
        Ok(self.state)
    }

    pub async fn toggle_draw_on_server(&mut self) -> Result<LocalState, ComError> {
        let draw = !self.state.settings.draw_on_server;
        self.update_settings(SettingsPatch::new().with_draw_on_server(draw))
            .await
    }

    /// Move the confidence threshold by `delta`, kept within the operator
    /// range of 0.10 to 0.95.
    pub async fn step_threshold(&mut self, delta: f32) -> Result<LocalState, ComError> {
        let threshold = step(self.state.settings.confidence_threshold, delta);
        self.update_settings(SettingsPatch::new().with_confidence_threshold(threshold))
            .await
    }
}

fn step(current: f32, delta: f32) -> f32 {
    // Round to two decimals so repeated steps do not drift.
    ((current + delta).clamp(MIN_THRESHOLD, MAX_THRESHOLD) * 100.0).round() / 100.0
}
