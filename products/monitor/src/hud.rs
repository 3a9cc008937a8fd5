use {
    std::{fmt, time::Duration},
    telemetry::{ConnectionState, TelemetrySnapshot},
    tokio::time::Instant,
};

/// How long an alert stays in the title bar.
pub const ALERT_DURATION: Duration = Duration::from_secs(4);

/// Connection indicator shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Online,
    Reconnecting,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Connecting => write!(f, "CONNECTING"),
            LinkStatus::Online => write!(f, "ONLINE"),
            LinkStatus::Reconnecting => write!(f, "RECONNECTING"),
        }
    }
}

/// `HH:MM:SS`. Hours keep counting past 99.
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// State behind the window title.
#[derive(Debug)]
pub struct Hud {
    started: Instant,
    ever_opened: bool,
    alert: Option<(String, Instant)>,
}

impl Hud {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            ever_opened: false,
            alert: None,
        }
    }

    pub fn observe(&mut self, state: ConnectionState) {
        if state == ConnectionState::Open {
            self.ever_opened = true;
        }
    }

    pub fn status(&self, state: ConnectionState) -> LinkStatus {
        match state {
            ConnectionState::Open => LinkStatus::Online,
            _ if !self.ever_opened => LinkStatus::Connecting,
            _ => LinkStatus::Reconnecting,
        }
    }

    /// Show `message` until `ALERT_DURATION` has passed.
    pub fn alert(&mut self, message: impl Into<String>, now: Instant) {
        self.alert = Some((message.into(), now + ALERT_DURATION));
    }

    pub fn active_alert(&self, now: Instant) -> Option<&str> {
        match &self.alert {
            Some((message, until)) if now < *until => Some(message),
            _ => None,
        }
    }

    pub fn title(
        &self,
        snapshot: Option<&TelemetrySnapshot>,
        state: ConnectionState,
        now: Instant,
    ) -> String {
        let mut title = format!(
            "SENTINEL | {} | {}",
            self.status(state),
            format_uptime(now.saturating_duration_since(self.started))
        );
        if let Some(s) = snapshot {
            title.push_str(&format!(
                " | {:.0} FPS | {:.0} MS | {} TRACKS | {} ANOMALIES | {}",
                s.fps,
                s.latency_ms,
                s.track_count,
                s.anomaly_count,
                s.storage_mode()
            ));
            if !s.latest_analysis.is_empty() {
                title.push_str(" | ");
                title.push_str(&s.latest_analysis);
            }
            if state == ConnectionState::Closed {
                title.push_str(" | STALE");
            }
        }
        if let Some(alert) = self.active_alert(now) {
            title.push_str(" | ! ");
            title.push_str(alert);
        }
        title
    }
}
