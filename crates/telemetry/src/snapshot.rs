use {
    crate::{Detection, IncidentLog, TelemetryError},
    base64::{Engine, engine::general_purpose::STANDARD},
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Substring of `camera_status` that marks a hardware fault.
pub const CAMERA_ERROR_MARKER: &str = "ERROR";

const DATA_URL_PREFIX: &str = "base64,";

/// State of the telemetry connection as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

/// Where the backend keeps its incident vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Vector,
    Local,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Vector => write!(f, "VECTOR"),
            StorageMode::Local => write!(f, "LOCAL"),
        }
    }
}

/// A base64-encoded JPEG carried inline in a snapshot.
///
/// The text is kept as received; a corrupt payload only fails when the frame
/// is decoded, never while the message is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedFrame(String);

impl EncodedFrame {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn encode(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the payload. A `data:` URL prefix is accepted and skipped.
    pub fn bytes(&self) -> Result<Vec<u8>, TelemetryError> {
        let text = match self.0.find(DATA_URL_PREFIX) {
            Some(index) if self.0.starts_with("data:") => &self.0[index + DATA_URL_PREFIX.len()..],
            _ => self.0.as_str(),
        };
        Ok(STANDARD.decode(text.trim())?)
    }
}

/// One complete telemetry update. Each snapshot replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub fps: f64,
    #[serde(rename = "latency")]
    pub latency_ms: f64,
    pub track_count: u32,
    #[serde(rename = "anomalies")]
    pub anomaly_count: u32,
    pub latest_analysis: String,
    pub detections: Vec<Detection>,
    #[serde(rename = "cam_active")]
    pub camera_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_status: Option<String>,
    #[serde(rename = "frame", default, skip_serializing_if = "Option::is_none")]
    pub encoded_frame: Option<EncodedFrame>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<IncidentLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_mode: Option<String>,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            fps: 0.0,
            latency_ms: 0.0,
            track_count: 0,
            anomaly_count: 0,
            latest_analysis: String::new(),
            detections: Vec::new(),
            camera_active: false,
            camera_status: None,
            encoded_frame: None,
            logs: Vec::new(),
            db_mode: None,
        }
    }
}

impl TelemetrySnapshot {
    pub fn from_json(text: &str) -> Result<Self, TelemetryError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TelemetryError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, TelemetryError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The status text when it reports a camera fault.
    pub fn camera_fault(&self) -> Option<&str> {
        self.camera_status
            .as_deref()
            .filter(|status| status.contains(CAMERA_ERROR_MARKER))
    }

    pub fn storage_mode(&self) -> StorageMode {
        match self.db_mode.as_deref() {
            Some("MILVUS") => StorageMode::Vector,
            _ => StorageMode::Local,
        }
    }

    pub fn detection(&self, id: i64) -> Option<&Detection> {
        self.detections.iter().find(|d| d.id == id)
    }
}
