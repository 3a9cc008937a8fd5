use std::fmt;

#[derive(Debug)]
pub enum TelemetryError {
    Parse(serde_json::Error),
    Frame(base64::DecodeError),
    InvalidSetting(String),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Parse(err) => write!(f, "parse error: {err}"),
            TelemetryError::Frame(err) => write!(f, "frame payload error: {err}"),
            TelemetryError::InvalidSetting(msg) => write!(f, "invalid setting: {msg}"),
        }
    }
}

impl std::error::Error for TelemetryError {}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        TelemetryError::Parse(err)
    }
}

impl From<base64::DecodeError> for TelemetryError {
    fn from(err: base64::DecodeError) -> Self {
        TelemetryError::Frame(err)
    }
}
