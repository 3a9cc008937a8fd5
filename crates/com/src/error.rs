use {std::fmt, std::time::Duration, telemetry::TelemetryError};

#[derive(Debug)]
pub enum ComError {
    Io(std::io::Error),
    WebSocket(tokio_websockets::Error),
    Http(reqwest::Error),
    Status(u16),
    Telemetry(TelemetryError),
    InvalidEndpoint(String),
    Cooldown(Duration),
    ConnectionClosed,
    MessageTooLarge(u32),
}

impl fmt::Display for ComError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComError::Io(err) => write!(f, "io error: {err}"),
            ComError::WebSocket(err) => write!(f, "websocket error: {err}"),
            ComError::Http(err) => write!(f, "http error: {err}"),
            ComError::Status(code) => write!(f, "backend answered with status {code}"),
            ComError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            ComError::InvalidEndpoint(msg) => write!(f, "invalid endpoint: {msg}"),
            ComError::Cooldown(left) => write!(f, "cooling down for another {} ms", left.as_millis()),
            ComError::ConnectionClosed => write!(f, "connection closed"),
            ComError::MessageTooLarge(len) => write!(f, "message too large: {len} bytes"),
        }
    }
}

impl std::error::Error for ComError {}

impl From<std::io::Error> for ComError {
    fn from(err: std::io::Error) -> Self {
        ComError::Io(err)
    }
}

impl From<tokio_websockets::Error> for ComError {
    fn from(err: tokio_websockets::Error) -> Self {
        ComError::WebSocket(err)
    }
}

impl From<reqwest::Error> for ComError {
    fn from(err: reqwest::Error) -> Self {
        ComError::Http(err)
    }
}

impl From<TelemetryError> for ComError {
    fn from(err: TelemetryError) -> Self {
        ComError::Telemetry(err)
    }
}

impl From<serde_json::Error> for ComError {
    fn from(err: serde_json::Error) -> Self {
        ComError::Telemetry(TelemetryError::Parse(err))
    }
}
