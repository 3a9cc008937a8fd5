use {std::fmt, telemetry::TelemetryError};

#[derive(Debug)]
pub enum ImageError {
    Decode(String),
    Frame(TelemetryError),
    Closed,
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Decode(msg) => write!(f, "decode error: {msg}"),
            ImageError::Frame(err) => write!(f, "frame error: {err}"),
            ImageError::Closed => write!(f, "surface released"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<crates_image::ImageError> for ImageError {
    fn from(err: crates_image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

impl From<TelemetryError> for ImageError {
    fn from(err: TelemetryError) -> Self {
        ImageError::Frame(err)
    }
}
