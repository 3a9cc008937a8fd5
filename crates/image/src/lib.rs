//! Video surface handling for the monitor.
//!
//! Frames either arrive inline in telemetry snapshots (push mode) or are read
//! from the backend's video feed (pull mode). Either way they end up decoded
//! and scaled onto a fixed-size RGB `Surface`.

pub mod decode;
pub mod error;
pub mod source;
pub mod surface;

pub use decode::{decode_frame, decode_frame_blocking};
pub use error::ImageError;
pub use source::{CurrentFrame, FrameMode, FrameSource, FrameSourceConfig};
pub use surface::{SharedSurface, Surface};
