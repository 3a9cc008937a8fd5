//! Typed telemetry model shared by the stream client, the frame source and
//! the overlay compositor.
//!
//! Every type mirrors one JSON shape produced by the sensing backend. Decoding
//! is strict: a message that is missing a required field or carries a field of
//! the wrong type is rejected as a whole.

pub mod detection;
pub mod error;
pub mod records;
pub mod settings;
pub mod snapshot;

pub use detection::{BoundingBox, Detection, Keypoint, Landmark};
pub use error::TelemetryError;
pub use records::{AnalyticsSummary, IncidentLog, Severity, VaultMetadata, VaultRecord};
pub use settings::{Settings, SettingsPatch};
pub use snapshot::{
    CAMERA_ERROR_MARKER, ConnectionState, EncodedFrame, StorageMode, TelemetrySnapshot,
};
