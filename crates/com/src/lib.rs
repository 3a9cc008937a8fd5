pub mod backend;
pub mod command;
pub mod controls;
pub mod error;
pub mod mjpeg;
pub mod ws;

pub use backend::Backend;
pub use command::{CommandChannel, CommandConfig};
pub use controls::{Controls, LocalState, ToggleGate};
pub use error::ComError;
pub use mjpeg::{JpegScanner, MjpegReader};
pub use ws::{ClientConfig, TelemetryClient, TelemetryEvent, TelemetryServer};
