//! Native operator console for the sensing backend: live video with the
//! detection overlay, a status line and keyboard controls.

pub mod commands;
pub mod compose;
pub mod config;
pub mod hud;
pub mod presenter;

pub use commands::{ControlOutcome, ControlRequest, ControlsHandle, THRESHOLD_STEP, key_request};
pub use compose::{Video, compose};
pub use config::MonitorConfig;
pub use hud::{Hud, LinkStatus, format_uptime};
pub use presenter::PullPresenter;
