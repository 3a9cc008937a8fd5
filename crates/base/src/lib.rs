pub mod log;
pub use crate::log::{LevelFilter, init_file_logger, init_stdout_logger, parse_level};

mod rect;
pub use rect::*;

mod sequence;
pub use sequence::*;

mod vec2;
pub use vec2::*;

/// Width and height of the logical frame that detection geometry is authored in.
pub const LOGICAL_WIDTH: usize = 1280;
pub const LOGICAL_HEIGHT: usize = 720;

/// Logical frame size as a float vector, the form the compositor works in.
pub fn logical_size() -> Vec2<f32> {
    Vec2::new(LOGICAL_WIDTH as f32, LOGICAL_HEIGHT as f32)
}
