//! Detection overlay: turns a telemetry snapshot into draw operations in the
//! logical frame, and rasterises them onto a video surface.

pub mod compositor;
pub mod glyphs;
pub mod raster;
pub mod skeleton;
pub mod viewport;

pub use compositor::{Corner, DrawOp, label_text, render};
pub use raster::{Paint, Style, draw_fault, draw_ops, draw_standby};
pub use skeleton::{Bone, SKELETON_PAIRS, links};
pub use viewport::Viewport;
