pub mod frames;
pub mod stats;

pub use frames::{centered_frame_count, centered_frame_power};
