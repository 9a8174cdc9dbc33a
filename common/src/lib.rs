pub mod config;
pub mod frame;

pub use frame::{Frame, FrameIndex, FramePixels};
