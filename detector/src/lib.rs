pub mod cache;
pub mod detect;
pub mod features;
pub mod source;

pub use scenecut_common::{Frame, FrameIndex};
