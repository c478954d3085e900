pub mod playback;
pub mod processing;

pub use playback::CpalOutput;
