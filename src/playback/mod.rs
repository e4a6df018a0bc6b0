pub mod controller;
pub mod ports;
pub mod state;

pub use controller::PlaybackController;
pub use ports::{FrameSnapshotter, PlaybackEvent, SeekMode, VideoSurface};
pub use state::{PlaybackSnapshot, PlaybackStatus};
