//! Seams to the out-of-scope collaborators: the video renderer/decoder and
//! the frame-snapshot generator. Both are asynchronous and may complete
//! late; results carry the generation they were issued under so stale
//! completions can be discarded.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use super::state::PlaybackSnapshot;

/// How the renderer should position itself once a source finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeekMode {
    SeekPaused,
    SeekAndPlay,
}

/// The renderer/decoder the controller drives. Implementations report load
/// completion back through [`PlaybackController::on_source_ready`] /
/// [`on_source_failed`], echoing the generation passed here, and feed
/// playback progress into [`PlaybackController::on_tick`].
///
/// [`PlaybackController::on_source_ready`]: super::PlaybackController::on_source_ready
/// [`on_source_failed`]: super::PlaybackController::on_source_failed
/// [`PlaybackController::on_tick`]: super::PlaybackController::on_tick
#[async_trait]
pub trait VideoSurface: Send + Sync {
    /// Begin loading `video_path` positioned at `local_offset` seconds.
    /// Must not block; actual initialization happens in the background.
    async fn load(&self, video_path: PathBuf, local_offset: f64, mode: SeekMode, generation: u64);

    /// Resume or suspend playback of the already-loaded source.
    async fn set_playing(&self, playing: bool);
}

/// Produces a still image of a video at a local offset, used for the
/// frozen-frame overlay that masks source-swap latency.
#[async_trait]
pub trait FrameSnapshotter: Send + Sync {
    /// Returns encoded image bytes (PNG) for the frame at `local_offset`.
    async fn snapshot(&self, video_path: PathBuf, local_offset: f64) -> Result<Vec<u8>>;
}

/// Notifications for UI observers, published over a broadcast channel.
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    StateChanged(PlaybackSnapshot),
    /// A frozen-frame capture finished and still matches the displayed
    /// position.
    FrozenFrameReady { generation: u64, image: Arc<Vec<u8>> },
    /// The active segment's source failed repeatedly; worth surfacing.
    SourceError { message: String },
}
