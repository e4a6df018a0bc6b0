//! Timeline continuity engine for a continuous screen recorder.
//!
//! Recordings are stored as many short, independently encoded video
//! segments with gaps between them. This crate reconciles that physical
//! layout with the single continuous timeline the viewer presents: the
//! segment catalog mirrors the metadata store, the resolver and mapper
//! translate wall-clock positions into segment-local video offsets, and
//! the playback controller drives a video surface through scrubbing,
//! playback, and segment handoffs.

pub mod db;
pub mod paths;
pub mod playback;
pub mod settings;
pub mod signal;
pub mod timeline;
pub mod video;

pub use db::Database;
pub use paths::Paths;
pub use playback::{PlaybackController, PlaybackEvent, PlaybackSnapshot, PlaybackStatus};
pub use settings::{Settings, SettingsStore};
pub use timeline::{CatalogController, CatalogSnapshot, CatalogState, Segment};

/// Initialize env_logger at info level unless `RUST_LOG` says otherwise.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
