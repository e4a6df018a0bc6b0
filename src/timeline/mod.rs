pub mod catalog;
pub mod mapper;
pub mod resolver;

pub use catalog::{CatalogController, CatalogSnapshot, CatalogState};
pub use mapper::{to_absolute_time, to_local_offset};
pub use resolver::{resolve, ResolvedPosition};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One encoded video file covering a contiguous slice of wall-clock time.
///
/// The catalog publishes these sorted ascending by `start_ts` and assumed
/// non-overlapping; the producing pipeline guarantees non-overlap, the
/// engine only relies on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    /// Wall-clock bounds, seconds since epoch. `end_ts >= start_ts`.
    pub start_ts: f64,
    pub end_ts: f64,
    pub frame_count: u32,
    /// Encoding rate. `None` (or a non-positive stored value) means the
    /// rate is unknown and wall-clock time maps 1:1 onto playback time.
    pub fps: Option<f64>,
    pub video_path: PathBuf,
}

impl Segment {
    /// Wall-clock span covered by this segment.
    pub fn duration(&self) -> f64 {
        self.end_ts - self.start_ts
    }

    /// Encoded playback length, when the encoding rate is known.
    ///
    /// This is usually much shorter than `duration()`: long real intervals
    /// are compressed into short clips at a fixed frame rate.
    pub fn video_duration(&self) -> Option<f64> {
        match self.fps {
            Some(fps) if fps > 0.0 && self.frame_count > 0 => {
                Some(self.frame_count as f64 / fps)
            }
            _ => None,
        }
    }

    pub fn contains(&self, absolute_time: f64) -> bool {
        absolute_time >= self.start_ts && absolute_time <= self.end_ts
    }
}

/// A wall-clock interval during which one foreground application owned the
/// screen. Annotation data only; the resolver never consults it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSpan {
    pub id: String,
    pub app_id: Option<String>,
    pub start_ts: f64,
    pub end_ts: f64,
}

/// Movement sign of the gesture that produced a time request. Determines
/// which edge of a gap the playhead lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Backward,
    Neutral,
    Forward,
}

impl Direction {
    /// Infer the sign from the delta against the last known position.
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Forward
        } else if delta < 0.0 {
            Direction::Backward
        } else {
            Direction::Neutral
        }
    }
}
