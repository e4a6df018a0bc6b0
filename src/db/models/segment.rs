use serde::{Deserialize, Serialize};

/// Row of the `segments` table: one encoded chunk video plus the wall-clock
/// range it covers. Written by the chunk-building pipeline, read by the
/// timeline catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRecord {
    pub id: String,
    /// Day key in `YYYYMMDD` form, derived from `start_ts`.
    pub date: String,
    /// Wall-clock bounds, seconds since epoch.
    pub start_ts: f64,
    pub end_ts: f64,
    pub frame_count: i64,
    /// Encoding rate of the chunk video. NULL when unknown.
    pub fps: Option<f64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub file_size_bytes: i64,
    pub video_path: String,
}

impl SegmentRecord {
    /// Wall-clock span in seconds.
    pub fn duration(&self) -> f64 {
        self.end_ts - self.start_ts
    }
}
