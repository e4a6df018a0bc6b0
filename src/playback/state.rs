use serde::Serialize;

use crate::timeline::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    /// No position established yet.
    Idle,
    /// A scrub gesture is in progress; transient until the settle timer fires.
    Scrubbing,
    Playing,
    Paused,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        PlaybackStatus::Idle
    }
}

/// UI-facing view of the session, emitted on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub absolute_time: f64,
    pub segment_id: Option<String>,
    pub local_offset: f64,
    pub show_frozen_frame: bool,
    pub at_start_boundary: bool,
}

/// The single piece of mutable engine state. The position is recomputed
/// from every resolver call, never incrementally drifted.
#[derive(Debug, Default)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub absolute_time: f64,
    pub local_offset: f64,
    pub active_segment: Option<Segment>,
    pub show_frozen_frame: bool,
    pub at_start_boundary: bool,
    /// Bumped on every scrub; a settle timer only fires if it still matches.
    pub scrub_generation: u64,
    /// Bumped on every source-swap request; readiness callbacks and the
    /// swap debounce check against it.
    pub swap_generation: u64,
    /// Bumped on every frozen-frame capture request; late snapshots whose
    /// generation no longer matches are dropped.
    pub snapshot_generation: u64,
    pub consecutive_source_failures: u32,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_position(&mut self, segment: Segment, local_offset: f64, absolute_time: f64) {
        self.absolute_time = absolute_time;
        self.local_offset = local_offset;
        self.active_segment = Some(segment);
    }

    pub fn active_segment_id(&self) -> Option<&str> {
        self.active_segment.as_ref().map(|s| s.id.as_str())
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            absolute_time: self.absolute_time,
            segment_id: self.active_segment.as_ref().map(|s| s.id.clone()),
            local_offset: self.local_offset,
            show_frozen_frame: self.show_frozen_frame,
            at_start_boundary: self.at_start_boundary,
        }
    }
}
