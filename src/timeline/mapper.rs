//! Bidirectional mapping between absolute wall-clock time and a segment's
//! local playback offset.
//!
//! Encoded clips are rarely 1:1 with the wall-clock span they cover: a long
//! real interval gets compressed into a short clip at a fixed frame rate.
//! A purely linear rescale keeps scrubbing uniform across the whole segment
//! instead of the video appearing to stall near either edge. When the
//! encoding rate is unknown the mapping degrades to identity.

use super::Segment;

/// Convert an absolute wall-clock time into a playback offset inside
/// `segment`'s encoded video.
///
/// Total for any finite input: the time is clamped into the segment's
/// wall-clock bounds and the result into `[0, video_duration]`.
pub fn to_local_offset(segment: &Segment, absolute_time: f64) -> f64 {
    let duration = segment.duration().max(0.0);
    let wall_offset = (absolute_time - segment.start_ts).clamp(0.0, duration);

    let video_duration = match segment.video_duration() {
        Some(vd) if duration > 0.0 => vd,
        // Zero-length segment or unknown encoding rate: assume real-time.
        _ => return wall_offset,
    };

    let ratio = wall_offset / duration;
    if !ratio.is_finite() || ratio < 0.0 {
        return 0.0;
    }

    (video_duration * ratio.min(1.0)).clamp(0.0, video_duration)
}

/// Inverse of [`to_local_offset`]: convert a playback offset inside
/// `segment`'s encoded video back into absolute wall-clock time.
pub fn to_absolute_time(segment: &Segment, local_offset: f64) -> f64 {
    let local = local_offset.max(0.0);
    let duration = segment.duration().max(0.0);

    match segment.video_duration() {
        Some(video_duration) if video_duration > 0.0 && duration > 0.0 => {
            let ratio = (local / video_duration).clamp(0.0, 1.0);
            segment.start_ts + ratio * duration
        }
        _ => segment.start_ts + local.min(duration),
    }
}
