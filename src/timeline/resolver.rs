//! Deterministic resolution of an absolute time request against the segment
//! sequence: which segment to display, and where inside it.

use super::{mapper, Direction, Segment};

/// Outcome of a resolution: the chosen segment (by index into the sequence
/// that was resolved against), its local playback offset, and the effective
/// absolute time after pinning/clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPosition {
    pub index: usize,
    pub local_offset: f64,
    pub absolute_time: f64,
}

/// Resolve `requested` against a sorted, non-overlapping segment sequence.
///
/// Returns `None` only for an empty sequence. Priority order:
/// before-the-first pins to the first segment's start, after-the-last pins
/// to the last segment's end, a time inside a segment resolves there, and a
/// time inside a gap lands on the edge the gesture is moving toward
/// (nearest edge when no direction is established, earlier segment on an
/// exact tie).
pub fn resolve(
    segments: &[Segment],
    requested: f64,
    direction: Direction,
) -> Option<ResolvedPosition> {
    if segments.is_empty() {
        return None;
    }

    let first = &segments[0];
    let last = &segments[segments.len() - 1];

    if requested < first.start_ts {
        return Some(pin(segments, 0, first.start_ts));
    }
    if requested > last.end_ts {
        return Some(pin(segments, segments.len() - 1, last.end_ts));
    }

    // First segment whose end reaches the requested time. With a sorted
    // sequence this is the only in-range candidate.
    let idx = segments.partition_point(|s| s.end_ts < requested);
    if idx < segments.len() {
        let candidate = &segments[idx];
        if candidate.contains(requested) {
            return Some(ResolvedPosition {
                index: idx,
                local_offset: mapper::to_local_offset(candidate, requested),
                absolute_time: requested,
            });
        }

        if idx > 0 {
            // Requested time falls into the gap between idx-1 and idx.
            let before = idx - 1;
            let resolved = match direction {
                Direction::Backward => pin(segments, before, segments[before].end_ts),
                Direction::Forward => pin(segments, idx, segments[idx].start_ts),
                Direction::Neutral => {
                    let to_before = requested - segments[before].end_ts;
                    let to_after = segments[idx].start_ts - requested;
                    if to_before <= to_after {
                        pin(segments, before, segments[before].end_ts)
                    } else {
                        pin(segments, idx, segments[idx].start_ts)
                    }
                }
            };
            return Some(resolved);
        }
    }

    // Unreachable for a well-formed sequence; kept as a safety net. Scan
    // everything and take the segment with the smallest clamped distance.
    let mut best_index = 0;
    let mut best_absolute = first.start_ts;
    let mut best_distance = f64::INFINITY;
    for (i, seg) in segments.iter().enumerate() {
        let clamped = requested.max(seg.start_ts).min(seg.end_ts.max(seg.start_ts));
        let distance = (requested - clamped).abs();
        if distance < best_distance {
            best_index = i;
            best_absolute = clamped;
            best_distance = distance;
        }
    }
    Some(pin(segments, best_index, best_absolute))
}

fn pin(segments: &[Segment], index: usize, absolute_time: f64) -> ResolvedPosition {
    ResolvedPosition {
        index,
        local_offset: mapper::to_local_offset(&segments[index], absolute_time),
        absolute_time,
    }
}
