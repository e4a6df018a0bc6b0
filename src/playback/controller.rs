//! Interactive playback session: consumes resolver output, debounces
//! video-source swaps, and orchestrates the frozen-frame fallback that
//! hides transition latency.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, ensure, Result};
use log::{debug, warn};
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
    time,
};

use crate::timeline::{mapper, resolver, CatalogSnapshot, Direction};

use super::ports::{FrameSnapshotter, PlaybackEvent, SeekMode, VideoSurface};
use super::state::{PlaybackSnapshot, PlaybackState, PlaybackStatus};

/// Quiescence window after the last scrub delta before the gesture counts
/// as settled.
const SCRUB_SETTLE_MS: u64 = 300;
/// Trailing-edge window for video-source swaps; rapid scrubbing across many
/// segments only initializes a decoder for the one the gesture lands on.
const SWAP_DEBOUNCE_MS: u64 = 120;
/// Tolerance within which a gesture just past a segment edge snaps back to
/// the exact edge instead of crossing into a gap or neighbor.
const BOUNDARY_STICK_SECS: f64 = 0.5;
/// Distance from the very first segment's start that counts as "at the
/// start boundary" (there is no video before it).
const START_BOUNDARY_EPSILON_SECS: f64 = 0.2;
/// Consecutive source-load failures tolerated before surfacing an error.
const SOURCE_FAILURE_THRESHOLD: u32 = 3;

#[derive(Clone)]
pub struct PlaybackController {
    state: Arc<Mutex<PlaybackState>>,
    catalog: watch::Receiver<CatalogSnapshot>,
    surface: Arc<dyn VideoSurface>,
    snapshotter: Arc<dyn FrameSnapshotter>,
    events: broadcast::Sender<PlaybackEvent>,
    settle_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    swap_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PlaybackController {
    pub fn new(
        catalog: watch::Receiver<CatalogSnapshot>,
        surface: Arc<dyn VideoSurface>,
        snapshotter: Arc<dyn FrameSnapshotter>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Arc::new(Mutex::new(PlaybackState::new())),
            catalog,
            surface,
            snapshotter,
            events,
            settle_timer: Arc::new(Mutex::new(None)),
            swap_timer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.state.lock().await.snapshot()
    }

    /// One delta of a continuous scrub gesture.
    pub async fn scrub(&self, requested_time: f64) -> Result<()> {
        ensure!(requested_time.is_finite(), "scrub time must be finite");

        let catalog = self.catalog.borrow().clone();
        let Some((range_start, range_end)) = catalog.range() else {
            bail!("no segments loaded");
        };
        let segments = Arc::clone(&catalog.segments);

        cancel_timer(&self.settle_timer).await;

        let mut frozen_capture: Option<(PathBuf, f64, u64)> = None;
        let mut swap_request: Option<u64> = None;
        let settle_generation;
        let snapshot;
        {
            let mut state = self.state.lock().await;
            state.scrub_generation += 1;
            settle_generation = state.scrub_generation;

            let clamped = requested_time.clamp(range_start, range_end);

            // There is no video before the first segment; on entering the
            // boundary, keep the last visible frame on screen.
            let at_start = clamped - range_start <= START_BOUNDARY_EPSILON_SECS;
            if at_start && !state.at_start_boundary {
                if let Some(active) = state.active_segment.clone() {
                    state.show_frozen_frame = true;
                    state.snapshot_generation += 1;
                    frozen_capture = Some((
                        active.video_path.clone(),
                        state.local_offset,
                        state.snapshot_generation,
                    ));
                }
            }
            state.at_start_boundary = at_start;

            // Boundary stick: a tiny, low-velocity gesture just past the
            // active segment's edge stays pinned to that edge.
            let mut corrected = clamped;
            if let Some(active) = &state.active_segment {
                if corrected > active.end_ts && corrected - active.end_ts <= BOUNDARY_STICK_SECS {
                    corrected = active.end_ts;
                } else if corrected < active.start_ts
                    && active.start_ts - corrected <= BOUNDARY_STICK_SECS
                {
                    corrected = active.start_ts;
                }
            }

            // A delta against the default position of 0.0 is meaningless
            // with epoch-scale timestamps; no direction until one exists.
            let direction = if state.active_segment.is_some() {
                Direction::from_delta(corrected - state.absolute_time)
            } else {
                Direction::Neutral
            };
            let Some(resolved) = resolver::resolve(segments.as_slice(), corrected, direction)
            else {
                bail!("no segments loaded");
            };
            let target = segments[resolved.index].clone();

            if state.active_segment_id() != Some(target.id.as_str()) {
                // Snapshot the outgoing frame before the source swap so the
                // overlay can mask the decoder spin-up.
                if frozen_capture.is_none() {
                    if let Some(outgoing) = state.active_segment.clone() {
                        state.show_frozen_frame = true;
                        state.snapshot_generation += 1;
                        frozen_capture = Some((
                            outgoing.video_path.clone(),
                            state.local_offset,
                            state.snapshot_generation,
                        ));
                    }
                }
                state.swap_generation += 1;
                swap_request = Some(state.swap_generation);
            }

            state.status = PlaybackStatus::Scrubbing;
            state.apply_position(target, resolved.local_offset, resolved.absolute_time);
            snapshot = state.snapshot();
        }

        if let Some((path, offset, generation)) = frozen_capture {
            self.spawn_frozen_capture(path, offset, generation);
        }
        if let Some(generation) = swap_request {
            self.arm_swap_debounce(generation).await;
        }
        self.arm_settle_timer(settle_generation).await;
        self.emit_state(snapshot);
        Ok(())
    }

    /// One-off jump (date picker, search hit). Resolves once and swaps the
    /// source immediately; no boundary stick, no debounce, no settle timer.
    pub async fn jump_to(&self, requested_time: f64) -> Result<()> {
        ensure!(requested_time.is_finite(), "jump time must be finite");

        let catalog = self.catalog.borrow().clone();
        let Some((range_start, range_end)) = catalog.range() else {
            bail!("no segments loaded");
        };
        let segments = Arc::clone(&catalog.segments);

        cancel_timer(&self.settle_timer).await;
        cancel_timer(&self.swap_timer).await;

        let mut frozen_capture: Option<(PathBuf, f64, u64)> = None;
        let load;
        let snapshot;
        {
            let mut state = self.state.lock().await;
            // Invalidate any in-flight settle timer.
            state.scrub_generation += 1;

            let clamped = requested_time.clamp(range_start, range_end);
            let Some(resolved) =
                resolver::resolve(segments.as_slice(), clamped, Direction::Neutral)
            else {
                bail!("no segments loaded");
            };
            let target = segments[resolved.index].clone();

            if state.active_segment_id() != Some(target.id.as_str()) {
                if let Some(outgoing) = state.active_segment.clone() {
                    state.show_frozen_frame = true;
                    state.snapshot_generation += 1;
                    frozen_capture = Some((
                        outgoing.video_path.clone(),
                        state.local_offset,
                        state.snapshot_generation,
                    ));
                }
            }

            let mode = if state.status == PlaybackStatus::Playing {
                SeekMode::SeekAndPlay
            } else {
                SeekMode::SeekPaused
            };
            state.swap_generation += 1;
            load = (
                target.video_path.clone(),
                resolved.local_offset,
                mode,
                state.swap_generation,
            );

            state.at_start_boundary = clamped - range_start <= START_BOUNDARY_EPSILON_SECS;
            if matches!(state.status, PlaybackStatus::Idle | PlaybackStatus::Scrubbing) {
                state.status = PlaybackStatus::Paused;
            }
            state.apply_position(target, resolved.local_offset, resolved.absolute_time);
            snapshot = state.snapshot();
        }

        if let Some((path, offset, generation)) = frozen_capture {
            self.spawn_frozen_capture(path, offset, generation);
        }
        let (path, offset, mode, generation) = load;
        self.surface.load(path, offset, mode, generation).await;
        self.emit_state(snapshot);
        Ok(())
    }

    pub async fn play(&self) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().await;
            match state.status {
                PlaybackStatus::Paused => state.status = PlaybackStatus::Playing,
                PlaybackStatus::Playing => return Ok(()),
                other => bail!("cannot start playback from {other:?}"),
            }
            state.snapshot()
        };
        self.surface.set_playing(true).await;
        self.emit_state(snapshot);
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().await;
            match state.status {
                PlaybackStatus::Playing => state.status = PlaybackStatus::Paused,
                PlaybackStatus::Paused => return Ok(()),
                other => bail!("cannot pause playback from {other:?}"),
            }
            state.snapshot()
        };
        self.surface.set_playing(false).await;
        self.emit_state(snapshot);
        Ok(())
    }

    /// Playback progress reported by the renderer. Local offsets map back
    /// to absolute time through the segment's ratio, never a naive
    /// `start + elapsed`.
    pub async fn on_tick(&self, local_offset: f64) {
        if !local_offset.is_finite() {
            return;
        }
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.status != PlaybackStatus::Playing {
                return;
            }
            let Some(active) = state.active_segment.clone() else {
                return;
            };
            let local = local_offset.max(0.0);
            state.absolute_time = mapper::to_absolute_time(&active, local);
            state.local_offset = local;
            state.snapshot()
        };
        self.emit_state(snapshot);
    }

    /// The renderer finished loading the source issued under `generation`.
    pub async fn on_source_ready(&self, generation: u64) {
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.swap_generation != generation {
                debug!("ignoring ready signal for superseded source (generation {generation})");
                return;
            }
            state.consecutive_source_failures = 0;
            if !state.at_start_boundary && state.status != PlaybackStatus::Scrubbing {
                state.show_frozen_frame = false;
            }
            state.snapshot()
        };
        self.emit_state(snapshot);
    }

    /// The renderer failed to load the source issued under `generation`.
    /// Isolated failures (a momentarily locked file) are tolerated quietly;
    /// only a run of them is surfaced.
    pub async fn on_source_failed(&self, generation: u64, reason: &str) {
        let surfaced = {
            let mut state = self.state.lock().await;
            if state.swap_generation != generation {
                debug!("ignoring failure for superseded source (generation {generation})");
                return;
            }
            state.consecutive_source_failures += 1;
            warn!(
                "video source load failed ({} consecutive): {reason}",
                state.consecutive_source_failures
            );
            state.consecutive_source_failures >= SOURCE_FAILURE_THRESHOLD
        };
        if surfaced {
            let _ = self.events.send(PlaybackEvent::SourceError {
                message: format!("video source repeatedly failed to load: {reason}"),
            });
        }
    }

    /// Abort outstanding timers. Late completions are already harmless via
    /// the generation checks; this just stops the clocks.
    pub async fn shutdown(&self) {
        cancel_timer(&self.settle_timer).await;
        cancel_timer(&self.swap_timer).await;
    }

    async fn arm_settle_timer(&self, generation: u64) {
        let mut guard = self.settle_timer.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }
        let controller = self.clone();
        *guard = Some(tokio::spawn(async move {
            time::sleep(Duration::from_millis(SCRUB_SETTLE_MS)).await;
            let snapshot = {
                let mut state = controller.state.lock().await;
                if state.scrub_generation != generation
                    || state.status != PlaybackStatus::Scrubbing
                {
                    return;
                }
                state.status = PlaybackStatus::Paused;
                if !state.at_start_boundary {
                    state.show_frozen_frame = false;
                }
                state.snapshot()
            };
            controller.emit_state(snapshot);
        }));
    }

    async fn arm_swap_debounce(&self, generation: u64) {
        let mut guard = self.swap_timer.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }
        let controller = self.clone();
        *guard = Some(tokio::spawn(async move {
            time::sleep(Duration::from_millis(SWAP_DEBOUNCE_MS)).await;
            let request = {
                let state = controller.state.lock().await;
                if state.swap_generation != generation {
                    debug!("skipping superseded source swap (generation {generation})");
                    None
                } else {
                    state
                        .active_segment
                        .as_ref()
                        .map(|seg| (seg.video_path.clone(), state.local_offset))
                }
            };
            if let Some((path, offset)) = request {
                controller
                    .surface
                    .load(path, offset, SeekMode::SeekPaused, generation)
                    .await;
            }
        }));
    }

    fn spawn_frozen_capture(&self, video_path: PathBuf, local_offset: f64, generation: u64) {
        let controller = self.clone();
        tokio::spawn(async move {
            match controller.snapshotter.snapshot(video_path, local_offset).await {
                Ok(image) => {
                    let still_current =
                        controller.state.lock().await.snapshot_generation == generation;
                    if !still_current {
                        debug!("dropping stale frozen-frame capture (generation {generation})");
                        return;
                    }
                    let _ = controller.events.send(PlaybackEvent::FrozenFrameReady {
                        generation,
                        image: Arc::new(image),
                    });
                }
                Err(err) => warn!("frozen-frame capture failed: {err:#}"),
            }
        });
    }

    fn emit_state(&self, snapshot: PlaybackSnapshot) {
        let _ = self.events.send(PlaybackEvent::StateChanged(snapshot));
    }
}

async fn cancel_timer(slot: &Mutex<Option<JoinHandle<()>>>) {
    if let Some(handle) = slot.lock().await.take() {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{CatalogState, Segment};
    use chrono::Utc;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MockSurface {
        loads: StdMutex<Vec<(PathBuf, f64, SeekMode, u64)>>,
        playing: StdMutex<Vec<bool>>,
    }

    #[async_trait::async_trait]
    impl VideoSurface for MockSurface {
        async fn load(
            &self,
            video_path: PathBuf,
            local_offset: f64,
            mode: SeekMode,
            generation: u64,
        ) {
            self.loads
                .lock()
                .unwrap()
                .push((video_path, local_offset, mode, generation));
        }

        async fn set_playing(&self, playing: bool) {
            self.playing.lock().unwrap().push(playing);
        }
    }

    struct SlowSnapshotter {
        delay_ms: u64,
    }

    #[async_trait::async_trait]
    impl FrameSnapshotter for SlowSnapshotter {
        async fn snapshot(&self, _video_path: PathBuf, _local_offset: f64) -> Result<Vec<u8>> {
            if self.delay_ms > 0 {
                time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            Ok(vec![0u8; 8])
        }
    }

    fn segment(id: &str, start_ts: f64, end_ts: f64) -> Segment {
        Segment {
            id: id.into(),
            start_ts,
            end_ts,
            frame_count: 500,
            fps: Some(5.0),
            video_path: PathBuf::from(format!("/tmp/{id}.mp4")),
        }
    }

    fn catalog_of(segments: Vec<Segment>) -> watch::Receiver<CatalogSnapshot> {
        let state = if segments.is_empty() {
            CatalogState::Empty
        } else {
            CatalogState::Loaded
        };
        let (_tx, rx) = watch::channel(CatalogSnapshot {
            state,
            segments: Arc::new(segments),
            app_spans: Arc::new(Vec::new()),
            loaded_at: Some(Utc::now()),
        });
        // The controller only pulls via borrow(), so the receiver keeps
        // working after the sender is gone.
        rx
    }

    fn controller_with(
        segments: Vec<Segment>,
        snapshot_delay_ms: u64,
    ) -> (PlaybackController, Arc<MockSurface>) {
        let surface = Arc::new(MockSurface::default());
        let controller = PlaybackController::new(
            catalog_of(segments),
            surface.clone(),
            Arc::new(SlowSnapshotter {
                delay_ms: snapshot_delay_ms,
            }),
        );
        (controller, surface)
    }

    fn gapped() -> Vec<Segment> {
        vec![segment("a", 0.0, 100.0), segment("b", 150.0, 250.0)]
    }

    #[tokio::test]
    async fn scrub_with_no_segments_is_an_error() {
        let (controller, _surface) = controller_with(Vec::new(), 0);
        assert!(controller.scrub(10.0).await.is_err());
        assert!(controller.jump_to(10.0).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn scrub_settles_into_paused_after_quiescence() {
        let (controller, _surface) = controller_with(gapped(), 0);

        controller.scrub(40.0).await.unwrap();
        assert_eq!(controller.snapshot().await.status, PlaybackStatus::Scrubbing);

        time::sleep(Duration::from_millis(400)).await;
        let snap = controller.snapshot().await;
        assert_eq!(snap.status, PlaybackStatus::Paused);
        assert!(!snap.show_frozen_frame);
        assert_eq!(snap.absolute_time, 40.0);
        assert_eq!(snap.segment_id.as_deref(), Some("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn another_scrub_rearms_the_settle_timer() {
        let (controller, _surface) = controller_with(gapped(), 0);

        controller.scrub(40.0).await.unwrap();
        time::sleep(Duration::from_millis(200)).await;
        controller.scrub(42.0).await.unwrap();
        time::sleep(Duration::from_millis(200)).await;
        // 400ms since the first scrub but only 200ms since the last one.
        assert_eq!(controller.snapshot().await.status, PlaybackStatus::Scrubbing);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(controller.snapshot().await.status, PlaybackStatus::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn tiny_gesture_sticks_to_the_segment_edge() {
        let (controller, _surface) = controller_with(gapped(), 0);

        controller.jump_to(50.0).await.unwrap();
        controller.scrub(100.3).await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.absolute_time, 100.0);
        assert_eq!(snap.segment_id.as_deref(), Some("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn first_scrub_into_a_gap_takes_the_nearer_edge() {
        // Epoch-scale timestamps: before any position exists, the request
        // must resolve undirected instead of as a forward gesture.
        let base = 1_700_000_000.0;
        let (controller, _surface) = controller_with(
            vec![
                segment("a", base, base + 100.0),
                segment("b", base + 150.0, base + 250.0),
            ],
            0,
        );

        controller.scrub(base + 120.0).await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.segment_id.as_deref(), Some("a"));
        assert_eq!(snap.absolute_time, base + 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn forward_scrub_across_a_gap_lands_on_the_next_start() {
        let (controller, _surface) = controller_with(gapped(), 0);

        controller.jump_to(50.0).await.unwrap();
        controller.scrub(120.0).await.unwrap();

        let snap = controller.snapshot().await;
        assert_eq!(snap.segment_id.as_deref(), Some("b"));
        assert_eq!(snap.absolute_time, 150.0);
        assert_eq!(snap.local_offset, 0.0);
        assert!(snap.show_frozen_frame);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_scrubbing_loads_only_the_final_segment() {
        let segments = vec![
            segment("a", 0.0, 100.0),
            segment("b", 150.0, 250.0),
            segment("c", 300.0, 400.0),
        ];
        let (controller, surface) = controller_with(segments, 0);

        controller.jump_to(40.0).await.unwrap();
        controller.scrub(160.0).await.unwrap();
        controller.scrub(320.0).await.unwrap();
        time::sleep(Duration::from_millis(500)).await;

        let loads = surface.loads.lock().unwrap().clone();
        // The initial jump plus the debounced landing; b was skipped over.
        assert_eq!(loads.len(), 2);
        assert!(loads[0].0.ends_with("a.mp4"));
        assert!(loads[1].0.ends_with("c.mp4"));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_frozen_frame_captures_are_dropped() {
        let (controller, _surface) = controller_with(
            vec![
                segment("a", 0.0, 100.0),
                segment("b", 150.0, 250.0),
                segment("c", 300.0, 400.0),
            ],
            500,
        );
        let mut events = controller.subscribe_events();

        controller.jump_to(40.0).await.unwrap();
        controller.scrub(160.0).await.unwrap(); // capture of a, generation 1
        controller.scrub(320.0).await.unwrap(); // capture of b, generation 2
        time::sleep(Duration::from_millis(1500)).await;

        let mut frozen_generations = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let PlaybackEvent::FrozenFrameReady { generation, .. } = event {
                frozen_generations.push(generation);
            }
        }
        assert_eq!(frozen_generations, vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_boundary_keeps_the_frozen_frame_after_settle() {
        let (controller, _surface) =
            controller_with(vec![segment("a", 10.0, 100.0), segment("b", 150.0, 250.0)], 0);

        controller.jump_to(50.0).await.unwrap();
        controller.scrub(10.05).await.unwrap();

        let snap = controller.snapshot().await;
        assert!(snap.at_start_boundary);
        assert!(snap.show_frozen_frame);

        time::sleep(Duration::from_millis(400)).await;
        let snap = controller.snapshot().await;
        assert_eq!(snap.status, PlaybackStatus::Paused);
        assert!(snap.show_frozen_frame);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_map_back_through_the_segment_ratio() {
        // 200s of wall clock in 100s of video.
        let (controller, _surface) = controller_with(vec![segment("a", 0.0, 200.0)], 0);

        controller.jump_to(0.0).await.unwrap();
        controller.play().await.unwrap();
        controller.on_tick(25.0).await;

        let snap = controller.snapshot().await;
        assert_eq!(snap.absolute_time, 50.0);
        assert_eq!(snap.local_offset, 25.0);
    }

    #[tokio::test]
    async fn play_is_only_valid_from_steady_states() {
        let (controller, surface) = controller_with(gapped(), 0);
        assert!(controller.play().await.is_err());

        controller.jump_to(40.0).await.unwrap();
        controller.play().await.unwrap();
        controller.pause().await.unwrap();
        assert_eq!(*surface.playing.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn ready_for_a_superseded_source_changes_nothing() {
        let (controller, surface) = controller_with(gapped(), 0);

        controller.jump_to(40.0).await.unwrap();
        controller.jump_to(160.0).await.unwrap();
        let snap = controller.snapshot().await;
        assert!(snap.show_frozen_frame);

        let stale_generation = surface.loads.lock().unwrap()[0].3;
        controller.on_source_ready(stale_generation).await;
        assert!(controller.snapshot().await.show_frozen_frame);

        let current_generation = surface.loads.lock().unwrap()[1].3;
        controller.on_source_ready(current_generation).await;
        assert!(!controller.snapshot().await.show_frozen_frame);
    }

    #[tokio::test]
    async fn repeated_source_failures_escalate_once_threshold_is_hit() {
        let (controller, surface) = controller_with(gapped(), 0);
        let mut events = controller.subscribe_events();

        controller.jump_to(40.0).await.unwrap();
        let generation = surface.loads.lock().unwrap()[0].3;

        controller.on_source_failed(generation, "file locked").await;
        controller.on_source_failed(generation, "file locked").await;
        let mut surfaced = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, PlaybackEvent::SourceError { .. }) {
                surfaced += 1;
            }
        }
        assert_eq!(surfaced, 0);

        controller.on_source_failed(generation, "file locked").await;
        let mut surfaced = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, PlaybackEvent::SourceError { .. }) {
                surfaced += 1;
            }
        }
        assert_eq!(surfaced, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn a_success_resets_the_failure_counter() {
        let (controller, surface) = controller_with(gapped(), 0);
        let mut events = controller.subscribe_events();

        controller.jump_to(40.0).await.unwrap();
        let generation = surface.loads.lock().unwrap()[0].3;

        controller.on_source_failed(generation, "busy").await;
        controller.on_source_failed(generation, "busy").await;
        controller.on_source_ready(generation).await;
        controller.on_source_failed(generation, "busy").await;
        controller.on_source_failed(generation, "busy").await;

        while let Ok(event) = events.try_recv() {
            assert!(!matches!(event, PlaybackEvent::SourceError { .. }));
        }
    }
}
