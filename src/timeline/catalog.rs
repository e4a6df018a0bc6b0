//! Periodically refreshed, read-only snapshot of all known segments.
//!
//! The reload loop runs off the interactive path and publishes through a
//! watch channel: consumers always observe the most recent fully-formed
//! snapshot, never a partial one. A failed reload keeps the previous
//! segment list visible and only flips the state to `Error`.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::db::{AppSegmentRecord, Database, SegmentRecord};

use super::{AppSpan, Segment};

const RELOAD_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "message")]
pub enum CatalogState {
    /// A reload is in flight (including the very first one).
    Loading,
    /// Last reload succeeded with at least one segment.
    Loaded,
    /// Last reload succeeded but the store holds no segments yet. A normal
    /// condition, not an error.
    Empty,
    /// Last reload failed to open or query the store.
    Error(String),
}

/// Immutable snapshot handed to every reader between reloads.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub state: CatalogState,
    pub segments: Arc<Vec<Segment>>,
    pub app_spans: Arc<Vec<AppSpan>>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    pub fn initial() -> Self {
        Self {
            state: CatalogState::Loading,
            segments: Arc::new(Vec::new()),
            app_spans: Arc::new(Vec::new()),
            loaded_at: None,
        }
    }

    /// Wall-clock bounds of the whole recording, when any segments exist.
    pub fn range(&self) -> Option<(f64, f64)> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some((first.start_ts, last.end_ts))
    }
}

/// Owns the reload loop. Mirrors the shape of the other background workers:
/// `start` spawns, `stop` cancels and joins, `reload_now` forces one pass
/// (the user-facing retry action).
pub struct CatalogController {
    db: Database,
    tx: watch::Sender<CatalogSnapshot>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl CatalogController {
    pub fn new(db: Database) -> Self {
        let (tx, _rx) = watch::channel(CatalogSnapshot::initial());
        Self {
            db,
            tx,
            handle: None,
            cancel_token: None,
        }
    }

    /// Latest-snapshot accessor for pull-based consumers.
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.tx.borrow().clone()
    }

    /// Spawn the periodic reload loop. The first pass runs immediately.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            anyhow::bail!("catalog reload loop already running");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();
        let db = self.db.clone();
        let tx = self.tx.clone();

        let handle = tokio::spawn(reload_loop(db, tx, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Run one reload pass right away and return the resulting state.
    pub async fn reload_now(&self) -> CatalogState {
        reload(&self.db, &self.tx).await
    }

    pub async fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                error!("catalog reload loop failed to join: {err}");
            }
        }
    }
}

async fn reload_loop(
    db: Database,
    tx: watch::Sender<CatalogSnapshot>,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(Duration::from_secs(RELOAD_INTERVAL_SECS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                reload(&db, &tx).await;
            }
            _ = cancel_token.cancelled() => {
                info!("catalog reload loop shutting down");
                break;
            }
        }
    }
}

async fn reload(db: &Database, tx: &watch::Sender<CatalogSnapshot>) -> CatalogState {
    // Flag the pass without dropping the previous data from view.
    tx.send_modify(|snap| snap.state = CatalogState::Loading);

    let result = async {
        let segments = db.get_all_segments().await?;
        let app_spans = db.get_all_appsegments().await?;
        Ok::<_, anyhow::Error>((segments, app_spans))
    }
    .await;

    let state = match result {
        Ok((segment_rows, span_rows)) => {
            let segments = build_segments(segment_rows);
            let app_spans = build_app_spans(span_rows);
            let state = if segments.is_empty() {
                CatalogState::Empty
            } else {
                CatalogState::Loaded
            };
            // Whole-value replace: readers never see a half-updated list.
            // send_replace publishes even with zero receivers, which is the
            // normal case for pull-based consumers going through snapshot().
            tx.send_replace(CatalogSnapshot {
                state: state.clone(),
                segments: Arc::new(segments),
                app_spans: Arc::new(app_spans),
                loaded_at: Some(Utc::now()),
            });
            state
        }
        Err(err) => {
            let message = format!("{err:#}");
            error!("catalog reload failed: {message}");
            let state = CatalogState::Error(message);
            let failed_state = state.clone();
            tx.send_modify(move |snap| snap.state = failed_state);
            state
        }
    };

    state
}

/// Convert store rows into engine segments, dropping rows the resolver
/// cannot work with. The result stays sorted ascending by `start_ts`.
fn build_segments(rows: Vec<SegmentRecord>) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::with_capacity(rows.len());
    for row in rows {
        if !row.start_ts.is_finite() || !row.end_ts.is_finite() || row.end_ts < row.start_ts {
            warn!(
                "skipping segment {} with invalid bounds [{}, {}]",
                row.id, row.start_ts, row.end_ts
            );
            continue;
        }
        if row.video_path.is_empty() {
            warn!("skipping segment {} with empty video path", row.id);
            continue;
        }
        let fps = row.fps.filter(|f| f.is_finite() && *f > 0.0);
        segments.push(Segment {
            id: row.id,
            start_ts: row.start_ts,
            end_ts: row.end_ts,
            frame_count: row.frame_count.max(0) as u32,
            fps,
            video_path: PathBuf::from(row.video_path),
        });
    }
    segments.sort_by(|a, b| a.start_ts.total_cmp(&b.start_ts));
    segments
}

fn build_app_spans(rows: Vec<AppSegmentRecord>) -> Vec<AppSpan> {
    rows.into_iter()
        .filter(|row| row.start_ts.is_finite() && row.end_ts.is_finite())
        .map(|row| AppSpan {
            id: row.id,
            app_id: row.app_id,
            start_ts: row.start_ts,
            end_ts: row.end_ts,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{generate_segment_id, helpers::day_key};
    use crate::timeline::{resolver, Direction};

    fn record(start_ts: f64, end_ts: f64) -> SegmentRecord {
        SegmentRecord {
            id: generate_segment_id(),
            date: day_key(start_ts).unwrap(),
            start_ts,
            end_ts,
            frame_count: 500,
            fps: Some(5.0),
            width: None,
            height: None,
            file_size_bytes: 4096,
            video_path: format!("/tmp/chunks/{start_ts}.mp4"),
        }
    }

    async fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("meta.sqlite3")).unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn empty_store_reaches_empty_not_error() {
        let (_dir, db) = open_db().await;
        let controller = CatalogController::new(db);
        assert_eq!(controller.snapshot().state, CatalogState::Loading);

        let state = controller.reload_now().await;
        assert_eq!(state, CatalogState::Empty);
        assert!(controller.snapshot().segments.is_empty());
        assert!(controller.snapshot().loaded_at.is_some());
    }

    #[tokio::test]
    async fn loaded_snapshot_is_sorted_and_ranged() {
        let (_dir, db) = open_db().await;
        db.insert_segment(&record(150.0, 250.0)).await.unwrap();
        db.insert_segment(&record(0.0, 100.0)).await.unwrap();

        let controller = CatalogController::new(db);
        assert_eq!(controller.reload_now().await, CatalogState::Loaded);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.segments.len(), 2);
        assert_eq!(snapshot.segments[0].start_ts, 0.0);
        assert_eq!(snapshot.range(), Some((0.0, 250.0)));
    }

    #[tokio::test]
    async fn invalid_rows_are_skipped_not_fatal() {
        let (_dir, db) = open_db().await;
        db.insert_segment(&record(0.0, 100.0)).await.unwrap();
        // Inverted bounds.
        db.insert_segment(&record(500.0, 400.0)).await.unwrap();
        let mut pathless = record(600.0, 700.0);
        pathless.video_path = String::new();
        db.insert_segment(&pathless).await.unwrap();

        let controller = CatalogController::new(db);
        assert_eq!(controller.reload_now().await, CatalogState::Loaded);
        assert_eq!(controller.snapshot().segments.len(), 1);
    }

    #[tokio::test]
    async fn reload_publishes_without_any_subscriber() {
        let (_dir, db) = open_db().await;
        db.insert_segment(&record(0.0, 100.0)).await.unwrap();

        // No subscribe() call anywhere; snapshot() reads the sender side.
        let controller = CatalogController::new(db);
        assert_eq!(controller.reload_now().await, CatalogState::Loaded);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.segments.len(), 1);
        assert!(snapshot.loaded_at.is_some());
    }

    #[tokio::test]
    async fn failed_reload_keeps_the_previous_snapshot() {
        let (_dir, db) = open_db().await;
        db.insert_segment(&record(0.0, 100.0)).await.unwrap();

        let controller = CatalogController::new(db.clone());
        assert_eq!(controller.reload_now().await, CatalogState::Loaded);

        db.execute(|conn| {
            conn.execute("DROP TABLE segments", [])?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(matches!(
            controller.reload_now().await,
            CatalogState::Error(_)
        ));

        // The last good segment list stays visible under the Error state.
        let snapshot = controller.snapshot();
        assert!(matches!(snapshot.state, CatalogState::Error(_)));
        assert_eq!(snapshot.segments.len(), 1);
        assert!(snapshot.loaded_at.is_some());
    }

    #[tokio::test]
    async fn append_preserves_existing_resolutions() {
        let (_dir, db) = open_db().await;
        db.insert_segment(&record(0.0, 100.0)).await.unwrap();
        db.insert_segment(&record(150.0, 250.0)).await.unwrap();

        let controller = CatalogController::new(db.clone());
        controller.reload_now().await;
        let before = controller.snapshot();

        db.insert_segment(&record(300.0, 400.0)).await.unwrap();
        controller.reload_now().await;
        let after = controller.snapshot();

        assert_eq!(after.segments.len(), before.segments.len() + 1);
        for (time, direction) in [
            (40.0, Direction::Neutral),
            (120.0, Direction::Forward),
            (120.0, Direction::Backward),
            (-10.0, Direction::Neutral),
        ] {
            let old = resolver::resolve(&before.segments, time, direction).unwrap();
            let new = resolver::resolve(&after.segments, time, direction).unwrap();
            assert_eq!(
                (before.segments[old.index].id.clone(), old.local_offset),
                (after.segments[new.index].id.clone(), new.local_offset),
                "resolution changed for t={time}"
            );
        }
    }

    #[tokio::test]
    async fn subscribers_observe_whole_replacements() {
        let (_dir, db) = open_db().await;
        let controller = CatalogController::new(db.clone());
        let mut rx = controller.subscribe();

        db.insert_segment(&record(0.0, 100.0)).await.unwrap();
        controller.reload_now().await;

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.state, CatalogState::Loaded);
        assert_eq!(seen.segments.len(), 1);
    }
}
