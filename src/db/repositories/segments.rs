use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{helpers::finite, models::SegmentRecord, Database};

const SEGMENT_COLUMNS: &str =
    "id, date, start_ts, end_ts, frame_count, fps, width, height, file_size_bytes, video_path";

fn row_to_segment(row: &Row) -> Result<SegmentRecord, rusqlite::Error> {
    Ok(SegmentRecord {
        id: row.get("id")?,
        date: row.get("date")?,
        start_ts: row.get("start_ts")?,
        end_ts: row.get("end_ts")?,
        frame_count: row.get("frame_count")?,
        fps: row.get("fps")?,
        width: row.get("width")?,
        height: row.get("height")?,
        file_size_bytes: row.get("file_size_bytes")?,
        video_path: row.get("video_path")?,
    })
}

impl Database {
    /// Insert one segment row. Used by the producing pipeline; the timeline
    /// engine itself never writes.
    pub async fn insert_segment(&self, segment: &SegmentRecord) -> Result<()> {
        let record = segment.clone();
        self.execute(move |conn| {
            finite(record.start_ts, "start_ts")?;
            finite(record.end_ts, "end_ts")?;
            conn.execute(
                "INSERT INTO segments (id, date, start_ts, end_ts, frame_count, fps, width, height, file_size_bytes, video_path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.id,
                    record.date,
                    record.start_ts,
                    record.end_ts,
                    record.frame_count,
                    record.fps,
                    record.width,
                    record.height,
                    record.file_size_bytes,
                    record.video_path,
                ],
            )
            .with_context(|| format!("failed to insert segment {}", record.id))?;
            Ok(())
        })
        .await
    }

    pub async fn segment_exists(&self, segment_id: &str) -> Result<bool> {
        let segment_id = segment_id.to_string();
        self.execute(move |conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM segments WHERE id = ?1",
                    params![segment_id],
                    |row| row.get(0),
                )
                .context("failed to check segment existence")?;
            Ok(count > 0)
        })
        .await
    }

    /// Full ordered segment list. The catalog's reload path; ordering here
    /// is what the resolver's sorted-sequence assumption rests on.
    pub async fn get_all_segments(&self) -> Result<Vec<SegmentRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SEGMENT_COLUMNS} FROM segments ORDER BY start_ts ASC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut segments = Vec::new();
            while let Some(row) = rows.next()? {
                segments.push(row_to_segment(row)?);
            }
            Ok(segments)
        })
        .await
    }

    /// Segments overlapping the wall-clock window `[start_ts, end_ts]`.
    pub async fn get_segments_in_range(
        &self,
        start_ts: f64,
        end_ts: f64,
    ) -> Result<Vec<SegmentRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SEGMENT_COLUMNS} FROM segments
                 WHERE end_ts >= ?1 AND start_ts <= ?2
                 ORDER BY start_ts ASC"
            ))?;

            let mut rows = stmt.query(params![start_ts, end_ts])?;
            let mut segments = Vec::new();
            while let Some(row) = rows.next()? {
                segments.push(row_to_segment(row)?);
            }
            Ok(segments)
        })
        .await
    }

    /// Segments for one `YYYYMMDD` day key.
    pub async fn get_segments_by_date(&self, date: &str) -> Result<Vec<SegmentRecord>> {
        let date = date.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SEGMENT_COLUMNS} FROM segments WHERE date = ?1 ORDER BY start_ts ASC"
            ))?;

            let mut rows = stmt.query(params![date])?;
            let mut segments = Vec::new();
            while let Some(row) = rows.next()? {
                segments.push(row_to_segment(row)?);
            }
            Ok(segments)
        })
        .await
    }

    /// End timestamp of the most recent segment, if any exist.
    pub async fn get_latest_timestamp(&self) -> Result<Option<f64>> {
        self.execute(|conn| {
            conn.query_row("SELECT MAX(end_ts) FROM segments", [], |row| row.get(0))
                .context("failed to read latest segment timestamp")
        })
        .await
    }
}
