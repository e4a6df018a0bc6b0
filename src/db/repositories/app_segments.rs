use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{models::AppSegmentRecord, Database};

fn row_to_app_segment(row: &Row) -> Result<AppSegmentRecord, rusqlite::Error> {
    Ok(AppSegmentRecord {
        id: row.get("id")?,
        app_id: row.get("app_id")?,
        date: row.get("date")?,
        start_ts: row.get("start_ts")?,
        end_ts: row.get("end_ts")?,
    })
}

impl Database {
    pub async fn insert_appsegment(&self, appsegment: &AppSegmentRecord) -> Result<()> {
        let record = appsegment.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO appsegments (id, app_id, date, start_ts, end_ts)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.app_id,
                    record.date,
                    record.start_ts,
                    record.end_ts,
                ],
            )
            .with_context(|| format!("failed to insert appsegment {}", record.id))?;
            Ok(())
        })
        .await
    }

    /// Full ordered activity-overlay list.
    pub async fn get_all_appsegments(&self) -> Result<Vec<AppSegmentRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, app_id, date, start_ts, end_ts
                 FROM appsegments ORDER BY start_ts ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut spans = Vec::new();
            while let Some(row) = rows.next()? {
                spans.push(row_to_app_segment(row)?);
            }
            Ok(spans)
        })
        .await
    }
}
