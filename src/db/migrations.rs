use anyhow::Result;
use rusqlite::{params, Connection};

const SCHEMA_VERSION: &str = "1.0";

/// Create the metadata schema if it does not exist yet. Safe to run on
/// every open; an already-initialized store is left untouched.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version TEXT PRIMARY KEY,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    tx.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![SCHEMA_VERSION],
    )?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS segments (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            start_ts REAL NOT NULL,
            end_ts REAL NOT NULL,
            frame_count INTEGER NOT NULL,
            fps REAL,
            width INTEGER,
            height INTEGER,
            file_size_bytes INTEGER NOT NULL,
            video_path TEXT NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_segments_date ON segments(date)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_segments_start_ts ON segments(start_ts)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_segments_end_ts ON segments(end_ts)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS appsegments (
            id TEXT PRIMARY KEY,
            app_id TEXT,
            date TEXT NOT NULL,
            start_ts REAL NOT NULL,
            end_ts REAL NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_appsegments_date ON appsegments(date)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_appsegments_app_id ON appsegments(app_id)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_appsegments_start_ts ON appsegments(start_ts)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_appsegments_end_ts ON appsegments(end_ts)",
        [],
    )?;

    tx.commit()?;
    Ok(())
}
