use anyhow::{anyhow, Result};
use chrono::DateTime;

pub fn finite(value: f64, field: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(anyhow!("{field} contains non-finite value {value}"))
    }
}

/// Day key (`YYYYMMDD`, UTC) for a wall-clock timestamp. Used as the `date`
/// column so whole days can be listed without range scans.
pub fn day_key(timestamp: f64) -> Result<String> {
    let secs = finite(timestamp, "timestamp")? as i64;
    let dt = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| anyhow!("timestamp {timestamp} outside representable range"))?;
    Ok(dt.format("%Y%m%d").to_string())
}
