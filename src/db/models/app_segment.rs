use serde::{Deserialize, Serialize};

/// Row of the `appsegments` table: a wall-clock interval during which one
/// foreground application owned the screen. Presentation annotation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSegmentRecord {
    pub id: String,
    /// Bundle identifier of the frontmost app, when it could be determined.
    pub app_id: Option<String>,
    /// Day key in `YYYYMMDD` form, derived from `start_ts`.
    pub date: String,
    pub start_ts: f64,
    pub end_ts: f64,
}
