//! User configuration persisted as JSON.
//!
//! Unknown fields are ignored and invalid values are coerced back to their
//! defaults with a warning, so a hand-edited config file never prevents the
//! app from starting.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;

const VALID_PROCESSING_INTERVALS: [u32; 6] = [1, 5, 10, 15, 30, 60];
const VALID_RETENTION_POLICIES: [&str; 4] = ["never", "1_day", "1_week", "1_month"];
const DEFAULT_PROCESSING_INTERVAL_MINUTES: u32 = 5;
const DEFAULT_RETENTION_POLICY: &str = "never";
const DEFAULT_FFMPEG_CRF: u32 = 28;
const DEFAULT_VIDEO_FPS: f64 = 30.0;
const DEFAULT_TIMELINE_SHORTCUT: &str = "cmd+shift+t";

/// How excluded applications are handled during capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionMode {
    /// Frames recorded while the app is frontmost are blacked out.
    #[default]
    Invisible,
    /// Frames are dropped entirely, leaving a timeline gap.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notifications {
    pub processing_complete: bool,
    pub low_disk_space: bool,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            processing_complete: false,
            low_disk_space: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub version: u32,
    pub processing_interval_minutes: u32,
    pub temp_retention_policy: String,
    pub recording_retention_policy: String,
    pub exclusion_mode: ExclusionMode,
    pub excluded_apps: Vec<String>,
    pub ffmpeg_crf: u32,
    pub video_fps: f64,
    pub timeline_shortcut: String,
    pub notifications: Notifications,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            processing_interval_minutes: DEFAULT_PROCESSING_INTERVAL_MINUTES,
            temp_retention_policy: DEFAULT_RETENTION_POLICY.to_string(),
            recording_retention_policy: DEFAULT_RETENTION_POLICY.to_string(),
            exclusion_mode: ExclusionMode::default(),
            excluded_apps: Vec::new(),
            ffmpeg_crf: DEFAULT_FFMPEG_CRF,
            video_fps: DEFAULT_VIDEO_FPS,
            timeline_shortcut: DEFAULT_TIMELINE_SHORTCUT.to_string(),
            notifications: Notifications::default(),
        }
    }
}

impl Settings {
    /// Replace out-of-range values with defaults instead of failing.
    pub fn sanitize(&mut self) {
        if !VALID_PROCESSING_INTERVALS.contains(&self.processing_interval_minutes) {
            warn!(
                "invalid processing interval {} minutes, using {}",
                self.processing_interval_minutes, DEFAULT_PROCESSING_INTERVAL_MINUTES
            );
            self.processing_interval_minutes = DEFAULT_PROCESSING_INTERVAL_MINUTES;
        }
        for policy in [
            &mut self.temp_retention_policy,
            &mut self.recording_retention_policy,
        ] {
            if !VALID_RETENTION_POLICIES.contains(&policy.as_str()) {
                warn!("invalid retention policy '{policy}', using {DEFAULT_RETENTION_POLICY}");
                *policy = DEFAULT_RETENTION_POLICY.to_string();
            }
        }
        if self.ffmpeg_crf > 51 {
            warn!("invalid ffmpeg crf {}, using {}", self.ffmpeg_crf, DEFAULT_FFMPEG_CRF);
            self.ffmpeg_crf = DEFAULT_FFMPEG_CRF;
        }
        if !self.video_fps.is_finite() || self.video_fps <= 0.0 {
            warn!("invalid video fps {}, using {}", self.video_fps, DEFAULT_VIDEO_FPS);
            self.video_fps = DEFAULT_VIDEO_FPS;
        }
        let before = self.excluded_apps.len();
        self.excluded_apps.retain(|app| {
            !app.is_empty()
                && app
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        });
        if self.excluded_apps.len() != before {
            warn!("dropped {} malformed excluded app entries", before - self.excluded_apps.len());
        }
        if self.timeline_shortcut.trim().is_empty() {
            self.timeline_shortcut = DEFAULT_TIMELINE_SHORTCUT.to_string();
        }
    }

    pub fn is_app_excluded(&self, bundle_id: &str) -> bool {
        self.excluded_apps.iter().any(|app| app == bundle_id)
    }
}

/// Shared settings with file-backed load and save.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    /// Load from `path`, failing if the file does not exist or is not JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("config at {} is not valid JSON", path.display()))?;
        settings.sanitize();
        Ok(Self {
            path: path.to_path_buf(),
            data: RwLock::new(settings),
        })
    }

    /// Load from `path`, falling back to defaults when the file is missing.
    /// A present-but-corrupt file is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self {
                path: path.to_path_buf(),
                data: RwLock::new(Settings::default()),
            })
        }
    }

    pub fn current(&self) -> Settings {
        self.data.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Sanitize, persist, and swap in new settings.
    pub fn save(&self, mut settings: Settings) -> Result<()> {
        settings.sanitize();
        let json = serde_json::to_string_pretty(&settings)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write config at {}", self.path.display()))?;
        *self.data.write().unwrap_or_else(|e| e.into_inner()) = settings;
        Ok(())
    }
}
