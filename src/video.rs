//! ffmpeg discovery and single-frame extraction.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::playback::FrameSnapshotter;

const KNOWN_BIN_DIRS: [&str; 3] = ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

fn find_tool(name: &str, env_var: &str) -> Result<PathBuf> {
    if let Some(path) = env::var_os(env_var) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(path);
        }
        bail!("{env_var} points at {} which does not exist", path.display());
    }
    for dir in KNOWN_BIN_DIRS {
        let candidate = Path::new(dir).join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    which::which(name).with_context(|| format!("{name} not found in known locations or PATH"))
}

/// Path to ffmpeg. `FFMPEG_PATH` overrides discovery.
pub fn ffmpeg_path() -> Result<PathBuf> {
    find_tool("ffmpeg", "FFMPEG_PATH")
}

/// Path to ffprobe. `FFPROBE_PATH` overrides discovery.
pub fn ffprobe_path() -> Result<PathBuf> {
    find_tool("ffprobe", "FFPROBE_PATH")
}

pub fn ffmpeg_available() -> bool {
    ffmpeg_path().is_ok()
}

/// Stream facts reported by ffprobe. Either field may be missing from a
/// container; segment rows store what was available at encode time.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProbe {
    pub duration_secs: Option<f64>,
    pub frame_count: Option<u64>,
}

/// Ask ffprobe for the first video stream's duration and frame count.
pub async fn probe_video(video_path: &Path) -> Result<VideoProbe> {
    let ffprobe = ffprobe_path()?;

    debug!("probing {}", video_path.display());
    let output = Command::new(&ffprobe)
        .arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("v:0")
        .arg("-show_entries")
        .arg("stream=nb_frames,duration")
        .arg("-of")
        .arg("json")
        .arg(video_path)
        .output()
        .await
        .with_context(|| format!("failed to run {}", ffprobe.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "ffprobe failed on {}: {}",
            video_path.display(),
            stderr.trim()
        );
    }
    parse_probe_output(&output.stdout)
}

fn parse_probe_output(raw: &[u8]) -> Result<VideoProbe> {
    let value: serde_json::Value =
        serde_json::from_slice(raw).context("ffprobe output is not valid JSON")?;
    let stream = value
        .get("streams")
        .and_then(|streams| streams.get(0))
        .ok_or_else(|| anyhow!("ffprobe reported no video stream"))?;

    // ffprobe emits numeric fields as JSON strings.
    let duration_secs = stream
        .get("duration")
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);
    let frame_count = stream
        .get("nb_frames")
        .and_then(|n| n.as_str())
        .and_then(|n| n.parse::<u64>().ok());

    Ok(VideoProbe {
        duration_secs,
        frame_count,
    })
}

/// Decode the frame at `local_offset` seconds into PNG bytes.
pub async fn extract_frame(video_path: &Path, local_offset: f64) -> Result<Vec<u8>> {
    let ffmpeg = ffmpeg_path()?;
    let offset = if local_offset.is_finite() {
        local_offset.max(0.0)
    } else {
        0.0
    };

    debug!("extracting frame at {offset:.3}s from {}", video_path.display());
    let output = Command::new(&ffmpeg)
        .arg("-v")
        .arg("error")
        .arg("-ss")
        .arg(format!("{offset:.3}"))
        .arg("-i")
        .arg(video_path)
        .arg("-frames:v")
        .arg("1")
        .arg("-f")
        .arg("image2pipe")
        .arg("-vcodec")
        .arg("png")
        .arg("-")
        .output()
        .await
        .with_context(|| format!("failed to run {}", ffmpeg.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "ffmpeg failed on {} at {offset:.3}s: {}",
            video_path.display(),
            stderr.trim()
        );
    }
    if output.stdout.is_empty() {
        bail!(
            "ffmpeg produced no frame for {} at {offset:.3}s",
            video_path.display()
        );
    }
    Ok(output.stdout)
}

/// ffmpeg-backed frame snapshotter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegSnapshotter;

#[async_trait]
impl FrameSnapshotter for FfmpegSnapshotter {
    async fn snapshot(&self, video_path: PathBuf, local_offset: f64) -> Result<Vec<u8>> {
        extract_frame(&video_path, local_offset).await
    }
}
