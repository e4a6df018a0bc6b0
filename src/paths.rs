//! Environment-aware path resolution.
//!
//! `PLAYBACK_DEV_MODE=1` keeps everything under a development root
//! (`PLAYBACK_DEV_ROOT`, or the current directory) instead of the user's
//! Library folders, so recordings made during development never mix with
//! real data.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};

pub const DEV_MODE_ENV: &str = "PLAYBACK_DEV_MODE";
pub const DEV_ROOT_ENV: &str = "PLAYBACK_DEV_ROOT";

pub fn is_development_mode() -> bool {
    env::var(DEV_MODE_ENV).map(|v| v == "1").unwrap_or(false)
}

/// Which per-day subtree a path request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayTree {
    /// Raw screenshots waiting to be encoded.
    Temp,
    /// Finished segment videos.
    Chunks,
}

impl DayTree {
    fn dir_name(self) -> &'static str {
        match self {
            DayTree::Temp => "temp",
            DayTree::Chunks => "chunks",
        }
    }
}

/// Resolved filesystem layout, constructed once and passed to whoever needs
/// it rather than consulted through globals.
#[derive(Debug, Clone)]
pub struct Paths {
    data_dir: PathBuf,
    logs_dir: PathBuf,
    config_path: PathBuf,
}

impl Paths {
    /// Resolve for the current environment. A home directory that cannot be
    /// determined is a configuration error reported to the caller.
    pub fn resolve() -> Result<Self> {
        if is_development_mode() {
            let root = match env::var_os(DEV_ROOT_ENV) {
                Some(root) => PathBuf::from(root),
                None => env::current_dir().context("cannot determine current directory")?,
            };
            Ok(Self {
                data_dir: root.join("dev_data"),
                logs_dir: root.join("dev_logs"),
                config_path: root.join("dev_config.json"),
            })
        } else {
            let home = dirs::home_dir().context("cannot determine home directory")?;
            let support = home.join("Library/Application Support/Playback");
            Ok(Self {
                data_dir: support.join("data"),
                logs_dir: home.join("Library/Logs/Playback"),
                config_path: support.join("config.json"),
            })
        }
    }

    /// Explicit roots, mainly for tests and embedding.
    pub fn with_roots(data_dir: PathBuf, logs_dir: PathBuf, config_path: PathBuf) -> Self {
        Self {
            data_dir,
            logs_dir,
            config_path,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.data_dir.join("temp")
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.data_dir.join("chunks")
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("meta.sqlite3")
    }

    /// Flag file whose presence tells the capture service to pause while
    /// the timeline viewer is open.
    pub fn timeline_open_signal_path(&self) -> PathBuf {
        self.data_dir.join(".timeline_open")
    }

    /// Day directory `YYYYMM/DD/` under temp/ or chunks/.
    pub fn day_dir(&self, date_str: &str, tree: DayTree) -> Result<PathBuf> {
        if date_str.len() != 8 || !date_str.bytes().all(|b| b.is_ascii_digit()) {
            bail!("date_str must be YYYYMMDD, got '{date_str}'");
        }
        let (year_month, day) = date_str.split_at(6);
        Ok(self
            .data_dir
            .join(tree.dir_name())
            .join(year_month)
            .join(day))
    }

    /// Create the data and log directories. Recording data is user-only;
    /// logs stay world-readable.
    pub fn ensure_data_directories(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.temp_dir(), &self.chunks_dir()] {
            create_dir_with_mode(dir, 0o700)?;
        }
        create_dir_with_mode(&self.logs_dir, 0o755)?;
        Ok(())
    }
}

fn create_dir_with_mode(path: &Path, mode: u32) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new()
            .recursive(true)
            .mode(mode)
            .create(path)
            .with_context(|| format!("failed to create directory {}", path.display()))?;
    }
    #[cfg(not(unix))]
    {
        let _ = mode;
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory {}", path.display()))?;
    }
    Ok(())
}
