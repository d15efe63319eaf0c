use crate::app_dirs::AppDirs;
use crate::board::Perspective;
use crate::error::{Error, Result};
use crate::game::AbandonPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MIN_DURATION_SECS: u64 = 5;
pub const MAX_DURATION_SECS: u64 = 60;
pub const DEFAULT_DURATION_SECS: u64 = 30;

/// A session length that has already passed the bounds check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDuration(u64);

impl SessionDuration {
    pub fn new(secs: u64) -> Result<Self> {
        if (MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(Error::InvalidDuration {
                secs,
                min: MIN_DURATION_SECS,
                max: MAX_DURATION_SECS,
            })
        }
    }

    pub fn secs(&self) -> u64 {
        self.0
    }
}

impl Default for SessionDuration {
    fn default() -> Self {
        Self(DEFAULT_DURATION_SECS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration_secs: u64,
    pub perspective: Perspective,
    pub show_coordinates: bool,
    pub abandon_policy: AbandonPolicy,
    /// Statistics file used by save/load; the state dir default when unset
    pub history_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            perspective: Perspective::White,
            show_coordinates: false,
            abandon_policy: AbandonPolicy::default(),
            history_path: None,
        }
    }
}

impl Config {
    pub fn session_duration(&self) -> Result<SessionDuration> {
        SessionDuration::new(self.duration_secs)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::config_path().unwrap_or_else(|| PathBuf::from("coordrill_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Falls back to defaults when the file is missing or unreadable
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "config unreadable, using defaults"
                ),
            },
            Err(e) => tracing::debug!(
                path = %self.path.display(),
                error = %e,
                "no config file, using defaults"
            ),
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
