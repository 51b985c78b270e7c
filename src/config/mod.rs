pub mod loader;
pub mod settings;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

pub use settings::Settings;

// Time to wait between checking for config file changes
const CONFIG_CHECK_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: Settings,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sound_enabled: bool,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            volume: 0.5,
        }
    }
}

/// Re-reads the config file whenever its modification time changes.
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    last_check: Instant,
}

impl ConfigWatcher {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let last_modified = std::fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .ok();

        Self {
            path,
            last_modified,
            last_check: Instant::now(),
        }
    }

    // Check at most once per interval, swallowing errors so a half-written file is retried
    pub fn poll(&mut self) -> Option<Config> {
        if self.last_check.elapsed() < CONFIG_CHECK_INTERVAL {
            return None;
        }
        self.last_check = Instant::now();

        match self.reload_if_changed() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to reload configuration: {e}");
                None
            }
        }
    }

    pub fn reload_if_changed(&mut self) -> Result<Option<Config>, loader::ConfigError> {
        let Ok(modified) = std::fs::metadata(&self.path).and_then(|m| m.modified()) else {
            return Ok(None);
        };

        if self.last_modified == Some(modified) {
            return Ok(None);
        }
        self.last_modified = Some(modified);

        loader::load_config_from(&self.path).map(Some)
    }
}
