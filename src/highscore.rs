//! Persists the single highscore integer between runs.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

const FILENAME: &str = "highscore";

#[derive(Debug, Clone)]
pub struct HighscoreFile {
    path: PathBuf,
}

impl HighscoreFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `BLOCKFALL_HIGHSCORE`, else the platform data directory, else the working directory.
    #[must_use]
    pub fn default_location() -> Self {
        if let Ok(path) = std::env::var("BLOCKFALL_HIGHSCORE") {
            return Self::new(PathBuf::from(path));
        }

        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("blockfall").join(FILENAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored highscore; 0 when the file is missing or unreadable.
    #[must_use]
    pub fn load(&self) -> u32 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| content.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }

    /// Writes the highscore, creating the parent directory if needed.
    pub fn save(&self, highscore: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, format!("{highscore}\n"))?;
        Ok(())
    }
}
