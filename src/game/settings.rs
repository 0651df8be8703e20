use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::StoreError;
use crate::model::ScoringRules;

const DATA_DIR_ENV: &str = "SIGNOS_DATA_DIR";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default = "default_questions_per_level")]
    pub questions_per_level: u32,

    #[serde(default = "default_points_per_level")]
    pub points_per_level: u64,

    /// Pad to four options when the distractor heuristics collide
    #[serde(default)]
    pub backfill_options: bool,

    #[serde(default)]
    pub history_limit: Option<usize>,
}

// Helper functions for default values
fn default_version() -> u32 {
    1
}
fn default_questions_per_level() -> u32 {
    ScoringRules::default().questions_per_level
}
fn default_points_per_level() -> u64 {
    ScoringRules::default().points_per_level
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: default_version(),
            questions_per_level: default_questions_per_level(),
            points_per_level: default_points_per_level(),
            backfill_options: false,
            history_limit: None,
        }
    }
}

impl Settings {
    /// Reads `settings.json` from `data_dir`, writing defaults when it is missing
    /// or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::settings_path(data_dir);
        if let Ok(contents) = fs::read_to_string(&path) {
            match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    return settings;
                }
                Err(err) => warn!(target: "settings", "Ignoring {:?}: {}", path, err),
            }
        }
        let default = Settings::default();
        if let Err(err) = default.save(data_dir) {
            warn!(target: "settings", "Could not write default settings: {}", err);
        }
        default
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), std::io::Error> {
        fs::create_dir_all(data_dir)?;
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(Self::settings_path(data_dir), contents)
    }

    fn settings_path(data_dir: &Path) -> PathBuf {
        data_dir.join("settings.json")
    }

    fn migrate(&mut self) {
        match self.version {
            0 => {
                self.version = 1;
            }
            _ => (),
        }
        if self.questions_per_level == 0 {
            self.questions_per_level = default_questions_per_level();
        }
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            questions_per_level: self.questions_per_level,
            points_per_level: self.points_per_level,
        }
    }

    pub fn data_dir() -> Result<PathBuf, StoreError> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        dirs::data_local_dir()
            .map(|p| p.join("signos"))
            .ok_or(StoreError::DataDirNotFound)
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}
