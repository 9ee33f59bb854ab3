use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{Result, TodoError, DEFAULT_CUTOFF_HOUR};

const APP_NAME: &str = "dailydo";
const CONFIG_FILE_NAME: &str = "config.json";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding one JSON file per stored key
    pub data_dir: PathBuf,

    /// Local hour from which routines may be reset for the day (0-23)
    pub cutoff_hour: u32,

    /// How often the watch loop re-checks the daily reset (in seconds)
    pub reset_interval_secs: u64,

    /// Whether to run the daily reset check on every start
    pub auto_reset: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".dailydo"));

        Self {
            data_dir,
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
            reset_interval_secs: 60,
            auto_reset: true,
        }
    }
}

impl Config {
    /// Location of the config file in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Reads the config at `path`, or returns the defaults if the file does
    /// not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text).map_err(|e| TodoError::ConfigError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|_| TodoError::DirectoryError {
                    path: parent.to_path_buf(),
                })?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cutoff_hour > 23 {
            return Err(TodoError::ConfigError {
                message: format!("cutoff_hour must be between 0 and 23, got {}", self.cutoff_hour),
            });
        }
        if self.reset_interval_secs == 0 {
            return Err(TodoError::ConfigError {
                message: "reset_interval_secs must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Applies a `key=value` assignment from the command line.
    pub fn set_value(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| TodoError::ConfigError {
                message: format!("Expected key=value, got '{}'", assignment),
            })?;

        let invalid = |e: &dyn std::fmt::Display| TodoError::ConfigError {
            message: format!("Invalid value for {}: {}", key, e),
        };

        let mut updated = self.clone();
        match key {
            "data_dir" => updated.data_dir = PathBuf::from(value),
            "cutoff_hour" => updated.cutoff_hour = value.parse().map_err(|e| invalid(&e))?,
            "reset_interval_secs" => {
                updated.reset_interval_secs = value.parse().map_err(|e| invalid(&e))?
            }
            "auto_reset" => updated.auto_reset = value.parse().map_err(|e| invalid(&e))?,
            _ => {
                return Err(TodoError::ConfigError {
                    message: format!("Unknown configuration key: {}", key),
                })
            }
        }
        updated.validate()?;

        *self = updated;
        Ok(())
    }

    pub fn reset_interval(&self) -> Duration {
        Duration::from_secs(self.reset_interval_secs)
    }
}
