//! Configuration file.
//!
//! Settings live in `config.toml` under the user's configuration directory
//! (`~/.config/timer-grid/config.toml` on Linux). Every field is optional; a
//! missing file means defaults. Command line flags override the file.
//!
//! ```toml
//! timer_count = 6
//! timers_per_row = 3
//! bell = true
//! persist = true
//! store_path = "/home/me/.local/share/timer-grid/timers.json"
//! ```

use crate::error::{Error, Result};
use crate::grid::{DEFAULT_TIMERS_PER_ROW, DEFAULT_TIMER_COUNT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Number of timers at startup.
    pub timer_count: usize,
    /// Timers per row at startup.
    pub timers_per_row: usize,
    /// Ring the terminal bell when a timer finishes.
    pub bell: bool,
    /// Keep finished durations in the store file.
    pub persist: bool,
    /// Store file; defaults to the user data directory.
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer_count: DEFAULT_TIMER_COUNT,
            timers_per_row: DEFAULT_TIMERS_PER_ROW,
            bell: true,
            persist: true,
            store_path: None,
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, or from the default location.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| Error::FileIo {
            path: config_path.clone(),
            source,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config.normalized())
    }

    /// Writes the configuration to `path`, or to the default location.
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::FileIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, toml_content).map_err(|source| Error::FileIo {
            path: config_path,
            source,
        })
    }

    /// Default configuration file location.
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(Error::DirNotFound("config"))?;
        Ok(config_dir.join("timer-grid").join("config.toml"))
    }

    /// Pulls the grid settings into their valid ranges.
    pub fn normalized(mut self) -> Self {
        self.timer_count = self.timer_count.max(1);
        self.timers_per_row = self.timers_per_row.clamp(1, self.timer_count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.timer_count, 4);
        assert_eq!(config.timers_per_row, 2);
        assert!(config.bell);
        assert!(config.persist);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_config_load_save() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");

        let config = Config {
            timer_count: 6,
            timers_per_row: 3,
            bell: false,
            persist: true,
            store_path: Some(temp_dir.path().join("timers.json")),
        };
        config
            .save(Some(config_path.clone()))
            .expect("Failed to save config");

        let loaded = Config::load(Some(config_path)).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load(Some(temp_dir.path().join("missing.toml")))
            .expect("missing file is not an error");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "timer_count = 9\n").unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.timer_count, 9);
        assert_eq!(config.timers_per_row, 2);
        assert!(config.bell);
    }

    #[test]
    fn test_out_of_range_values_normalized() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "timer_count = 0\ntimers_per_row = 7\n").unwrap();

        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.timer_count, 1);
        assert_eq!(config.timers_per_row, 1);
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "timer_count = \"many\"").unwrap();

        assert!(matches!(Config::load(Some(path)), Err(Error::Config(_))));
    }
}
