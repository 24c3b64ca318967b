//! Log setup.
//!
//! The terminal belongs to the UI, so logs only go to a file. Without a log
//! file no subscriber is installed and `tracing` events are discarded.
//! The filter is read from `TIMER_GRID_LOG` (e.g. `TIMER_GRID_LOG=debug`) and
//! defaults to `info`.

use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TIMER_GRID_LOG";

/// Installs a subscriber appending to `log_file`. Does nothing for `None`.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::FileIo {
            path: path.to_path_buf(),
            source,
        })?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_is_noop() {
        assert!(init(None).is_ok());
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("timer-grid.log");
        assert!(matches!(init(Some(&path)), Err(Error::FileIo { .. })));
    }
}
