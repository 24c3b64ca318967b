//! Error types for timer-grid.
//!
//! Almost nothing in the widget is allowed to fail in front of the user: bad
//! input degrades to zero and rejected grid settings leave the grid as it was.
//! [`Error`] covers the edges where a real error still exists: file I/O for
//! the configuration and the timer store, logging setup and the runtime.
//! [`GridError`] reports a rejected grid setting, which callers are free to
//! ignore.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    FileIo {
        /// Path of the file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be parsed or serialized.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The timer store file is not a JSON object of strings.
    #[error("Store error in {path}: {message}")]
    Store {
        /// Path of the store file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Neither a configuration nor a data directory could be located.
    #[error("Could not determine the {0} directory")]
    DirNotFound(&'static str),

    /// The log subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),

    /// The bubbletea runtime failed.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Why a grid setting was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// The timer count must be at least one.
    #[error("timer count must be at least 1")]
    CountTooSmall,

    /// The timer count may not drop below the timers shown per row.
    #[error("timer count {count} is less than timers per row {per_row}")]
    CountBelowRow {
        /// Requested timer count.
        count: usize,
        /// Current timers per row.
        per_row: usize,
    },

    /// Timers per row must be at least one.
    #[error("timers per row must be at least 1")]
    RowTooSmall,

    /// Timers per row may not exceed the timer count.
    #[error("timers per row {per_row} exceeds timer count {count}")]
    RowAboveCount {
        /// Requested timers per row.
        per_row: usize,
        /// Current timer count.
        count: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
