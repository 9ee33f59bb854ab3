//! Error types for the dailydo application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur while managing todos and routines.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the dailydo application.
#[derive(Error, Debug)]
pub enum TodoError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// User input was rejected before any state was touched.
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A stored value could not be parsed.
    #[error("Stored value for key '{key}' is corrupted: {message}")]
    StorageCorruption { key: String, message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// No id above the largest stored one is left.
    #[error("No ids left after {last}")]
    IdSpaceExhausted { last: i64 },

    /// Errors raised by the routine reset scheduler.
    #[error("Reset scheduler error: {message}")]
    SchedulerError { message: String },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },
}
