//! Error types for tsconfig resolution
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::tsconfig::TsConfigOrigin;

/// Main error type for tsconfig loading and cache operations
#[derive(Error, Debug)]
pub enum TsConfigError {
    /// File system errors
    #[error("Failed to read tsconfig '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write generated tsconfig '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Parsing errors (JSONC syntax, unexpected shape)
    #[error("Failed to parse tsconfig '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    /// A lookup hit a cache scope that was never seeded
    #[error("tsconfig cache for origin {origin:?} is not initialized")]
    Uninitialized { origin: TsConfigOrigin },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// File watcher errors
    #[error("Failed to initialize file watcher: {reason}")]
    WatcherInit { reason: String },

    #[error("Cannot watch path '{path}': {reason}")]
    PathWatch { path: PathBuf, reason: String },
}

impl TsConfigError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Uninitialized { .. } => "CACHE_UNINITIALIZED",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::WatcherInit { .. } => "WATCHER_INIT_ERROR",
            Self::PathWatch { .. } => "PATH_WATCH_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileRead { .. } => vec![
                "Check that the tsconfig file exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::Parse { .. } => vec![
                "Check JSON syntax, comments, and trailing commas",
                "Validate the file with 'tsc --showConfig'",
            ],
            Self::Uninitialized { .. } => vec![
                "Seed the cache with 'initialize_with' before resolving files",
                "Check that tsconfig discovery found at least one config",
            ],
            Self::WatcherInit { .. } | Self::PathWatch { .. } => vec![
                "Verify the watched path exists and you have read permissions",
                "Check file system permissions and inotify limits",
            ],
            _ => vec![],
        }
    }
}

/// Result type alias for tsconfig operations
pub type TsConfigResult<T> = Result<T, TsConfigError>;
