//! Error types for copybar
//!
//! This module defines all error types used throughout the crate, along
//! with the mapping from error kinds to CLI exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for invalid command-line input
pub const EXIT_BAD_ARGUMENTS: i32 = 2;

/// Exit status for I/O and environment failures
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for copybar operations
#[derive(Error, Debug)]
pub enum CopybarError {
    /// Progress ratio requested against a zero target
    #[error("Cannot render progress against a target of 0")]
    DivisionByZero,

    /// Resolved bar width leaves no room for the bar
    #[error("Invalid bar width: {0} (need at least 1 column)")]
    InvalidWidth(usize),

    /// Terminal size could not be determined
    #[error("Terminal size unavailable: {0}")]
    Unavailable(String),

    /// File or directory not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Bad command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CopybarError {
    /// Create an I/O error with path context
    ///
    /// A missing path becomes `NotFound`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path);
        }
        Self::Io { path, source }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::NotFound(path) => Some(path),
            _ => None,
        }
    }

    /// Process exit status for this error when it reaches the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::DivisionByZero
            | Self::InvalidWidth(_) => EXIT_BAD_ARGUMENTS,
            Self::Unavailable(_) | Self::NotFound(_) | Self::Io { .. } => EXIT_FAILURE,
        }
    }
}

/// Result type alias for copybar operations
pub type Result<T> = std::result::Result<T, CopybarError>;

impl From<std::io::Error> for CopybarError {
    fn from(err: std::io::Error) -> Self {
        CopybarError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| CopybarError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CopybarError::io("/test/path", io_err);
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_with_path_maps_not_found() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.with_path("/nowhere").unwrap_err();
        assert!(matches!(err, CopybarError::NotFound(ref p) if p == &PathBuf::from("/nowhere")));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CopybarError::DivisionByZero.exit_code(), EXIT_BAD_ARGUMENTS);
        assert_eq!(CopybarError::InvalidWidth(0).exit_code(), EXIT_BAD_ARGUMENTS);
        assert_eq!(
            CopybarError::invalid_argument("nope").exit_code(),
            EXIT_BAD_ARGUMENTS
        );
        assert_eq!(
            CopybarError::config("bad width").exit_code(),
            EXIT_BAD_ARGUMENTS
        );
        assert_eq!(
            CopybarError::Unavailable("not a tty".into()).exit_code(),
            EXIT_FAILURE
        );
        assert_eq!(
            CopybarError::NotFound(PathBuf::from("/x")).exit_code(),
            EXIT_FAILURE
        );
    }
}
