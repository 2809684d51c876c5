//! Save store error types.

use derive_more::{Display, Error};
use std::io;
use std::path::{Path, PathBuf};

/// Classification of a save-store failure, used for `error.log` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreErrorKind {
    /// File contents are not valid JSON.
    MalformedJson,
    /// JSON parsed but required record fields are missing or invalid.
    MalformedRecord,
    /// Filesystem read or write failed.
    IoError,
    /// Filesystem denied access.
    AccessDenied,
    /// File metadata does not match the code encoded in its name.
    IntegrityViolation,
    /// Anything else.
    Unknown,
}

/// Save store error carrying its classification and the offending path.
#[derive(Debug, Clone, Display, Error)]
#[display("{kind}: {message} ({})", path.display())]
pub struct StoreError {
    /// Failure classification.
    pub kind: StoreErrorKind,
    /// Error message.
    pub message: String,
    /// File or directory involved.
    pub path: PathBuf,
}

impl StoreError {
    /// Creates a new store error.
    pub fn new(kind: StoreErrorKind, message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: path.into(),
        }
    }

    /// Classifies an I/O failure (`PermissionDenied` maps to `AccessDenied`).
    pub fn from_io(err: &io::Error, path: &Path) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::PermissionDenied => StoreErrorKind::AccessDenied,
            _ => StoreErrorKind::IoError,
        };
        Self::new(kind, err.to_string(), path)
    }

    /// Wraps a JSON deserialization failure.
    pub fn from_json(err: &serde_json::Error, path: &Path) -> Self {
        Self::new(StoreErrorKind::MalformedJson, err.to_string(), path)
    }

    /// A structurally valid file with missing or invalid record fields.
    pub fn malformed(message: impl Into<String>, path: &Path) -> Self {
        Self::new(StoreErrorKind::MalformedRecord, message, path)
    }

    /// File mtime and filename code disagree beyond tolerance.
    pub fn integrity(message: impl Into<String>, path: &Path) -> Self {
        Self::new(StoreErrorKind::IntegrityViolation, message, path)
    }
}
