//! Error types for migrant.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.
//! A migration that cannot be carried out is not an error: `run` records
//! [`MigrationState::Error`](crate::types::MigrationState::Error) instead.

use crate::persistence::TrackedKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for migrant operations.
pub type Result<T> = std::result::Result<T, MigrantError>;

/// Main error type for migrant.
#[derive(Error, Debug)]
pub enum MigrantError {
    // Validation errors
    #[error("Invalid argument for {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Unknown cloud type: {cloud_type} (expected one of aws, azure, vsphere, vcloud)")]
    InvalidCloudType { cloud_type: String },

    // Registry errors
    #[error("Workload not found: {id}")]
    WorkloadNotFound { id: String },

    #[error("Migration not found: {id}")]
    MigrationNotFound { id: String },

    // Snapshot errors
    #[error("Duplicate {kind} identity in snapshot: {key}")]
    DuplicateIdentity { kind: TrackedKind, key: String },

    #[error("Snapshot not found: {path:?}")]
    SnapshotNotFound { path: PathBuf },

    #[error("Failed to decode snapshot {path:?}: {reason}")]
    SnapshotDecode { path: PathBuf, reason: String },

    #[error("Unsupported snapshot version {version} in {path:?}")]
    UnsupportedSnapshotVersion { path: PathBuf, version: u32 },

    // File system errors
    #[error("I/O error at {path:?}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MigrantError {
    /// Create an InvalidArgument error for a named field.
    pub fn invalid_argument(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument { field: field.to_string(), reason: reason.into() }
    }

    /// Create an Internal error from any error type.
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(err.to_string())
    }

    /// Whether the error was caused by the caller's input rather than by
    /// the environment.
    ///
    /// Request-facing layers map these to client errors; everything else is
    /// an operational failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::InvalidCloudType { .. }
                | Self::WorkloadNotFound { .. }
                | Self::MigrationNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(MigrantError::invalid_argument("ip", "value is absent").is_client_error());
        assert!(MigrantError::InvalidCloudType { cloud_type: "gcp".into() }.is_client_error());
        assert!(MigrantError::WorkloadNotFound { id: "3".into() }.is_client_error());

        let duplicate =
            MigrantError::DuplicateIdentity { kind: TrackedKind::Source, key: "10.0.0.1".into() };
        assert!(!duplicate.is_client_error());
        assert!(!MigrantError::SnapshotNotFound { path: "dump.json".into() }.is_client_error());
    }

    #[test]
    fn test_error_messages() {
        let err = MigrantError::invalid_argument("username", "value is absent");
        assert_eq!(err.to_string(), "Invalid argument for username: value is absent");

        let err =
            MigrantError::DuplicateIdentity { kind: TrackedKind::Migration, key: "10.0.0.1".into() };
        assert_eq!(err.to_string(), "Duplicate migration identity in snapshot: 10.0.0.1");
    }
}
