//! Snapshot persistence.
//!
//! A [`PersistenceLayer`] writes a list of domain objects to a single file
//! and reads it back. Writes enforce one invariant: among objects of the
//! same [`TrackedKind`], tracked identities are unique. Objects of
//! different kinds may share an identity, and objects without one are not
//! checked.
//!
//! # Storage Format
//!
//! A JSON document holding a format version and the object list:
//!
//! ```json
//! { "version": 1, "objects": [ { "kind": "source", "value": { ... } } ] }
//! ```
//!
//! Files are replaced atomically (temporary sibling file, then rename).
//! Nothing coordinates concurrent writers of the same path; callers that
//! share a path across tasks or processes serialize access themselves.
//!
//! # Example
//!
//! ```ignore
//! use migrant_core::persistence::{Entity, PersistenceLayer};
//!
//! let mut layer = PersistenceLayer::new(vec![Entity::from(source)], "snapshot.json");
//! layer.create().await?;
//! layer.update().await?;
//! ```

use crate::error::{MigrantError, Result};
use crate::observability::metrics;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

mod entity;

pub use entity::Entity;

/// Current snapshot file format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Kinds of objects whose identity must be unique within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedKind {
    /// A source endpoint, identified by its ip.
    Source,
    /// A migration, identified by its source workload's ip.
    Migration,
}

impl TrackedKind {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Migration => "migration",
        }
    }
}

impl std::fmt::Display for TrackedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Objects that may carry an identity for the snapshot uniqueness check.
pub trait Tracked {
    /// The kind and key of this object's identity, or `None` if it is not
    /// tracked.
    fn tracked_identity(&self) -> Option<(TrackedKind, &str)>;
}

/// Check that no two objects of the same kind share an identity.
///
/// # Errors
///
/// Returns `MigrantError::DuplicateIdentity` for the first repeated
/// identity.
pub fn check_unique<T: Tracked>(objects: &[T]) -> Result<()> {
    let mut seen = HashSet::new();
    for (kind, key) in objects.iter().filter_map(|obj| obj.tracked_identity()) {
        if !seen.insert((kind, key)) {
            metrics::record_snapshot_conflict(kind);
            return Err(MigrantError::DuplicateIdentity { kind, key: key.to_string() });
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SnapshotFileRef<'a, T> {
    version: u32,
    objects: &'a [T],
}

#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

#[derive(Deserialize)]
struct SnapshotFile<T> {
    objects: Vec<T>,
}

/// File-backed list of domain objects.
///
/// The layer is a transient view: it owns an in-memory list and the path
/// of the file it mirrors.
#[derive(Debug, Clone)]
pub struct PersistenceLayer<T = Entity> {
    objects: Vec<T>,
    path: PathBuf,
}

impl<T> PersistenceLayer<T>
where
    T: Tracked + Serialize + DeserializeOwned + PartialEq + Clone,
{
    pub fn new(objects: Vec<T>, path: impl Into<PathBuf>) -> Self {
        Self { objects, path: path.into() }
    }

    /// Get the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// Write the in-memory list to the file.
    pub async fn create(&self) -> Result<()> {
        self.create_from(&self.objects).await
    }

    /// Write `objects` to the file, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns `MigrantError::DuplicateIdentity` without touching the file if
    /// two objects of the same kind share an identity.
    #[instrument(skip(self, objects), fields(path = %self.path.display(), count = objects.len()))]
    pub async fn create_from(&self, objects: &[T]) -> Result<()> {
        if let Err(e) = check_unique(objects) {
            warn!(error = %e, "Snapshot write rejected");
            return Err(e);
        }

        let snapshot = SnapshotFileRef { version: SNAPSHOT_VERSION, objects };
        let json = serde_json::to_vec_pretty(&snapshot).map_err(MigrantError::internal)?;

        if let Err(e) = write_atomic(&self.path, &json).await {
            metrics::record_snapshot_write("error");
            return Err(e);
        }

        metrics::record_snapshot_write("success");
        info!(size_bytes = json.len(), "Snapshot written");
        Ok(())
    }

    /// Replace the in-memory list with the file contents.
    ///
    /// # Errors
    ///
    /// Returns `MigrantError::SnapshotNotFound` if the file does not exist and
    /// a decode error if it is not a snapshot this version understands.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn read(&mut self) -> Result<&[T]> {
        self.objects = self.load().await?;
        debug!(count = self.objects.len(), "Snapshot read");
        Ok(&self.objects)
    }

    /// Merge the file into the in-memory list and write the result.
    ///
    /// File entries not already present (by equality) are appended after
    /// the in-memory entries, in file order. The merged list goes through
    /// the same uniqueness check as [`create_from`](Self::create_from); on
    /// success it becomes the in-memory list.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn update(&mut self) -> Result<()> {
        let saved = self.load().await?;

        let mut merged = self.objects.clone();
        let mut appended = 0usize;
        for obj in saved {
            if !merged.contains(&obj) {
                merged.push(obj);
                appended += 1;
            }
        }

        self.create_from(&merged).await?;
        info!(kept = self.objects.len(), appended, "Snapshot merged");
        self.objects = merged;
        Ok(())
    }

    /// Remove the snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `MigrantError::SnapshotNotFound` if the file does not exist.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn delete(&self) -> Result<()> {
        fs::remove_file(&self.path).await.map_err(|e| self.io_error(e))?;
        info!("Snapshot deleted");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<T>> {
        let bytes = fs::read(&self.path).await.map_err(|e| self.io_error(e))?;

        let header: SnapshotHeader =
            serde_json::from_slice(&bytes).map_err(|e| self.decode_error(e))?;
        if header.version != SNAPSHOT_VERSION {
            return Err(MigrantError::UnsupportedSnapshotVersion {
                path: self.path.clone(),
                version: header.version,
            });
        }

        let snapshot: SnapshotFile<T> =
            serde_json::from_slice(&bytes).map_err(|e| self.decode_error(e))?;
        Ok(snapshot.objects)
    }

    fn io_error(&self, e: std::io::Error) -> MigrantError {
        if e.kind() == std::io::ErrorKind::NotFound {
            MigrantError::SnapshotNotFound { path: self.path.clone() }
        } else {
            MigrantError::IoError { path: self.path.clone(), source: e }
        }
    }

    fn decode_error(&self, e: serde_json::Error) -> MigrantError {
        MigrantError::SnapshotDecode { path: self.path.clone(), reason: e.to_string() }
    }
}

/// Atomic write: temp file → rename.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);

    fs::write(&temp_path, bytes)
        .await
        .map_err(|e| MigrantError::IoError { path: temp_path.clone(), source: e })?;

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(MigrantError::IoError { path: path.to_path_buf(), source: e });
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
