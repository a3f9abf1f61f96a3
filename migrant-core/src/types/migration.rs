//! Migration domain types.

use crate::types::mount_point::display_list;
use crate::types::{CloudType, Credentials, MigrationTarget, MountPoint, Workload, WorkloadId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry key of a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationId(pub u64);

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Migration state.
///
/// `NotStarted` → `Running` → `Success` | `Error`. Only
/// [`MigrationExecutor::run`](crate::executor::MigrationExecutor::run)
/// moves a migration between states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationState {
    /// Created, never run
    #[default]
    #[serde(rename = "not started")]
    NotStarted,

    /// Transfer in progress
    #[serde(rename = "running")]
    Running,

    /// Volumes and identity copied to the destination
    #[serde(rename = "success")]
    Success,

    /// Selection not satisfiable or migrations disabled by policy
    #[serde(rename = "error")]
    Error,
}

impl MigrationState {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Whether the migration completed successfully.
    ///
    /// A migration in `Error` is over but not finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        *self == Self::Success
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One attempt to move selected volumes and the identity of a source
/// workload onto the destination of a migration target.
///
/// Workloads are referenced by registry key and resolved when the
/// migration runs, so the run sees (and mutates) the registry's current
/// workloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Volumes to copy, matched by name against the source storage
    pub selected_mount_points: Vec<MountPoint>,

    /// Source workload
    pub source: WorkloadId,

    /// Cloud provider and destination workload
    pub migration_target: MigrationTarget,

    state: MigrationState,
}

impl Migration {
    pub fn new(
        selected_mount_points: Vec<MountPoint>,
        source: WorkloadId,
        migration_target: MigrationTarget,
    ) -> Self {
        Self { selected_mount_points, source, migration_target, state: MigrationState::NotStarted }
    }

    #[must_use]
    pub fn state(&self) -> MigrationState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: MigrationState) {
        self.state = state;
    }

    /// Destination workload key.
    #[must_use]
    pub fn destination(&self) -> WorkloadId {
        self.migration_target.target_vm
    }

    /// Whether `name` is one of the selected volumes.
    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_mount_points.iter().any(|mp| mp.name == name)
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "migration:{}:workload#{}:{}:{}",
            display_list(&self.selected_mount_points),
            self.source,
            self.migration_target,
            self.state
        )
    }
}

/// Self-contained copy of a migration with its workloads resolved.
///
/// This is the form migrations take outside the registry, e.g. in a
/// snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub selected_mount_points: Vec<MountPoint>,
    pub source: Workload,
    pub cloud_type: CloudType,
    pub cloud_credentials: Credentials,
    pub target_vm: Workload,
    pub migration_state: MigrationState,
}

impl fmt::Display for MigrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "migration:{}:{}:migration_target:{}:{}:{}:{}",
            display_list(&self.selected_mount_points),
            self.source,
            self.cloud_type,
            self.cloud_credentials,
            self.target_vm,
            self.migration_state
        )
    }
}
