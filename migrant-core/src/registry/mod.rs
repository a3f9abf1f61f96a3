//! In-memory registry of workloads and migrations.
//!
//! The registry owns every workload under a stable [`WorkloadId`] and every
//! migration under a [`MigrationId`]. Migrations and migration targets
//! refer to workloads by key, so a migration run mutates the registry's
//! destination workload in place and every holder of that key observes
//! the change.
//!
//! Keys are assigned as one past the largest key in use, starting at 0.
//! The registry is not synchronized; callers sharing it between tasks wrap
//! it in a lock.

use crate::error::{MigrantError, Result};
use crate::executor::MigrationExecutor;
use crate::types::{
    Credentials, Migration, MigrationId, MigrationRecord, MigrationState, MigrationTarget,
    MigrationTargetRecord, MountPoint, Workload, WorkloadId,
};
use std::collections::BTreeMap;
use tracing::{info, instrument};


/// Partial replacement of a workload's fields.
///
/// `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct WorkloadUpdate {
    pub credentials: Option<Credentials>,
    pub storage: Option<Vec<MountPoint>>,
}

/// Partial replacement of a migration's definition.
///
/// `None` leaves a field as it is. The state cannot be changed here.
#[derive(Debug, Clone, Default)]
pub struct MigrationUpdate {
    pub selected_mount_points: Option<Vec<MountPoint>>,
    pub source: Option<WorkloadId>,
    pub migration_target: Option<MigrationTarget>,
}

/// Keyed store of workloads and migrations.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    workloads: BTreeMap<WorkloadId, Workload>,
    migrations: BTreeMap<MigrationId, Migration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Workload Operations
    // ========================

    /// Register a workload and return its key.
    #[instrument(skip(self, workload), fields(ip = %workload.ip))]
    pub fn add_workload(&mut self, workload: Workload) -> WorkloadId {
        let id = WorkloadId(next_key(self.workloads.last_key_value().map(|(k, _)| k.0)));
        self.workloads.insert(id, workload);
        info!(workload_id = %id, "Workload registered");
        id
    }

    pub fn workload(&self, id: WorkloadId) -> Result<&Workload> {
        self.workloads.get(&id).ok_or_else(|| workload_not_found(id))
    }

    pub fn workload_mut(&mut self, id: WorkloadId) -> Result<&mut Workload> {
        self.workloads.get_mut(&id).ok_or_else(|| workload_not_found(id))
    }

    /// Iterate workloads in key order.
    pub fn workloads(&self) -> impl Iterator<Item = (WorkloadId, &Workload)> {
        self.workloads.iter().map(|(id, w)| (*id, w))
    }

    /// Key of the first workload (in key order) with this ip.
    #[must_use]
    pub fn find_workload_by_ip(&self, ip: &str) -> Option<WorkloadId> {
        self.workloads.iter().find(|(_, w)| w.ip == ip).map(|(id, _)| *id)
    }

    /// Replace the provided fields of a workload.
    ///
    /// Returns whether anything was provided.
    #[instrument(skip(self, update), fields(workload_id = %id))]
    pub fn modify_workload(&mut self, id: WorkloadId, update: WorkloadUpdate) -> Result<bool> {
        let workload = self.workload_mut(id)?;
        let mut modified = false;

        if let Some(credentials) = update.credentials {
            workload.credentials = credentials;
            modified = true;
        }
        if let Some(storage) = update.storage {
            workload.storage = storage;
            modified = true;
        }

        if modified {
            info!("Workload modified");
        }
        Ok(modified)
    }

    /// Remove a workload.
    ///
    /// Migrations that still refer to it fail with
    /// `MigrantError::WorkloadNotFound` when run or exported.
    #[instrument(skip(self), fields(workload_id = %id))]
    pub fn remove_workload(&mut self, id: WorkloadId) -> Result<Workload> {
        let workload = self.workloads.remove(&id).ok_or_else(|| workload_not_found(id))?;
        info!("Workload removed");
        Ok(workload)
    }

    // ========================
    // Migration Operations
    // ========================

    /// Register a migration and return its key.
    ///
    /// # Errors
    ///
    /// Returns `MigrantError::WorkloadNotFound` if the source or destination
    /// workload is not registered.
    #[instrument(skip(self, migration), fields(source = %migration.source))]
    pub fn add_migration(&mut self, migration: Migration) -> Result<MigrationId> {
        self.workload(migration.source)?;
        self.workload(migration.destination())?;

        let id = MigrationId(next_key(self.migrations.last_key_value().map(|(k, _)| k.0)));
        self.migrations.insert(id, migration);
        info!(migration_id = %id, "Migration registered");
        Ok(id)
    }

    pub fn migration(&self, id: MigrationId) -> Result<&Migration> {
        self.migrations.get(&id).ok_or_else(|| migration_not_found(id))
    }

    /// Direct access to a migration's definition.
    ///
    /// Workload keys changed here are not checked until the migration runs;
    /// use [`modify_migration`](Self::modify_migration) to validate them.
    pub fn migration_mut(&mut self, id: MigrationId) -> Result<&mut Migration> {
        self.migrations.get_mut(&id).ok_or_else(|| migration_not_found(id))
    }

    /// Iterate migrations in key order.
    pub fn migrations(&self) -> impl Iterator<Item = (MigrationId, &Migration)> {
        self.migrations.iter().map(|(id, m)| (*id, m))
    }

    /// Replace the provided fields of a migration.
    ///
    /// Returns whether anything was provided. Nothing changes if a new
    /// workload key does not resolve.
    #[instrument(skip(self, update), fields(migration_id = %id))]
    pub fn modify_migration(&mut self, id: MigrationId, update: MigrationUpdate) -> Result<bool> {
        if let Some(source) = update.source {
            self.workload(source)?;
        }
        if let Some(target) = &update.migration_target {
            self.workload(target.target_vm)?;
        }

        let migration = self.migration_mut(id)?;
        let mut modified = false;

        if let Some(selected) = update.selected_mount_points {
            migration.selected_mount_points = selected;
            modified = true;
        }
        if let Some(source) = update.source {
            migration.source = source;
            modified = true;
        }
        if let Some(target) = update.migration_target {
            migration.migration_target = target;
            modified = true;
        }

        if modified {
            info!("Migration modified");
        }
        Ok(modified)
    }

    #[instrument(skip(self), fields(migration_id = %id))]
    pub fn remove_migration(&mut self, id: MigrationId) -> Result<Migration> {
        let migration = self.migrations.remove(&id).ok_or_else(|| migration_not_found(id))?;
        info!("Migration removed");
        Ok(migration)
    }

    /// Run a registered migration against the registered workloads.
    ///
    /// See [`MigrationExecutor::run`].
    #[instrument(skip(self, executor), fields(migration_id = %id))]
    pub async fn run_migration(
        &mut self,
        id: MigrationId,
        executor: &MigrationExecutor,
    ) -> Result<MigrationState> {
        let migration = self.migrations.get_mut(&id).ok_or_else(|| migration_not_found(id))?;
        executor.run(migration, &mut self.workloads).await
    }

    /// Whether the migration completed successfully.
    pub fn migration_finished(&self, id: MigrationId) -> Result<bool> {
        Ok(self.migration(id)?.state().is_finished())
    }

    /// Self-contained copy of a migration with its workloads resolved.
    pub fn export_migration(&self, id: MigrationId) -> Result<MigrationRecord> {
        let migration = self.migration(id)?;
        let source = self.workload(migration.source)?.clone();
        let target = self.export_target(&migration.migration_target)?;

        Ok(MigrationRecord {
            selected_mount_points: migration.selected_mount_points.clone(),
            source,
            cloud_type: target.cloud_type,
            cloud_credentials: target.cloud_credentials,
            target_vm: target.target_vm,
            migration_state: migration.state(),
        })
    }

    /// Self-contained copy of a migration target with its destination
    /// workload resolved.
    pub fn export_target(&self, target: &MigrationTarget) -> Result<MigrationTargetRecord> {
        Ok(MigrationTargetRecord {
            cloud_type: target.cloud_type(),
            cloud_credentials: target.cloud_credentials.clone(),
            target_vm: self.workload(target.target_vm)?.clone(),
        })
    }

    /// Register a target record's destination as a new workload and return
    /// a target that refers to it.
    #[instrument(skip(self, record), fields(cloud_type = %record.cloud_type))]
    pub fn import_target(&mut self, record: MigrationTargetRecord) -> MigrationTarget {
        let target_vm = self.add_workload(record.target_vm);
        MigrationTarget::with_cloud_type(record.cloud_type, record.cloud_credentials, target_vm)
    }

    /// Register a migration record: its source and destination become new
    /// workloads and the migration keeps the recorded state.
    #[instrument(skip(self, record), fields(source = %record.source.ip))]
    pub fn import_migration(&mut self, record: MigrationRecord) -> MigrationId {
        let source = self.add_workload(record.source);
        let target = self.import_target(MigrationTargetRecord {
            cloud_type: record.cloud_type,
            cloud_credentials: record.cloud_credentials,
            target_vm: record.target_vm,
        });
        let mut migration = Migration::new(record.selected_mount_points, source, target);
        migration.set_state(record.migration_state);

        let id = MigrationId(next_key(self.migrations.last_key_value().map(|(k, _)| k.0)));
        self.migrations.insert(id, migration);
        info!(migration_id = %id, state = %record.migration_state, "Migration imported");
        id
    }
}

/// One past the largest key in use.
fn next_key(last: Option<u64>) -> u64 {
    last.map_or(0, |max| max + 1)
}

fn workload_not_found(id: WorkloadId) -> MigrantError {
    MigrantError::WorkloadNotFound { id: id.to_string() }
}

fn migration_not_found(id: MigrationId) -> MigrantError {
    MigrantError::MigrationNotFound { id: id.to_string() }
}
