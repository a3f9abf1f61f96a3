//! Scenario files for `migrant run`.
//!
//! A scenario lists workloads and the migrations between them. Migrations
//! name their source and destination by ip; both must match a workload
//! declared in the same file.
//!
//! ```json
//! {
//!   "workloads": [
//!     { "ip": "192.168.1.1",
//!       "credentials": { "username": "John", "password": "pw", "domain": "d1" },
//!       "storage": [ { "name": "c:", "size": 100 } ] }
//!   ],
//!   "migrations": [
//!     { "source_ip": "192.168.1.1",
//!       "selected_mount_points": [ { "name": "c:", "size": 100 } ],
//!       "migration_target": {
//!         "cloud_type": "aws",
//!         "cloud_credentials": { "username": "u", "password": "p", "domain": "d" },
//!         "destination_ip": "192.168.2.1" } }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use migrant_core::{
    Credentials, Migration, MigrationId, MigrationTarget, MountPoint, Registry, Workload,
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub workloads: Vec<WorkloadSpec>,
    #[serde(default)]
    pub migrations: Vec<MigrationSpec>,
}

#[derive(Debug, Deserialize)]
pub struct MountPointSpec {
    pub name: String,
    pub size: i64,
}

#[derive(Debug, Deserialize)]
pub struct WorkloadSpec {
    pub ip: String,
    pub credentials: Credentials,
    #[serde(default)]
    pub storage: Vec<MountPointSpec>,
}

#[derive(Debug, Deserialize)]
pub struct TargetSpec {
    pub cloud_type: String,
    pub cloud_credentials: Credentials,
    pub destination_ip: String,
}

#[derive(Debug, Deserialize)]
pub struct MigrationSpec {
    pub source_ip: String,
    #[serde(default)]
    pub selected_mount_points: Vec<MountPointSpec>,
    pub migration_target: TargetSpec,
}

impl Scenario {
    /// Parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scenario {}", path.display()))
    }

    /// Register every workload, then every migration, in file order.
    ///
    /// Returns the migration keys in file order.
    pub fn register(self, registry: &mut Registry) -> Result<Vec<MigrationId>> {
        for spec in self.workloads {
            let storage = mount_points(spec.storage)
                .with_context(|| format!("Invalid storage for workload {}", spec.ip))?;
            registry.add_workload(Workload::new(spec.ip, spec.credentials, storage));
        }

        let mut ids = Vec::with_capacity(self.migrations.len());
        for spec in self.migrations {
            let source = registry
                .find_workload_by_ip(&spec.source_ip)
                .with_context(|| format!("No workload with source ip {}", spec.source_ip))?;

            let target = spec.migration_target;
            let destination_ip = &target.destination_ip;
            let target_vm = registry
                .find_workload_by_ip(destination_ip)
                .with_context(|| format!("No workload with destination ip {}", destination_ip))?;

            let migration_target =
                MigrationTarget::new(&target.cloud_type, target.cloud_credentials, target_vm)?;
            let selected = mount_points(spec.selected_mount_points)
                .with_context(|| format!("Invalid selection for source {}", spec.source_ip))?;

            ids.push(registry.add_migration(Migration::new(selected, source, migration_target))?);
        }

        Ok(ids)
    }
}

fn mount_points(specs: Vec<MountPointSpec>) -> migrant_core::Result<Vec<MountPoint>> {
    specs.into_iter().map(|mp| MountPoint::try_new(mp.name, mp.size)).collect()
}
