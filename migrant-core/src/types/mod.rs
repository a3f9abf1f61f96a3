//! Core domain types for migrant.

pub mod credentials;
pub mod migration;
pub mod mount_point;
pub mod source;
pub mod target;
pub mod workload;

// Re-exports
pub use credentials::Credentials;
pub use migration::{Migration, MigrationId, MigrationRecord, MigrationState};
pub use mount_point::MountPoint;
pub use source::Source;
pub use target::{CloudType, MigrationTarget, MigrationTargetRecord};
pub use workload::{Workload, WorkloadId};
