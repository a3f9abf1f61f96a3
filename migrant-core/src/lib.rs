//! Migrant Core Library
//!
//! Domain model, execution, and snapshot persistence for the migrant
//! workload migration tool.

pub mod config;
pub mod delay;
pub mod error;
pub mod executor;
pub mod observability;
pub mod paths;
pub mod persistence;
pub mod registry;
pub mod types;

// Re-export commonly used items
pub use config::Config;
pub use delay::{NoDelay, SleepDelay, TransferDelay};
pub use error::{MigrantError, Result};
pub use executor::{MigrationExecutor, MigrationPolicy};
pub use observability::init as init_observability;
pub use persistence::{Entity, PersistenceLayer};
pub use registry::{MigrationUpdate, Registry, WorkloadUpdate};
pub use types::{
    CloudType, Credentials, Migration, MigrationId, MigrationRecord, MigrationState,
    MigrationTarget, MigrationTargetRecord, MountPoint, Source, Workload, WorkloadId,
};
