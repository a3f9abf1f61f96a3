//! Migration execution.
//!
//! [`MigrationExecutor::run`] is the only way a [`Migration`] changes state:
//!
//! 1. `running`
//! 2. every selected volume name must exist on the source workload, and
//!    the [`MigrationPolicy`] must allow migrations
//! 3. on success the transfer delay elapses, then the matching source
//!    volumes are appended to the destination, the destination takes over
//!    the source's ip and credentials, and the state becomes `success`
//! 4. otherwise the state becomes `error` and nothing else changes
//!
//! An infeasible migration is reported through the state, not as an `Err`.
//! `run` is long-running (it awaits the transfer delay) and is not guarded
//! against re-entry: running a finished migration again repeats the copy.
//! Dropping a `run` future before it completes leaves the destination
//! untouched and the migration in `error`.

use crate::config::Config;
use crate::delay::{SleepDelay, TransferDelay};
use crate::error::{MigrantError, Result};
use crate::observability::metrics;
use crate::types::{Migration, MigrationState, MountPoint, Workload, WorkloadId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Operational gate applied to every migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPolicy {
    /// When false, every run ends in `error` regardless of the selection.
    pub volume_c_allowed: bool,
}

impl Default for MigrationPolicy {
    fn default() -> Self {
        Self { volume_c_allowed: true }
    }
}

/// Lookup of workloads by registry key.
pub trait WorkloadStore {
    fn workload(&self, id: WorkloadId) -> Option<&Workload>;

    fn workload_mut(&mut self, id: WorkloadId) -> Option<&mut Workload>;
}

impl WorkloadStore for BTreeMap<WorkloadId, Workload> {
    fn workload(&self, id: WorkloadId) -> Option<&Workload> {
        self.get(&id)
    }

    fn workload_mut(&mut self, id: WorkloadId) -> Option<&mut Workload> {
        self.get_mut(&id)
    }
}

/// Runs migrations under a policy and a transfer delay.
#[derive(Clone)]
pub struct MigrationExecutor {
    policy: MigrationPolicy,
    delay: Arc<dyn TransferDelay>,
}

impl MigrationExecutor {
    pub fn new(policy: MigrationPolicy, delay: Arc<dyn TransferDelay>) -> Self {
        Self { policy, delay }
    }

    /// Executor with the configured policy and a sleeping transfer delay.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.policy(), Arc::new(SleepDelay::new(config.transfer_delay())))
    }

    #[must_use]
    pub fn policy(&self) -> MigrationPolicy {
        self.policy
    }

    /// Replace the policy; applies to every subsequent run.
    pub fn set_policy(&mut self, policy: MigrationPolicy) {
        if policy != self.policy {
            info!(volume_c_allowed = policy.volume_c_allowed, "Migration policy changed");
        }
        self.policy = policy;
    }

    /// Run a migration against the workloads in `workloads`.
    ///
    /// Returns the final state (`success` or `error`).
    ///
    /// # Errors
    ///
    /// Returns `MigrantError::WorkloadNotFound` if the source or destination
    /// key does not resolve. The migration state is left untouched in that
    /// case.
    #[instrument(
        skip_all,
        fields(
            source = %migration.source,
            destination = %migration.destination(),
            delay = self.delay.name()
        )
    )]
    pub async fn run<S>(
        &self,
        migration: &mut Migration,
        workloads: &mut S,
    ) -> Result<MigrationState>
    where
        S: WorkloadStore + Send,
    {
        let destination_id = migration.destination();
        let source = workloads.workload(migration.source).cloned().ok_or_else(|| {
            MigrantError::WorkloadNotFound { id: migration.source.to_string() }
        })?;
        if workloads.workload(destination_id).is_none() {
            return Err(MigrantError::WorkloadNotFound { id: destination_id.to_string() });
        }

        info!(selected = migration.selected_mount_points.len(), "Starting migration");
        let guard = RunGuard::start(migration);

        let missing: Vec<&str> = guard
            .migration
            .selected_mount_points
            .iter()
            .filter(|mp| !source.has_volume(&mp.name))
            .map(|mp| mp.name.as_str())
            .collect();

        let state = if !self.policy.volume_c_allowed {
            warn!("Migration rejected: migrations are disabled by policy");
            MigrationState::Error
        } else if !missing.is_empty() {
            warn!(missing = ?missing, "Migration rejected: selected volumes absent on source");
            MigrationState::Error
        } else {
            let copies: Vec<MountPoint> = source
                .storage
                .iter()
                .filter(|mp| guard.migration.is_selected(&mp.name))
                .cloned()
                .collect();

            self.delay.wait().await;

            let destination = workloads.workload_mut(destination_id).ok_or_else(|| {
                MigrantError::WorkloadNotFound { id: destination_id.to_string() }
            })?;
            destination.storage.extend(copies);
            destination.ip = source.ip;
            destination.credentials = source.credentials;
            MigrationState::Success
        };

        guard.finish(state);
        info!(state = %state, "Migration complete");

        Ok(state)
    }
}

/// Holds a migration in `running` for the duration of a run.
///
/// If the run ends without [`finish`](Self::finish) (the future was dropped
/// or returned early), the migration is recorded as `error`.
struct RunGuard<'a> {
    migration: &'a mut Migration,
    started: Instant,
    finished: bool,
}

impl<'a> RunGuard<'a> {
    fn start(migration: &'a mut Migration) -> Self {
        migration.set_state(MigrationState::Running);
        Self { migration, started: Instant::now(), finished: false }
    }

    fn finish(mut self, state: MigrationState) {
        self.record(state);
        self.finished = true;
    }

    fn record(&mut self, state: MigrationState) {
        self.migration.set_state(state);
        metrics::record_migration(state, self.started.elapsed().as_secs_f64());
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Migration abandoned before completion");
            self.record(MigrationState::Error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::NoDelay;
    use crate::types::{Credentials, MigrationTarget};
    use std::time::Duration;

    const SOURCE: WorkloadId = WorkloadId(0);
    const TARGET: WorkloadId = WorkloadId(1);

    fn workloads() -> BTreeMap<WorkloadId, Workload> {
        let source = Workload::new(
            "192.168.1.1",
            Credentials::new("John", "JohnPass", "domain1"),
            vec![
                MountPoint::new("c:", 100),
                MountPoint::new("d:", 100),
                MountPoint::new("e:", 100),
            ],
        );
        let target = Workload::new(
            "192.168.2.1",
            Credentials::new("Jane", "JanePass", "domain2"),
            vec![MountPoint::new("f:", 100), MountPoint::new("g:", 100)],
        );
        BTreeMap::from([(SOURCE, source), (TARGET, target)])
    }

    fn migration(selected: Vec<MountPoint>) -> Migration {
        let target = MigrationTarget::new(
            "aws",
            Credentials::new("CloudJohn", "CloudJohnPass", "domain1"),
            TARGET,
        )
        .unwrap();
        Migration::new(selected, SOURCE, target)
    }

    fn executor() -> MigrationExecutor {
        MigrationExecutor::new(MigrationPolicy::default(), Arc::new(NoDelay))
    }

    #[tokio::test]
    async fn test_run_successful() {
        let mut store = workloads();
        let mut m = migration(vec![MountPoint::new("c:", 100)]);

        let state = executor().run(&mut m, &mut store).await.unwrap();

        assert_eq!(state, MigrationState::Success);
        assert_eq!(m.state(), MigrationState::Success);
        let target = &store[&TARGET];
        let source = &store[&SOURCE];
        assert_eq!(
            target.storage,
            vec![MountPoint::new("f:", 100), MountPoint::new("g:", 100), MountPoint::new("c:", 100)]
        );
        assert_eq!(target.ip, source.ip);
        assert_eq!(target.credentials, source.credentials);
    }

    #[tokio::test]
    async fn test_run_copies_source_entries_in_source_order() {
        let mut store = workloads();
        // selection sizes differ from the source; the source entry is what gets copied
        let mut m = migration(vec![MountPoint::new("e:", 1), MountPoint::new("c:", 1)]);

        executor().run(&mut m, &mut store).await.unwrap();

        let names: Vec<(&str, u64)> =
            store[&TARGET].storage.iter().map(|mp| (mp.name.as_str(), mp.size)).collect();
        assert_eq!(names, vec![("f:", 100), ("g:", 100), ("c:", 100), ("e:", 100)]);
    }

    #[tokio::test]
    async fn test_run_error_selected_storages_are_absent() {
        let mut store = workloads();
        let before = store.clone();
        let mut m = migration(vec![MountPoint::new("c:", 100), MountPoint::new("z:", 100)]);

        let state = executor().run(&mut m, &mut store).await.unwrap();

        assert_eq!(state, MigrationState::Error);
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn test_run_error_when_policy_disallows() {
        let mut store = workloads();
        let before = store.clone();
        let mut m = migration(vec![MountPoint::new("c:", 100)]);
        let mut executor = executor();
        executor.set_policy(MigrationPolicy { volume_c_allowed: false });

        let state = executor.run(&mut m, &mut store).await.unwrap();

        assert_eq!(state, MigrationState::Error);
        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn test_empty_selection_succeeds_without_copy() {
        let mut store = workloads();
        let mut m = migration(vec![]);

        let state = executor().run(&mut m, &mut store).await.unwrap();

        assert_eq!(state, MigrationState::Success);
        assert_eq!(store[&TARGET].storage.len(), 2);
        assert_eq!(store[&TARGET].ip, "192.168.1.1");
    }

    #[tokio::test]
    async fn test_rerun_duplicates_entries() {
        let mut store = workloads();
        let mut m = migration(vec![MountPoint::new("c:", 100)]);
        let executor = executor();

        executor.run(&mut m, &mut store).await.unwrap();
        executor.run(&mut m, &mut store).await.unwrap();

        let names: Vec<&str> = store[&TARGET].storage.iter().map(|mp| mp.name.as_str()).collect();
        assert_eq!(names, vec!["f:", "g:", "c:", "c:"]);
        assert_eq!(m.state(), MigrationState::Success);
    }

    #[tokio::test]
    async fn test_same_workload_as_source_and_destination() {
        let mut store = workloads();
        let target = MigrationTarget::new(
            "azure",
            Credentials::new("CloudJohn", "CloudJohnPass", "domain1"),
            SOURCE,
        )
        .unwrap();
        let mut m = Migration::new(vec![MountPoint::new("d:", 100)], SOURCE, target);

        executor().run(&mut m, &mut store).await.unwrap();

        let names: Vec<&str> = store[&SOURCE].storage.iter().map(|mp| mp.name.as_str()).collect();
        assert_eq!(names, vec!["c:", "d:", "e:", "d:"]);
    }

    #[tokio::test]
    async fn test_unknown_workload_is_hard_error() {
        let mut store = workloads();
        store.remove(&TARGET);
        let mut m = migration(vec![]);

        let err = executor().run(&mut m, &mut store).await.unwrap_err();

        assert!(matches!(err, MigrantError::WorkloadNotFound { ref id } if id == "1"));
        assert_eq!(m.state(), MigrationState::NotStarted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_waits_for_transfer_delay() {
        let mut store = workloads();
        let mut m = migration(vec![MountPoint::new("c:", 100)]);
        let executor = MigrationExecutor::new(
            MigrationPolicy::default(),
            Arc::new(SleepDelay::new(Duration::from_secs(60))),
        );

        let start = tokio::time::Instant::now();
        executor.run(&mut m, &mut store).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_transfer_leaves_destination_untouched() {
        let mut store = workloads();
        let before = store.clone();
        let mut m = migration(vec![MountPoint::new("c:", 100)]);
        let executor = MigrationExecutor::new(
            MigrationPolicy::default(),
            Arc::new(SleepDelay::new(Duration::from_secs(60))),
        );

        let result =
            tokio::time::timeout(Duration::from_secs(1), executor.run(&mut m, &mut store)).await;

        assert!(result.is_err());
        assert_eq!(m.state(), MigrationState::Error);
        assert_eq!(store, before);

        // a later run still completes normally
        executor.run(&mut m, &mut store).await.unwrap();
        assert_eq!(m.state(), MigrationState::Success);
        assert_eq!(store[&TARGET].storage.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_path_does_not_wait() {
        let mut store = workloads();
        let mut m = migration(vec![MountPoint::new("z:", 100)]);
        let executor = MigrationExecutor::new(
            MigrationPolicy::default(),
            Arc::new(SleepDelay::new(Duration::from_secs(60))),
        );

        let start = tokio::time::Instant::now();
        executor.run(&mut m, &mut store).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
