//! Core metrics definitions.
//!
//! All metrics follow Prometheus naming conventions:
//! - `_total` suffix for counters
//! - `_seconds` suffix for histograms measuring duration

use crate::persistence::TrackedKind;
use crate::types::MigrationState;
use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Register all core metrics with descriptions.
pub fn register_core_metrics() {
    describe_counter!("migrant_migrations_total", "Total number of migration runs (by final state)");
    describe_histogram!(
        "migrant_migration_duration_seconds",
        "Time from a migration entering running to its final state"
    );

    describe_counter!(
        "migrant_snapshot_writes_total",
        "Total number of snapshot write attempts (by status: success, conflict, error)"
    );
    describe_counter!(
        "migrant_snapshot_conflicts_total",
        "Snapshot writes rejected for duplicate tracked identities (by kind)"
    );
}

pub fn record_migration(state: MigrationState, duration_secs: f64) {
    counter!("migrant_migrations_total", "state" => state.as_str()).increment(1);
    histogram!("migrant_migration_duration_seconds").record(duration_secs);
}

pub fn record_snapshot_write(status: &'static str) {
    counter!("migrant_snapshot_writes_total", "status" => status).increment(1);
}

pub fn record_snapshot_conflict(kind: TrackedKind) {
    counter!("migrant_snapshot_conflicts_total", "kind" => kind.as_str()).increment(1);
    record_snapshot_write("conflict");
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

    fn counter(snapshotter: &Snapshotter, name: &str, label: (&str, &str)) -> Option<u64> {
        snapshotter.snapshot().into_vec().into_iter().find_map(|(key, _, _, value)| {
            let key = key.key();
            let matches = key.name() == name
                && key.labels().any(|l| l.key() == label.0 && l.value() == label.1);
            match value {
                DebugValue::Counter(n) if matches => Some(n),
                _ => None,
            }
        })
    }

    #[test]
    fn test_record_migration() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_migration(MigrationState::Success, 0.5);
            record_migration(MigrationState::Success, 1.5);
            record_migration(MigrationState::Error, 0.0);
        });

        let snapshot = snapshotter.snapshot().into_vec();
        let samples = snapshot.iter().find_map(|(key, _, _, value)| match value {
            DebugValue::Histogram(samples)
                if key.key().name() == "migrant_migration_duration_seconds" =>
            {
                Some(samples.len())
            }
            _ => None,
        });
        assert_eq!(samples, Some(3));

        let runs = |state| counter(&snapshotter, "migrant_migrations_total", ("state", state));
        assert_eq!(runs("success"), Some(2));
        assert_eq!(runs("error"), Some(1));
    }

    #[test]
    fn test_snapshot_conflict_counts_as_write() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_snapshot_write("success");
            record_snapshot_conflict(TrackedKind::Source);
        });

        let conflicts = ("kind", "source");
        assert_eq!(counter(&snapshotter, "migrant_snapshot_conflicts_total", conflicts), Some(1));
        let writes =
            |status| counter(&snapshotter, "migrant_snapshot_writes_total", ("status", status));
        assert_eq!(writes("conflict"), Some(1));
        assert_eq!(writes("success"), Some(1));
    }

    #[test]
    fn test_prometheus_rendering() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            register_core_metrics();
            record_migration(MigrationState::Success, 2.0);
        });

        let rendered = handle.render();
        assert!(rendered.contains("# HELP migrant_migrations_total"));
        assert!(rendered.contains(r#"migrant_migrations_total{state="success"} 1"#));
    }
}
