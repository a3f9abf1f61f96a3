//! Snapshot entries.

use super::{Tracked, TrackedKind};
use crate::types::mount_point::display_list;
use crate::types::{
    Credentials, MigrationRecord, MigrationTargetRecord, MountPoint, Source, Workload,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Any domain object that can be stored in a snapshot.
///
/// Serialized with an explicit `kind` tag so that each entry decodes back
/// to the type it was written as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Entity {
    Credentials(Credentials),
    MountPoint(MountPoint),
    MountPoints(Vec<MountPoint>),
    Source(Source),
    Workload(Workload),
    MigrationTarget(MigrationTargetRecord),
    Migration(MigrationRecord),
}

impl Tracked for Source {
    fn tracked_identity(&self) -> Option<(TrackedKind, &str)> {
        Some((TrackedKind::Source, self.ip()))
    }
}

impl Tracked for MigrationRecord {
    fn tracked_identity(&self) -> Option<(TrackedKind, &str)> {
        Some((TrackedKind::Migration, &self.source.ip))
    }
}

impl Tracked for Entity {
    fn tracked_identity(&self) -> Option<(TrackedKind, &str)> {
        match self {
            Self::Source(source) => source.tracked_identity(),
            Self::Migration(record) => record.tracked_identity(),
            Self::Credentials(_)
            | Self::MountPoint(_)
            | Self::MountPoints(_)
            | Self::Workload(_)
            | Self::MigrationTarget(_) => None,
        }
    }
}

impl Entity {
    /// Short kind tag (matches the serialized `kind`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Credentials(_) => "credentials",
            Self::MountPoint(_) => "mount_point",
            Self::MountPoints(_) => "mount_points",
            Self::Source(_) => "source",
            Self::Workload(_) => "workload",
            Self::MigrationTarget(_) => "migration_target",
            Self::Migration(_) => "migration",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credentials(c) => fmt::Display::fmt(c, f),
            Self::MountPoint(mp) => fmt::Display::fmt(mp, f),
            Self::MountPoints(mps) => f.write_str(&display_list(mps)),
            Self::Source(s) => fmt::Display::fmt(s, f),
            Self::Workload(w) => fmt::Display::fmt(w, f),
            Self::MigrationTarget(t) => fmt::Display::fmt(t, f),
            Self::Migration(m) => fmt::Display::fmt(m, f),
        }
    }
}

impl From<Credentials> for Entity {
    fn from(value: Credentials) -> Self {
        Self::Credentials(value)
    }
}

impl From<MountPoint> for Entity {
    fn from(value: MountPoint) -> Self {
        Self::MountPoint(value)
    }
}

impl From<Vec<MountPoint>> for Entity {
    fn from(value: Vec<MountPoint>) -> Self {
        Self::MountPoints(value)
    }
}

impl From<Source> for Entity {
    fn from(value: Source) -> Self {
        Self::Source(value)
    }
}

impl From<Workload> for Entity {
    fn from(value: Workload) -> Self {
        Self::Workload(value)
    }
}

impl From<MigrationTargetRecord> for Entity {
    fn from(value: MigrationTargetRecord) -> Self {
        Self::MigrationTarget(value)
    }
}

impl From<MigrationRecord> for Entity {
    fn from(value: MigrationRecord) -> Self {
        Self::Migration(value)
    }
}
