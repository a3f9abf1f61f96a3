//! `migrant purge` command

use anyhow::Result;
use colored::Colorize;
use migrant_core::{Entity, MigrantError, PersistenceLayer};
use std::path::Path;

/// Delete the snapshot
pub async fn purge(snapshot: &Path) -> Result<()> {
    let layer: PersistenceLayer<Entity> = PersistenceLayer::new(vec![], snapshot);

    match layer.delete().await {
        Ok(()) => {
            println!("{} Snapshot deleted: {}", "✓".green().bold(), snapshot.display());
            Ok(())
        }
        Err(MigrantError::SnapshotNotFound { .. }) => {
            println!("{} No snapshot at {}", "⚠".yellow().bold(), snapshot.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
