//! `migrant run` command

use super::scenario::Scenario;
use anyhow::{Context, Result};
use colored::Colorize;
use migrant_core::{
    Config, Entity, MigrationExecutor, MigrationRecord, MigrationState, NoDelay, PersistenceLayer,
    Registry,
};
use std::path::Path;
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

#[derive(Tabled)]
struct MigrationRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "CLOUD")]
    cloud: String,
    #[tabled(rename = "VOLUMES")]
    volumes: String,
    #[tabled(rename = "DESTINATION")]
    destination: String,
    #[tabled(rename = "STATE")]
    state: String,
}

/// Run every migration of a scenario and merge the results into the snapshot
pub async fn run(config: &Config, scenario: &Path, snapshot: &Path, no_wait: bool) -> Result<()> {
    let scenario = Scenario::load(scenario)?;

    let executor = if no_wait {
        MigrationExecutor::new(config.policy(), Arc::new(NoDelay))
    } else {
        MigrationExecutor::from_config(config)
    };

    let mut registry = Registry::new();
    let ids = scenario.register(&mut registry)?;
    info!(migrations = ids.len(), no_wait, "Scenario loaded");

    if ids.is_empty() {
        println!("No migrations in scenario");
        return Ok(());
    }

    println!("{} Running {} migration(s)", "→".cyan().bold(), ids.len());
    if !no_wait && config.transfer_delay_secs > 0 {
        println!(
            "{}",
            format!("Each successful transfer takes {}s", config.transfer_delay_secs).dimmed()
        );
    }
    println!();

    let mut rows = Vec::with_capacity(ids.len());
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        registry.run_migration(id, &executor).await?;
        let record = registry.export_migration(id)?;
        rows.push(row(id.0, &record));
        records.push(Entity::from(record));
    }

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{}", table);
    println!();

    if let Some(parent) = snapshot.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut layer = PersistenceLayer::new(records, snapshot);
    let written = if snapshot.exists() { layer.update().await } else { layer.create().await };
    written.with_context(|| format!("Snapshot not written: {}", snapshot.display()))?;

    println!(
        "{} Snapshot written: {} ({} object(s))",
        "✓".green().bold(),
        snapshot.display().to_string().bold(),
        layer.objects().len()
    );

    Ok(())
}

fn row(id: u64, record: &MigrationRecord) -> MigrationRow {
    let volumes: Vec<&str> =
        record.selected_mount_points.iter().map(|mp| mp.name.as_str()).collect();

    MigrationRow {
        id,
        source: record.source.ip.clone(),
        cloud: record.cloud_type.to_string(),
        volumes: volumes.join(", "),
        destination: record.target_vm.ip.clone(),
        state: colorize_state(record.migration_state),
    }
}

fn colorize_state(state: MigrationState) -> String {
    match state {
        MigrationState::Success => state.as_str().green().to_string(),
        MigrationState::Error => state.as_str().red().to_string(),
        MigrationState::Running => state.as_str().yellow().to_string(),
        MigrationState::NotStarted => state.as_str().dimmed().to_string(),
    }
}
