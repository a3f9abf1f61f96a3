//! `migrant show` command

use anyhow::Result;
use migrant_core::persistence::Tracked;
use migrant_core::{Entity, PersistenceLayer};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "KIND")]
    kind: &'static str,
    #[tabled(rename = "IDENTITY")]
    identity: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// List the objects stored in the snapshot
pub async fn show(snapshot: &Path) -> Result<()> {
    let mut layer: PersistenceLayer<Entity> = PersistenceLayer::new(vec![], snapshot);
    let objects = layer.read().await?;

    if objects.is_empty() {
        println!("Snapshot is empty");
        return Ok(());
    }

    let rows: Vec<ObjectRow> = objects
        .iter()
        .enumerate()
        .map(|(index, obj)| ObjectRow {
            index,
            kind: obj.kind(),
            identity: obj.tracked_identity().map_or("-", |(_, key)| key).to_string(),
            value: obj.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    println!("{}", table);

    Ok(())
}
