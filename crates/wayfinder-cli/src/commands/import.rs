//! Import command handler for caching a building map from a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use wayfinder_lib::{BuildingSnapshot, FileSnapshotStore};

/// Handle the import subcommand.
///
/// Parses a building snapshot document and stores it in the cache,
/// replacing any earlier snapshot of the same building.
pub fn handle_import(store: &FileSnapshotStore, file: &Path) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let snapshot: BuildingSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid building snapshot", file.display()))?;

    if snapshot.nodes.is_empty() {
        bail!("building '{}' has no nodes", snapshot.building_id);
    }

    let path = store
        .save(&snapshot)
        .with_context(|| format!("failed to cache building '{}'", snapshot.building_id))?;

    println!(
        "Cached building {} ({} floors, {} nodes, {} edges) at {}",
        snapshot.building_id,
        snapshot.floors.len(),
        snapshot.nodes.len(),
        snapshot.edges.len(),
        path.display()
    );
    Ok(())
}
