//! Buildings command handler for listing cached building maps.

use anyhow::{Context, Result};

use wayfinder_lib::FileSnapshotStore;
use wayfinder_cli::output::{BuildingSummary, OutputFormat};

/// Handle the buildings subcommand.
///
/// Lists every snapshot in the cache directory. Unreadable documents are
/// reported on stderr and skipped.
pub fn handle_list_buildings(store: &FileSnapshotStore, format: OutputFormat) -> Result<()> {
    let ids = store
        .list()
        .with_context(|| format!("failed to list {}", store.dir().display()))?;

    let mut summaries = Vec::with_capacity(ids.len());
    for id in ids {
        match store.load(&id) {
            Ok(Some(snapshot)) => summaries.push(BuildingSummary {
                building_id: snapshot.building_id,
                building_name: snapshot.building_name,
                floors: snapshot.floors.len(),
                nodes: snapshot.nodes.len(),
                edges: snapshot.edges.len(),
                cached_at: snapshot.cached_at.to_rfc3339(),
            }),
            Ok(None) => {}
            Err(err) => eprintln!("Warning: skipping unreadable snapshot '{id}': {err}"),
        }
    }

    format.render_buildings(&summaries)
}
