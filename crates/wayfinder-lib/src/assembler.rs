//! Turns a raw node-id path into an annotated [`RouteResult`].

use tracing::warn;

use crate::config::EngineConfig;
use crate::distance::distance_with_config;
use crate::graph::Graph;
use crate::model::{Node, NodeId, SnapshotIndex};
use crate::output::{RouteNode, RouteResult, NO_PATH_MESSAGE};

/// Annotate `path` with per-step distances, instructions, and floor names.
///
/// An empty path produces a "no path" result. Step distances use the same
/// distance function as the search, so `total_distance` always agrees with
/// the sum of `distance_from_previous`. A single-node path yields one
/// "Start at" step, and a floor change is reported as such even on the
/// final step.
pub fn assemble(
    path: &[NodeId],
    graph: &Graph,
    index: &SnapshotIndex<'_>,
    config: &EngineConfig,
) -> RouteResult {
    let nodes: Vec<&Node> = path
        .iter()
        .filter_map(|id| {
            let node = index.node(id);
            if node.is_none() {
                warn!(node_id = %id, "path references a node missing from the snapshot");
            }
            node
        })
        .collect();

    if nodes.is_empty() {
        return RouteResult::not_found(NO_PATH_MESSAGE);
    }

    let last = nodes.len() - 1;
    let steps = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let previous = i.checked_sub(1).map(|p| nodes[p]);
            let distance_from_previous = previous
                .map(|prev| distance_with_config(prev, node, config))
                .unwrap_or(0.0);
            let corridor_points = previous
                .and_then(|prev| graph.link_between(&prev.id, &node.id))
                .and_then(|link| link.geometry.clone());

            RouteNode {
                node_id: node.id.clone(),
                name: node.name.clone(),
                node_type: node.node_type,
                x: node.x,
                y: node.y,
                floor_id: node.floor_id.clone(),
                floor_name: index.floor_name(&node.floor_id).map(str::to_string),
                instruction: instruction_for(i, last, previous, node),
                distance_from_previous,
                corridor_points,
            }
        })
        .collect();

    RouteResult::from_path(steps, config.walking_speed)
}

fn instruction_for(i: usize, last: usize, previous: Option<&Node>, node: &Node) -> String {
    let name = node.display_name();
    match previous {
        None => format!("Start at {name}"),
        // A floor change is announced even when it is the final step.
        Some(prev) if prev.floor_id != node.floor_id => format!("Take elevator/stairs to {name}"),
        Some(_) if i == last => format!("Arrive at destination: {name}"),
        Some(_) => format!("Continue to {name}"),
    }
}
