//! The distance function shared by the graph builder, the search heuristic,
//! and the route assembler.
//!
//! Coordinates are plan-local and not comparable across floors, so any pair
//! of nodes on different floors is priced at a flat penalty instead of a
//! metric distance. Floor changes are expected to happen through explicit
//! elevator or stairs edges; a mismatch on a plain edge is a data anomaly.

use crate::config::{EngineConfig, FLOOR_PENALTY};
use crate::model::Node;

/// Distance between two nodes using the default [`FLOOR_PENALTY`].
pub fn distance(from: &Node, to: &Node) -> f64 {
    distance_with_penalty(from, to, FLOOR_PENALTY)
}

/// Distance between two nodes using the penalty from `config`.
pub fn distance_with_config(from: &Node, to: &Node, config: &EngineConfig) -> f64 {
    distance_with_penalty(from, to, config.floor_penalty)
}

/// Euclidean distance on a shared floor, `floor_penalty` otherwise.
pub fn distance_with_penalty(from: &Node, to: &Node, floor_penalty: f64) -> f64 {
    if from.floor_id != to.floor_id {
        return floor_penalty;
    }
    from.position().distance_to(&to.position())
}
