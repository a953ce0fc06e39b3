//! Local route planning over a building snapshot.
//!
//! This module provides:
//! - [`RouteAlgorithm`] - Supported search algorithms (A*, Dijkstra)
//! - [`RouteRequest`] - A single route query
//! - [`plan_route`] - The synchronous, side-effect-free engine entry point
//!
//! # Example
//!
//! ```ignore
//! use wayfinder_lib::{plan_route, EngineConfig, RouteRequest};
//!
//! let request = RouteRequest::new("lobby", "room-204").accessible(true);
//! let result = plan_route(&snapshot, &request, &EngineConfig::default())?;
//! for line in result.instructions() {
//!     println!("{line}");
//! }
//! ```

mod planner;

pub use planner::{select_planner, AStarPlanner, DijkstraPlanner, RoutePlanner};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembler::assemble;
use crate::config::EngineConfig;
use crate::error::RouteError;
use crate::graph::build_graph;
use crate::model::{BuildingId, BuildingSnapshot, NodeId, SnapshotIndex};
use crate::output::RouteResult;

/// Supported search algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RouteAlgorithm {
    /// A* search guided by the floor-aware heuristic.
    #[default]
    #[serde(rename = "a-star")]
    AStar,
    /// Dijkstra's algorithm; exact across floors.
    #[serde(rename = "dijkstra")]
    Dijkstra,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::AStar => "a-star",
            RouteAlgorithm::Dijkstra => "dijkstra",
        };
        f.write_str(value)
    }
}

impl FromStr for RouteAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a-star" | "astar" | "a*" => Ok(RouteAlgorithm::AStar),
            "dijkstra" => Ok(RouteAlgorithm::Dijkstra),
            other => Err(format!("unknown route algorithm '{other}'")),
        }
    }
}

/// A single route query.
///
/// Requests are hashable so identical queries can share one in-flight
/// computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteRequest {
    pub start: NodeId,
    pub goal: NodeId,
    pub require_accessible: bool,
    /// Building to search; resolved from `start` when absent.
    pub building_id: Option<BuildingId>,
    pub algorithm: RouteAlgorithm,
}

impl RouteRequest {
    /// A* request without accessibility requirement or building hint.
    pub fn new(start: impl Into<NodeId>, goal: impl Into<NodeId>) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
            require_accessible: false,
            building_id: None,
            algorithm: RouteAlgorithm::AStar,
        }
    }

    pub fn accessible(mut self, require_accessible: bool) -> Self {
        self.require_accessible = require_accessible;
        self
    }

    pub fn in_building(mut self, building_id: impl Into<BuildingId>) -> Self {
        self.building_id = Some(building_id.into());
        self
    }

    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Resolve a node id against the snapshot, failing with [`RouteError::NodeNotFound`].
fn resolve_node(index: &SnapshotIndex<'_>, node_id: &str) -> Result<(), RouteError> {
    if index.node(node_id).is_some() {
        Ok(())
    } else {
        Err(RouteError::NodeNotFound {
            node_id: node_id.to_string(),
        })
    }
}

/// Compute a route within a single building snapshot.
///
/// This is the offline engine entry point. It:
/// 1. Verifies both endpoints exist in the snapshot
/// 2. Builds the accessibility-filtered graph
/// 3. Runs the selected planner
/// 4. Assembles the annotated result
///
/// An unreachable goal is a normal outcome (`path_found == false`); only
/// unknown endpoints are errors.
pub fn plan_route(
    snapshot: &BuildingSnapshot,
    request: &RouteRequest,
    config: &EngineConfig,
) -> Result<RouteResult, RouteError> {
    let index = snapshot.index();
    resolve_node(&index, &request.start)?;
    resolve_node(&index, &request.goal)?;

    let graph = build_graph(
        &snapshot.nodes,
        &snapshot.edges,
        request.require_accessible,
        config,
    );

    let planner = select_planner(request.algorithm);
    let path = planner
        .find_path(&graph, &index, &request.start, &request.goal, config)
        .unwrap_or_default();

    debug!(
        building_id = %snapshot.building_id,
        start = %request.start,
        goal = %request.goal,
        algorithm = %planner.algorithm(),
        exact = planner.is_exact(),
        steps = path.len(),
        "local route planned"
    );

    Ok(assemble(&path, &graph, &index, config))
}
