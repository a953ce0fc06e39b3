//! Route planning strategies.
//!
//! Each search algorithm is wrapped in a [`RoutePlanner`] so `plan_route`
//! can pick one without knowing how it searches.

use crate::config::EngineConfig;
use crate::graph::Graph;
use crate::model::{NodeId, SnapshotIndex};
use crate::path::{find_route_a_star, find_route_dijkstra};

use super::RouteAlgorithm;

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Execute the search on the given graph.
    ///
    /// Returns `Some(path)` if a route is found, `None` otherwise.
    fn find_path(
        &self,
        graph: &Graph,
        index: &SnapshotIndex<'_>,
        start: &str,
        goal: &str,
        config: &EngineConfig,
    ) -> Option<Vec<NodeId>>;

    /// Whether the planner always returns a cheapest path, including across floors.
    fn is_exact(&self) -> bool {
        false
    }
}

/// A* planner guided by the floor-aware distance heuristic.
#[derive(Debug, Clone, Default)]
pub struct AStarPlanner;

impl RoutePlanner for AStarPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStar
    }

    fn find_path(
        &self,
        graph: &Graph,
        index: &SnapshotIndex<'_>,
        start: &str,
        goal: &str,
        config: &EngineConfig,
    ) -> Option<Vec<NodeId>> {
        find_route_a_star(graph, index, start, goal, config)
    }
}

/// Dijkstra planner; slower than A* on large floors but exact across them.
#[derive(Debug, Clone, Default)]
pub struct DijkstraPlanner;

impl RoutePlanner for DijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn find_path(
        &self,
        graph: &Graph,
        _index: &SnapshotIndex<'_>,
        start: &str,
        goal: &str,
        _config: &EngineConfig,
    ) -> Option<Vec<NodeId>> {
        find_route_dijkstra(graph, start, goal)
    }

    fn is_exact(&self) -> bool {
        true
    }
}

/// Select the planner for a given algorithm.
pub fn select_planner(algorithm: RouteAlgorithm) -> Box<dyn RoutePlanner> {
    match algorithm {
        RouteAlgorithm::AStar => Box::new(AStarPlanner),
        RouteAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
    }
}
