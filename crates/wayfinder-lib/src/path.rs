use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::trace;

use crate::config::EngineConfig;
use crate::distance::distance_with_config;
use crate::graph::Graph;
use crate::model::{Node, NodeId, SnapshotIndex};

/// Run A* search between `start` and `goal`.
///
/// The heuristic is the shared distance function: Euclidean distance on the
/// goal's floor and a flat floor penalty anywhere else. The penalty does not
/// always underestimate the remaining cost, so multi-floor routes are not
/// guaranteed optimal; [`find_route_dijkstra`] is the exact alternative.
///
/// Returns `None` when the goal is unreachable or either endpoint is not part
/// of the graph.
pub fn find_route_a_star(
    graph: &Graph,
    index: &SnapshotIndex<'_>,
    start: &str,
    goal: &str,
    config: &EngineConfig,
) -> Option<Vec<NodeId>> {
    let goal_node = index.node(goal)?;
    search(graph, start, goal, |node| {
        heuristic(index.node(node), goal_node, config)
    })
}

/// Run Dijkstra's algorithm: the same search with a zero heuristic.
pub fn find_route_dijkstra(graph: &Graph, start: &str, goal: &str) -> Option<Vec<NodeId>> {
    search(graph, start, goal, |_| 0.0)
}

fn heuristic(node: Option<&Node>, goal: &Node, config: &EngineConfig) -> f64 {
    node.map(|node| distance_with_config(node, goal, config))
        .unwrap_or(0.0)
}

/// Best-first search ordered by `g + h`, ties broken by insertion order.
///
/// Back-pointers are only overwritten when a strictly cheaper cost is found,
/// so the reconstructed path cannot contain a cycle. Entries superseded by a
/// cheaper push are skipped when popped.
fn search<'a, H>(graph: &'a Graph, start: &'a str, goal: &'a str, heuristic: H) -> Option<Vec<NodeId>>
where
    H: Fn(&str) -> f64,
{
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start.to_string()]);
    }

    let mut g_score: HashMap<&'a str, f64> = HashMap::new();
    let mut came_from: HashMap<&'a str, &'a str> = HashMap::new();
    let mut frontier = BinaryHeap::new();
    let mut sequence = 0u64;

    g_score.insert(start, 0.0);
    frontier.push(FrontierEntry::new(start, 0.0, heuristic(start), sequence));

    let mut expanded = 0usize;
    while let Some(entry) = frontier.pop() {
        if let Some(best) = g_score.get(entry.node) {
            if *best < entry.cost.0 {
                continue;
            }
        }

        if entry.node == goal {
            trace!(expanded, "goal reached");
            return Some(reconstruct_path(&came_from, start, goal));
        }
        expanded += 1;

        for link in graph.neighbours(entry.node) {
            let next = link.target.as_str();
            let tentative = entry.cost.0 + link.weight;
            if tentative < g_score.get(next).copied().unwrap_or(f64::INFINITY) {
                g_score.insert(next, tentative);
                came_from.insert(next, entry.node);
                sequence += 1;
                frontier.push(FrontierEntry::new(next, tentative, heuristic(next), sequence));
            }
        }
    }

    trace!(expanded, "frontier exhausted");
    None
}

fn reconstruct_path(came_from: &HashMap<&str, &str>, start: &str, goal: &str) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node.to_string());
        if node == start {
            break;
        }
        current = came_from.get(node).copied();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct FrontierEntry<'a> {
    node: &'a str,
    cost: FloatOrd,
    estimate: FloatOrd,
    sequence: u64,
}

impl<'a> FrontierEntry<'a> {
    fn new(node: &'a str, cost: f64, heuristic: f64, sequence: u64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
            sequence,
        }
    }
}

impl Ord for FrontierEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap pops the lowest estimate, then the
        // earliest insertion.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
