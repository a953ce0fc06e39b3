use std::collections::HashMap;

use tracing::debug;

use crate::config::EngineConfig;
use crate::distance::distance_with_config;
use crate::model::{Edge, EdgeType, Node, NodeId, Point};

/// Directed half of an undirected edge within the routing graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub target: NodeId,
    pub edge_id: String,
    pub edge_type: EdgeType,
    pub weight: f64,
    pub accessible: bool,
    /// Corridor polyline oriented from the link's source to its target.
    pub geometry: Option<Vec<Point>>,
}

/// Adjacency structure used by the pathfinder.
///
/// Every node handed to the builder has an entry, even when it has no
/// neighbours, so lookups during search never miss.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    require_accessible: bool,
    adjacency: HashMap<NodeId, Vec<Link>>,
}

impl Graph {
    /// Whether inaccessible edges were filtered out when this graph was built.
    pub fn requires_accessible(&self) -> bool {
        self.require_accessible
    }

    /// Return the neighbours for a given node identifier.
    pub fn neighbours(&self, node: &str) -> &[Link] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed links (two per retained edge).
    pub fn link_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Cheapest link from `from` to `to`, if the two are adjacent.
    pub fn link_between(&self, from: &str, to: &str) -> Option<&Link> {
        self.neighbours(from)
            .iter()
            .filter(|link| link.target == to)
            .min_by(|a, b| a.weight.total_cmp(&b.weight))
    }
}

/// Build the routing graph for one query.
///
/// Edges are undirected, so each retained edge yields a link in both
/// directions with the same weight. When `require_accessible` is set,
/// inaccessible edges are skipped entirely. Edges referencing node ids that
/// are not in `nodes` are dropped rather than treated as errors, since
/// snapshots may be partially synced. Missing or non-positive weights are
/// derived from node positions here, once, instead of during relaxation.
pub fn build_graph(
    nodes: &[Node],
    edges: &[Edge],
    require_accessible: bool,
    config: &EngineConfig,
) -> Graph {
    let by_id: HashMap<&str, &Node> = nodes.iter().map(|node| (node.id.as_str(), node)).collect();

    let mut adjacency: HashMap<NodeId, Vec<Link>> = nodes
        .iter()
        .map(|node| (node.id.clone(), Vec::new()))
        .collect();

    let mut inaccessible = 0usize;
    let mut dangling = 0usize;

    for edge in edges {
        if require_accessible && !edge.is_accessible {
            inaccessible += 1;
            continue;
        }

        let (Some(a), Some(b)) = (by_id.get(edge.a.as_str()), by_id.get(edge.b.as_str())) else {
            dangling += 1;
            continue;
        };

        let weight = edge
            .explicit_weight()
            .unwrap_or_else(|| distance_with_config(a, b, config));

        let reversed = edge.geometry.as_ref().map(|points| {
            let mut points = points.clone();
            points.reverse();
            points
        });

        adjacency.entry(a.id.clone()).or_default().push(Link {
            target: b.id.clone(),
            edge_id: edge.id.clone(),
            edge_type: edge.edge_type,
            weight,
            accessible: edge.is_accessible,
            geometry: edge.geometry.clone(),
        });
        adjacency.entry(b.id.clone()).or_default().push(Link {
            target: a.id.clone(),
            edge_id: edge.id.clone(),
            edge_type: edge.edge_type,
            weight,
            accessible: edge.is_accessible,
            geometry: reversed,
        });
    }

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        skipped_inaccessible = inaccessible,
        dropped_dangling = dangling,
        require_accessible,
        "built routing graph"
    );

    Graph {
        require_accessible,
        adjacency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("a", 0.0, 0.0, "F1"),
            Node::new("b", 3.0, 0.0, "F1"),
            Node::new("c", 3.0, 4.0, "F1"),
        ]
    }

    #[test]
    fn isolated_nodes_get_empty_entries() {
        let graph = build_graph(&nodes(), &[], false, &EngineConfig::default());
        assert_eq!(graph.node_count(), 3);
        assert!(graph.contains("c"));
        assert!(graph.neighbours("c").is_empty());
        assert!(graph.neighbours("missing").is_empty());
    }

    #[test]
    fn edges_become_bidirectional_links() {
        let edges = vec![Edge::new("ab", "a", "b").with_weight(7.5)];
        let graph = build_graph(&nodes(), &edges, false, &EngineConfig::default());

        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.link_between("a", "b").map(|l| l.weight), Some(7.5));
        assert_eq!(graph.link_between("b", "a").map(|l| l.weight), Some(7.5));
    }

    #[test]
    fn geometry_is_reversed_for_the_back_link() {
        let edges = vec![Edge::new("ab", "a", "b")
            .with_geometry(vec![Point::new(0.0, 0.0), Point::new(1.5, 1.0), Point::new(3.0, 0.0)])];
        let graph = build_graph(&nodes(), &edges, false, &EngineConfig::default());

        let forward = graph.link_between("a", "b").and_then(|l| l.geometry.clone());
        let backward = graph.link_between("b", "a").and_then(|l| l.geometry.clone());
        assert_eq!(forward.as_ref().map(|p| p[0]), Some(Point::new(0.0, 0.0)));
        assert_eq!(backward.as_ref().map(|p| p[0]), Some(Point::new(3.0, 0.0)));
    }

    #[test]
    fn link_between_prefers_cheapest_parallel_edge() {
        let edges = vec![
            Edge::new("slow", "a", "b").with_weight(9.0),
            Edge::new("fast", "a", "b").with_weight(2.0),
        ];
        let graph = build_graph(&nodes(), &edges, false, &EngineConfig::default());
        assert_eq!(
            graph.link_between("a", "b").map(|l| l.edge_id.as_str()),
            Some("fast")
        );
    }

    #[test]
    fn parallel_edge_choice_ignores_declaration_order() {
        let edges = vec![
            Edge::new("fast", "a", "b").with_weight(2.0),
            Edge::new("derived", "a", "b"),
            Edge::new("slow", "a", "b").with_weight(9.0),
        ];
        let graph = build_graph(&nodes(), &edges, false, &EngineConfig::default());
        assert_eq!(
            graph.link_between("b", "a").map(|l| l.edge_id.as_str()),
            Some("fast")
        );
    }
}
