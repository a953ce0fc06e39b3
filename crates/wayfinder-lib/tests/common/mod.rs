//! Common test utilities and fixture helpers.
//!
//! Shared building fixtures for integration tests: the small three-node
//! floor used throughout the routing scenarios, and the two-floor sample
//! building stored under `docs/fixtures`.

use std::fs;
use std::path::PathBuf;

use wayfinder_lib::{BuildingSnapshot, Edge, EdgeType, Floor, Node};

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// The two-floor sample building from `docs/fixtures/sample_building.json`.
#[allow(dead_code)]
pub fn sample_building() -> BuildingSnapshot {
    let path = fixtures_dir().join("sample_building.json");
    let raw = fs::read_to_string(&path).expect("read sample_building.json");
    serde_json::from_str(&raw).expect("sample building decodes")
}

/// `A(0,0)`, `B(3,0)`, `C(3,4)` on floor F1 with edges A–B (3) and B–C (4).
#[allow(dead_code)]
pub fn three_node_floor() -> BuildingSnapshot {
    BuildingSnapshot::new(
        "b1",
        vec![Floor::new("F1", "Ground")],
        vec![
            Node::new("A", 0.0, 0.0, "F1"),
            Node::new("B", 3.0, 0.0, "F1"),
            Node::new("C", 3.0, 4.0, "F1"),
        ],
        vec![
            Edge::new("ab", "A", "B").with_weight(3.0),
            Edge::new("bc", "B", "C").with_weight(4.0),
        ],
    )
}

/// [`three_node_floor`] with the B–C edge marked inaccessible.
#[allow(dead_code)]
pub fn three_node_floor_blocked() -> BuildingSnapshot {
    let mut snapshot = three_node_floor();
    for edge in &mut snapshot.edges {
        if edge.id == "bc" {
            edge.is_accessible = false;
        }
    }
    snapshot
}

/// [`three_node_floor`] plus `D` on floor F2, joined to C by an unweighted elevator edge.
#[allow(dead_code)]
pub fn two_floor_building() -> BuildingSnapshot {
    let mut snapshot = three_node_floor();
    snapshot.floors.push(Floor::new("F2", "Upper"));
    snapshot.nodes.push(Node::new("D", 3.0, 4.0, "F2"));
    snapshot
        .edges
        .push(Edge::new("cd", "C", "D").with_type(EdgeType::Elevator));
    snapshot
}
