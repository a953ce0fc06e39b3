//! Value types for a building's navigable graph.
//!
//! Nodes, edges, and floors arrive from the data-sync layer in slightly
//! different shapes depending on which API produced them. Normalization happens
//! here, during deserialization, so the engine only ever sees the canonical
//! [`NodeType`] and [`EdgeType`] enumerations.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stable identifier of a node (usually a UUID string).
pub type NodeId = String;
/// Identifier of a floor within a building.
pub type FloorId = String;
/// Identifier of a building; also the unit of snapshot caching.
pub type BuildingId = String;

/// Plan-local coordinates on a single floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate the Euclidean distance to another point.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Classification of a navigable point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Room,
    Corridor,
    Elevator,
    Stairs,
    Entrance,
    Restroom,
    InformationDesk,
    #[default]
    Unknown,
}

impl NodeType {
    /// Map the numeric codes used by older API responses.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => NodeType::Room,
            1 => NodeType::Corridor,
            2 => NodeType::Elevator,
            3 => NodeType::Stairs,
            4 => NodeType::Entrance,
            5 => NodeType::Restroom,
            6 => NodeType::InformationDesk,
            _ => NodeType::Unknown,
        }
    }
}

impl FromStr for NodeType {
    type Err = std::convert::Infallible;

    /// Names are matched case-insensitively, ignoring `_`, `-`, and spaces.
    /// Unrecognised names map to [`NodeType::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = match normalize_tag(s).as_str() {
            "room" => NodeType::Room,
            "corridor" | "hallway" => NodeType::Corridor,
            "elevator" | "lift" => NodeType::Elevator,
            "stairs" | "stair" | "staircase" => NodeType::Stairs,
            "entrance" | "exit" => NodeType::Entrance,
            "restroom" | "toilet" | "wc" => NodeType::Restroom,
            "informationdesk" | "info" | "infodesk" | "reception" => NodeType::InformationDesk,
            _ => NodeType::Unknown,
        };
        Ok(value)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            NodeType::Room => "room",
            NodeType::Corridor => "corridor",
            NodeType::Elevator => "elevator",
            NodeType::Stairs => "stairs",
            NodeType::Entrance => "entrance",
            NodeType::Restroom => "restroom",
            NodeType::InformationDesk => "information desk",
            NodeType::Unknown => "unknown",
        };
        f.write_str(value)
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawTag::deserialize(deserializer)? {
            RawTag::Code(code) => NodeType::from_code(code),
            RawTag::Name(name) => name.parse().unwrap_or_default(),
        })
    }
}

/// Classification of a connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    #[default]
    Walking,
    Stairs,
    Elevator,
    Transition,
}

impl FromStr for EdgeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = match normalize_tag(s).as_str() {
            "stairs" | "stair" | "staircase" => EdgeType::Stairs,
            "elevator" | "lift" => EdgeType::Elevator,
            "transition" => EdgeType::Transition,
            _ => EdgeType::Walking,
        };
        Ok(value)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            EdgeType::Walking => "walking",
            EdgeType::Stairs => "stairs",
            EdgeType::Elevator => "elevator",
            EdgeType::Transition => "transition",
        };
        f.write_str(value)
    }
}

impl<'de> Deserialize<'de> for EdgeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawTag::deserialize(deserializer)? {
            RawTag::Code(1) => EdgeType::Stairs,
            RawTag::Code(2) => EdgeType::Elevator,
            RawTag::Code(3) => EdgeType::Transition,
            RawTag::Code(_) => EdgeType::Walking,
            RawTag::Name(name) => name.parse().unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTag {
    Code(i64),
    Name(String),
}

fn normalize_tag(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A navigable point inside a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub floor_id: FloorId,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

impl Node {
    /// Convenience constructor for an unnamed node of unknown type.
    pub fn new(id: impl Into<NodeId>, x: f64, y: f64, floor_id: impl Into<FloorId>) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            floor_id: floor_id.into(),
            node_type: NodeType::Unknown,
            name: None,
            qr_code: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn with_qr_code(mut self, code: impl Into<String>) -> Self {
        self.qr_code = Some(code.into());
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Label used in instructions; unnamed nodes fall back to their id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// An undirected connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "EdgeRecord")]
pub struct Edge {
    pub id: String,
    pub a: NodeId,
    pub b: NodeId,
    /// Explicit traversal cost; absent or non-positive weights are derived
    /// from node positions when the graph is built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub edge_type: EdgeType,
    pub is_accessible: bool,
    /// Optional corridor polyline from `a` to `b`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<Point>>,
}

impl Edge {
    /// Accessible walking edge without an explicit weight.
    pub fn new(id: impl Into<String>, a: impl Into<NodeId>, b: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            a: a.into(),
            b: b.into(),
            weight: None,
            edge_type: EdgeType::Walking,
            is_accessible: true,
            geometry: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = edge_type;
        self
    }

    pub fn accessible(mut self, is_accessible: bool) -> Self {
        self.is_accessible = is_accessible;
        self
    }

    pub fn with_geometry(mut self, points: Vec<Point>) -> Self {
        self.geometry = Some(points);
        self
    }

    /// The explicit weight, if it is usable as-is.
    pub fn explicit_weight(&self) -> Option<f64> {
        self.weight.filter(|w| w.is_finite() && *w > 0.0)
    }
}

/// Wire shape of an edge. Accepts the endpoint aliases used by the various
/// API versions and infers accessibility from the edge type when the flag is
/// missing (stairs are never accessible by default).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeRecord {
    id: String,
    #[serde(alias = "nodeA", alias = "fromNodeId")]
    a: NodeId,
    #[serde(alias = "nodeB", alias = "toNodeId")]
    b: NodeId,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    edge_type: EdgeType,
    #[serde(default)]
    is_accessible: Option<bool>,
    #[serde(default)]
    geometry: Option<Vec<Point>>,
}

impl From<EdgeRecord> for Edge {
    fn from(record: EdgeRecord) -> Self {
        let is_accessible = record
            .is_accessible
            .unwrap_or(record.edge_type != EdgeType::Stairs);
        Self {
            id: record.id,
            a: record.a,
            b: record.b,
            weight: record.weight,
            edge_type: record.edge_type,
            is_accessible,
            geometry: record.geometry,
        }
    }
}

/// A floor of a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: FloorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
}

impl Floor {
    pub fn new(id: impl Into<FloorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            level: None,
        }
    }
}

/// Complete node, edge, and floor set for one building.
///
/// Snapshots are read-only inputs to a route computation. Replacing a cached
/// building means handing out a new snapshot, never mutating a shared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSnapshot {
    pub building_id: BuildingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(default)]
    pub floors: Vec<Floor>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default = "Utc::now")]
    pub cached_at: DateTime<Utc>,
}

impl BuildingSnapshot {
    /// Create a snapshot stamped with the current time.
    pub fn new(
        building_id: impl Into<BuildingId>,
        floors: Vec<Floor>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            building_id: building_id.into(),
            building_name: None,
            floors,
            nodes,
            edges,
            cached_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.building_name = Some(name.into());
        self
    }

    /// Lookup a node by identifier.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Resolve a scanned QR code to the node it is mounted at.
    pub fn node_by_qr_code(&self, code: &str) -> Option<&Node> {
        let code = code.trim();
        self.nodes
            .iter()
            .find(|node| node.qr_code.as_deref() == Some(code))
    }

    /// Whether the snapshot was cached longer than `max_age` before `now`.
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.cached_at);
        match age.to_std() {
            Ok(age) => age > max_age,
            // cached_at lies in the future
            Err(_) => false,
        }
    }

    /// Build id-keyed lookups over the snapshot's nodes and floors.
    pub fn index(&self) -> SnapshotIndex<'_> {
        SnapshotIndex::new(&self.nodes, &self.floors)
    }
}

/// Borrowed id-keyed views over a snapshot, built once per route computation.
#[derive(Debug, Clone, Default)]
pub struct SnapshotIndex<'a> {
    nodes: HashMap<&'a str, &'a Node>,
    floors: HashMap<&'a str, &'a Floor>,
}

impl<'a> SnapshotIndex<'a> {
    pub fn new(nodes: &'a [Node], floors: &'a [Floor]) -> Self {
        Self {
            nodes: nodes.iter().map(|node| (node.id.as_str(), node)).collect(),
            floors: floors.iter().map(|floor| (floor.id.as_str(), floor)).collect(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    pub fn floor(&self, id: &str) -> Option<&'a Floor> {
        self.floors.get(id).copied()
    }

    /// Display name of a floor, when the floor is known and named.
    pub fn floor_name(&self, id: &str) -> Option<&'a str> {
        self.floor(id).and_then(|floor| floor.name.as_deref())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_accepts_names_and_codes() {
        let parsed: Vec<NodeType> =
            serde_json::from_str(r#"["Room", "information_desk", "InformationDesk", 2, 99, "?"]"#)
                .expect("node types parse");
        assert_eq!(
            parsed,
            vec![
                NodeType::Room,
                NodeType::InformationDesk,
                NodeType::InformationDesk,
                NodeType::Elevator,
                NodeType::Unknown,
                NodeType::Unknown,
            ]
        );
    }

    #[test]
    fn node_type_serializes_snake_case() {
        let json = serde_json::to_string(&NodeType::InformationDesk).expect("serialize");
        assert_eq!(json, "\"information_desk\"");
    }

    #[test]
    fn edge_accessibility_defaults_follow_edge_type() {
        let edges: Vec<Edge> = serde_json::from_str(
            r#"[
                {"id": "e1", "a": "n1", "b": "n2"},
                {"id": "e2", "nodeA": "n2", "nodeB": "n3", "edgeType": "STAIRS"},
                {"id": "e3", "fromNodeId": "n3", "toNodeId": "n4", "edgeType": "stairs", "isAccessible": true}
            ]"#,
        )
        .expect("edges parse");

        assert!(edges[0].is_accessible);
        assert_eq!(edges[0].edge_type, EdgeType::Walking);
        assert!(!edges[1].is_accessible);
        assert_eq!(edges[1].a, "n2");
        assert!(edges[2].is_accessible);
        assert_eq!(edges[2].b, "n4");
    }

    #[test]
    fn explicit_weight_ignores_non_positive_values() {
        assert_eq!(Edge::new("e", "a", "b").explicit_weight(), None);
        assert_eq!(Edge::new("e", "a", "b").with_weight(0.0).explicit_weight(), None);
        assert_eq!(Edge::new("e", "a", "b").with_weight(-2.0).explicit_weight(), None);
        assert_eq!(Edge::new("e", "a", "b").with_weight(4.0).explicit_weight(), Some(4.0));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let node = Node::new("n-1", 0.0, 0.0, "F1");
        assert_eq!(node.display_name(), "n-1");
        assert_eq!(node.with_name("Lobby").display_name(), "Lobby");
    }

    #[test]
    fn qr_lookup_trims_input() {
        let snapshot = BuildingSnapshot::new(
            "b1",
            Vec::new(),
            vec![Node::new("n1", 0.0, 0.0, "F1").with_qr_code("QR-1")],
            Vec::new(),
        );
        assert_eq!(
            snapshot.node_by_qr_code(" QR-1\n").map(|n| n.id.as_str()),
            Some("n1")
        );
        assert!(snapshot.node_by_qr_code("QR-2").is_none());
    }

    #[test]
    fn staleness_compares_against_max_age() {
        let mut snapshot = BuildingSnapshot::new("b1", Vec::new(), Vec::new(), Vec::new());
        let now = Utc::now();
        snapshot.cached_at = now - chrono::Duration::hours(2);

        assert!(snapshot.is_stale(Duration::from_secs(3600), now));
        assert!(!snapshot.is_stale(Duration::from_secs(3 * 3600), now));
    }

    #[test]
    fn index_resolves_floor_names() {
        let floors = vec![Floor::new("F1", "Ground")];
        let nodes = vec![Node::new("n1", 0.0, 0.0, "F1")];
        let index = SnapshotIndex::new(&nodes, &floors);

        assert_eq!(index.floor_name("F1"), Some("Ground"));
        assert_eq!(index.floor_name("F9"), None);
        assert_eq!(index.node("n1").map(|n| n.x), Some(0.0));
        assert_eq!(index.node_count(), 1);
    }
}
