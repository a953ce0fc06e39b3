use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::config::WALKING_SPEED;
use crate::model::{FloorId, NodeId, NodeType, Point};

/// Message reported when the search exhausts the graph without reaching the goal.
pub const NO_PATH_MESSAGE: &str = "No path found between nodes";

/// Presentation style for turning a [`RouteResult`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    /// Summary header followed by one line per step.
    PlainText,
    /// Numbered instruction list only.
    Instructions,
}

/// One annotated step of a computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    pub floor_id: FloorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_name: Option<String>,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub distance_from_previous: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corridor_points: Option<Vec<Point>>,
}

impl RouteNode {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.node_id)
    }
}

/// Normalized route outcome shared by the local engine and the remote service.
///
/// Totals, times, and the instruction list are always derived from `path`;
/// there is no way to set them independently. Decoding goes through the same
/// derivation at the default walking speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RouteResultRecord")]
pub struct RouteResult {
    path_found: bool,
    total_distance: f64,
    estimated_time_seconds: f64,
    estimated_time_minutes: u64,
    path: Vec<RouteNode>,
    instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

/// Wire shape of a route result. Only the path and outcome are trusted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteResultRecord {
    path_found: bool,
    #[serde(default)]
    path: Vec<RouteNode>,
    #[serde(default)]
    error_message: Option<String>,
}

impl From<RouteResultRecord> for RouteResult {
    fn from(record: RouteResultRecord) -> Self {
        if record.path_found {
            Self::from_path(record.path, WALKING_SPEED)
        } else {
            Self::failed(record.error_message)
        }
    }
}

impl RouteResult {
    /// Build a successful result from an annotated path.
    ///
    /// An empty path is not a route; it yields [`RouteResult::not_found`].
    /// The first step always starts the walk, so its distance is forced to zero.
    pub fn from_path(mut path: Vec<RouteNode>, walking_speed: f64) -> Self {
        let Some(first) = path.first_mut() else {
            return Self::not_found(NO_PATH_MESSAGE);
        };
        first.distance_from_previous = 0.0;

        let total_distance: f64 = path.iter().map(|step| step.distance_from_previous).sum();
        let estimated_time_seconds = if walking_speed > 0.0 {
            total_distance / walking_speed
        } else {
            0.0
        };
        let instructions = path
            .iter()
            .map(|step| step.instruction.trim())
            .filter(|instruction| !instruction.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            path_found: true,
            total_distance,
            estimated_time_seconds,
            estimated_time_minutes: (estimated_time_seconds / 60.0).ceil() as u64,
            path,
            instructions,
            error_message: None,
        }
    }

    /// A failed route carrying a human-readable reason.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            path_found: false,
            total_distance: 0.0,
            estimated_time_seconds: 0.0,
            estimated_time_minutes: 0,
            path: Vec::new(),
            instructions: Vec::new(),
            error_message: Some(message.into()),
        }
    }

    /// Re-derive every computed field from the path.
    ///
    /// Used for results decoded from the remote service so both sources obey
    /// the same invariants regardless of what the service sent.
    pub fn normalized(self, walking_speed: f64) -> Self {
        if self.path_found {
            Self::from_path(self.path, walking_speed)
        } else {
            Self::failed(self.error_message)
        }
    }

    fn failed(message: Option<String>) -> Self {
        Self::not_found(
            message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| NO_PATH_MESSAGE.to_string()),
        )
    }

    pub fn path_found(&self) -> bool {
        self.path_found
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn estimated_time_seconds(&self) -> f64 {
        self.estimated_time_seconds
    }

    pub fn estimated_time_minutes(&self) -> u64 {
        self.estimated_time_minutes
    }

    pub fn path(&self) -> &[RouteNode] {
        &self.path
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Ordered node ids along the route.
    pub fn node_ids(&self) -> Vec<&str> {
        self.path.iter().map(|step| step.node_id.as_str()).collect()
    }

    /// Render the result using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::Instructions => self.render_instructions(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        if !self.path_found {
            let _ = writeln!(
                buffer,
                "No route: {}",
                self.error_message.as_deref().unwrap_or(NO_PATH_MESSAGE)
            );
            return buffer;
        }

        let (Some(first), Some(last)) = (self.path.first(), self.path.last()) else {
            return buffer;
        };
        let _ = writeln!(
            buffer,
            "Route: {} -> {} ({:.1} units, ~{} min)",
            first.display_name(),
            last.display_name(),
            self.total_distance,
            self.estimated_time_minutes
        );

        for (index, step) in self.path.iter().enumerate() {
            let floor = step.floor_name.as_deref().unwrap_or(&step.floor_id);
            let _ = writeln!(
                buffer,
                "{:>3}: {} [{}] +{:.1}",
                index,
                step.instruction,
                floor,
                step.distance_from_previous
            );
        }
        buffer
    }

    fn render_instructions(&self) -> String {
        let mut buffer = String::new();
        for (index, instruction) in self.instructions.iter().enumerate() {
            let _ = writeln!(buffer, "{}. {}", index + 1, instruction);
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, distance: f64, instruction: &str) -> RouteNode {
        RouteNode {
            node_id: id.to_string(),
            name: Some(id.to_uppercase()),
            node_type: NodeType::Corridor,
            x: 0.0,
            y: 0.0,
            floor_id: "F1".to_string(),
            floor_name: Some("Ground".to_string()),
            instruction: instruction.to_string(),
            distance_from_previous: distance,
            corridor_points: None,
        }
    }

    #[test]
    fn totals_are_derived_from_steps() {
        let result = RouteResult::from_path(
            vec![step("a", 0.0, "Start at A"), step("b", 90.0, ""), step("c", 30.0, "Arrive at destination: C")],
            1.0,
        );

        assert!(result.path_found());
        assert_eq!(result.total_distance(), 120.0);
        assert_eq!(result.estimated_time_seconds(), 120.0);
        assert_eq!(result.estimated_time_minutes(), 2);
        assert_eq!(result.instructions().len(), 2);
        assert!(result.error_message().is_none());
    }

    #[test]
    fn minutes_round_up() {
        let result = RouteResult::from_path(vec![step("a", 0.0, "x"), step("b", 61.0, "y")], 1.0);
        assert_eq!(result.estimated_time_minutes(), 2);

        let slow = RouteResult::from_path(vec![step("a", 0.0, "x"), step("b", 61.0, "y")], 0.5);
        assert_eq!(slow.estimated_time_seconds(), 122.0);
    }

    #[test]
    fn empty_path_is_not_found() {
        let result = RouteResult::from_path(Vec::new(), 1.0);
        assert!(!result.path_found());
        assert_eq!(result.error_message(), Some(NO_PATH_MESSAGE));
        assert_eq!(result.total_distance(), 0.0);
    }

    #[test]
    fn normalized_discards_inconsistent_totals() {
        let json = r#"{
            "pathFound": true,
            "totalDistance": 999.0,
            "estimatedTimeMinutes": 42,
            "path": [
                {"nodeId": "a", "x": 0, "y": 0, "floorId": "F1", "instruction": "Start at a"},
                {"nodeId": "b", "x": 5, "y": 0, "floorId": "F1", "instruction": "Arrive at destination: b", "distanceFromPrevious": 5.0}
            ],
            "instructions": ["bogus"]
        }"#;
        let decoded: RouteResult = serde_json::from_str(json).expect("decode");
        let result = decoded.normalized(1.0);

        assert_eq!(result.total_distance(), 5.0);
        assert_eq!(result.estimated_time_minutes(), 1);
        assert_eq!(
            result.instructions(),
            ["Start at a".to_string(), "Arrive at destination: b".to_string()]
        );
    }

    #[test]
    fn decoding_derives_totals_from_path() {
        let json = r#"{
            "pathFound": true,
            "totalDistance": 999.0,
            "estimatedTimeSeconds": 3.0,
            "path": [
                {"nodeId": "a", "x": 0, "y": 0, "floorId": "F1", "instruction": "Start at a"},
                {"nodeId": "b", "x": 5, "y": 0, "floorId": "F1", "instruction": "Arrive at destination: b", "distanceFromPrevious": 5.0}
            ],
            "instructions": []
        }"#;
        let result: RouteResult = serde_json::from_str(json).expect("decode");

        let sum: f64 = result.path().iter().map(|step| step.distance_from_previous).sum();
        assert_eq!(result.total_distance(), sum);
        assert_eq!(result.total_distance(), 5.0);
        assert_eq!(result.estimated_time_seconds(), 5.0 / WALKING_SPEED);
        assert_eq!(result.instructions().len(), result.path().len());
    }

    #[test]
    fn decoding_failure_keeps_message_and_clears_path() {
        let json = r#"{"pathFound": false, "totalDistance": 12.0, "errorMessage": "closed"}"#;
        let result: RouteResult = serde_json::from_str(json).expect("decode");
        assert!(!result.path_found());
        assert_eq!(result.total_distance(), 0.0);
        assert_eq!(result.error_message(), Some("closed"));
    }

    #[test]
    fn first_step_distance_is_ignored() {
        let result = RouteResult::from_path(
            vec![step("a", 12.0, "Start at A"), step("b", 5.0, "Arrive at destination: B")],
            1.0,
        );
        assert_eq!(result.path()[0].distance_from_previous, 0.0);
        assert_eq!(result.total_distance(), 5.0);
        assert_eq!(result.estimated_time_seconds(), 5.0);

        let json = r#"{
            "pathFound": true,
            "path": [
                {"nodeId": "a", "x": 0, "y": 0, "floorId": "F1", "instruction": "Start at a", "distanceFromPrevious": 12.0},
                {"nodeId": "b", "x": 5, "y": 0, "floorId": "F1", "instruction": "Arrive at destination: b", "distanceFromPrevious": 5.0}
            ]
        }"#;
        let decoded: RouteResult = serde_json::from_str(json).expect("decode");
        assert_eq!(decoded.normalized(1.0).total_distance(), 5.0);
    }

    #[test]
    fn serializes_camel_case_without_error_on_success() {
        let result = RouteResult::from_path(vec![step("a", 0.0, "Start at A")], 1.0);
        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value["pathFound"], true);
        assert_eq!(value["path"][0]["nodeId"], "a");
        assert!(value.get("errorMessage").is_none());
    }

    #[test]
    fn renders_instruction_list() {
        let result = RouteResult::from_path(
            vec![step("a", 0.0, "Start at A"), step("b", 3.0, "Arrive at destination: B")],
            1.0,
        );
        let text = result.render(RouteRenderMode::Instructions);
        assert_eq!(text, "1. Start at A\n2. Arrive at destination: B\n");

        let plain = result.render(RouteRenderMode::PlainText);
        assert!(plain.starts_with("Route: A -> B (3.0 units, ~1 min)"));
        assert!(plain.contains("[Ground]"));
    }
}
