mod common;

use wayfinder_lib::{
    plan_route, BuildingSnapshot, Edge, EngineConfig, Node, NodeType, RouteAlgorithm,
    RouteError, RouteRenderMode, RouteRequest, NO_PATH_MESSAGE,
};

use common::{sample_building, three_node_floor, three_node_floor_blocked, two_floor_building};

fn plan(snapshot: &BuildingSnapshot, request: RouteRequest) -> wayfinder_lib::RouteResult {
    plan_route(snapshot, &request, &EngineConfig::default()).expect("endpoints exist")
}

#[test]
fn simple_same_floor_route() {
    let result = plan(&three_node_floor(), RouteRequest::new("A", "C"));

    assert!(result.path_found());
    assert_eq!(result.node_ids(), vec!["A", "B", "C"]);
    assert_eq!(result.total_distance(), 7.0);
    assert_eq!(result.estimated_time_seconds(), 7.0);
    assert_eq!(result.estimated_time_minutes(), 1);
    assert_eq!(
        result.instructions(),
        ["Start at A", "Continue to B", "Arrive at destination: C"]
    );
    assert!(result.error_message().is_none());
}

#[test]
fn accessibility_filter_blocks_only_route() {
    let snapshot = three_node_floor_blocked();

    let result = plan(&snapshot, RouteRequest::new("A", "C").accessible(true));
    assert!(!result.path_found());
    assert_eq!(result.error_message(), Some(NO_PATH_MESSAGE));
    assert!(result.path().is_empty());
    assert_eq!(result.total_distance(), 0.0);

    let unrestricted = plan(&snapshot, RouteRequest::new("A", "C"));
    assert!(unrestricted.path_found());
}

#[test]
fn cross_floor_step_is_announced_and_penalised() {
    let result = plan(&two_floor_building(), RouteRequest::new("A", "D"));

    assert_eq!(result.node_ids(), vec!["A", "B", "C", "D"]);
    let last = result.path().last().expect("step for D");
    assert_eq!(last.instruction, "Take elevator/stairs to D");
    assert_eq!(last.distance_from_previous, 1000.0);
    assert_eq!(last.floor_name.as_deref(), Some("Upper"));
    assert_eq!(result.total_distance(), 1007.0);
    assert_eq!(result.estimated_time_minutes(), 17);
}

#[test]
fn single_node_route_starts_and_ends_in_place() {
    let result = plan(&three_node_floor(), RouteRequest::new("B", "B"));

    assert!(result.path_found());
    assert_eq!(result.node_ids(), vec!["B"]);
    assert_eq!(result.total_distance(), 0.0);
    assert_eq!(result.estimated_time_minutes(), 0);
    assert_eq!(result.instructions(), ["Start at B"]);
}

#[test]
fn unknown_nodes_fail_before_search() {
    let err = plan_route(
        &three_node_floor(),
        &RouteRequest::new("A", "Z"),
        &EngineConfig::default(),
    )
    .expect_err("Z is not in the snapshot");
    assert_eq!(
        err,
        RouteError::NodeNotFound {
            node_id: "Z".to_string()
        }
    );
}

#[test]
fn repeated_calls_are_identical() {
    let building = sample_building();
    let first = plan(&building, RouteRequest::new("entrance", "room-201"));
    let second = plan(&building, RouteRequest::new("entrance", "room-201"));

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
}

#[test]
fn total_distance_matches_step_sum() {
    let building = sample_building();
    for (start, goal) in [
        ("entrance", "room-201"),
        ("restroom-1", "hall-2"),
        ("room-201", "lobby"),
    ] {
        let result = plan(&building, RouteRequest::new(start, goal));
        assert!(result.path_found(), "{start} -> {goal}");
        let sum: f64 = result
            .path()
            .iter()
            .skip(1)
            .map(|step| step.distance_from_previous)
            .sum();
        assert!((result.total_distance() - sum).abs() < 1e-9);
        assert_eq!(result.path()[0].distance_from_previous, 0.0);
    }
}

#[test]
fn accessible_routes_avoid_inaccessible_edges() {
    let building = sample_building();
    let request = RouteRequest::new("entrance", "room-201").accessible(true);
    let result = plan(&building, request.clone());

    assert_eq!(
        result.node_ids(),
        vec!["entrance", "lobby", "lift-1", "lift-2", "hall-2", "room-201"]
    );
    for pair in result.path().windows(2) {
        let traversable = building.edges.iter().any(|edge| {
            edge.is_accessible
                && ((edge.a == pair[0].node_id && edge.b == pair[1].node_id)
                    || (edge.b == pair[0].node_id && edge.a == pair[1].node_id))
        });
        assert!(traversable, "{} -> {}", pair[0].node_id, pair[1].node_id);
    }

    let mut pruned = building.clone();
    pruned.edges.retain(|edge| edge.is_accessible);
    assert_eq!(plan(&pruned, request), result);
}

#[test]
fn unrestricted_route_takes_the_stairs() {
    let result = plan(&sample_building(), RouteRequest::new("entrance", "room-201"));

    assert_eq!(
        result.node_ids(),
        vec!["entrance", "lobby", "stairs-1", "stairs-2", "hall-2", "room-201"]
    );
    assert_eq!(result.path()[3].instruction, "Take elevator/stairs to Stairwell A");
    assert_eq!(result.path()[3].node_type, NodeType::Stairs);
    assert_eq!(result.path()[0].floor_name.as_deref(), Some("Ground Floor"));
    assert_eq!(result.path()[5].floor_name.as_deref(), Some("First Floor"));
    assert_eq!(result.total_distance(), 1040.0);
    assert_eq!(result.estimated_time_minutes(), 18);
}

#[test]
fn dijkstra_agrees_on_sample_building() {
    let building = sample_building();
    let astar = plan(&building, RouteRequest::new("entrance", "room-201"));
    let dijkstra = plan(
        &building,
        RouteRequest::new("entrance", "room-201").with_algorithm(RouteAlgorithm::Dijkstra),
    );
    assert_eq!(astar.node_ids(), dijkstra.node_ids());
}

#[test]
fn unreachable_nodes_are_unreachable_both_ways() {
    let snapshot = BuildingSnapshot::new(
        "islands",
        Vec::new(),
        vec![
            Node::new("a", 0.0, 0.0, "F1"),
            Node::new("b", 1.0, 0.0, "F1"),
            Node::new("x", 5.0, 5.0, "F1"),
            Node::new("y", 6.0, 5.0, "F1"),
        ],
        vec![Edge::new("ab", "a", "b"), Edge::new("xy", "x", "y")],
    );

    for algorithm in [RouteAlgorithm::AStar, RouteAlgorithm::Dijkstra] {
        let forward = plan(&snapshot, RouteRequest::new("a", "y").with_algorithm(algorithm));
        let backward = plan(&snapshot, RouteRequest::new("y", "a").with_algorithm(algorithm));
        assert!(!forward.path_found());
        assert!(!backward.path_found());
    }
}

#[test]
fn corridor_points_follow_travel_direction() {
    let result = plan(&sample_building(), RouteRequest::new("entrance", "restroom-1"));
    let step = result.path().last().expect("restroom step");
    let points = step.corridor_points.as_ref().expect("corridor geometry");
    assert_eq!((points[0].x, points[0].y), (10.0, 0.0));
    assert_eq!((points[2].x, points[2].y), (10.0, -8.0));

    let back = plan(&sample_building(), RouteRequest::new("restroom-1", "entrance"));
    let points = back.path()[1]
        .corridor_points
        .as_ref()
        .expect("reversed geometry");
    assert_eq!((points[0].x, points[0].y), (10.0, -8.0));
}

#[test]
fn rendered_route_lists_every_step() {
    let result = plan(&three_node_floor(), RouteRequest::new("A", "C"));

    let text = result.render(RouteRenderMode::PlainText);
    assert!(text.starts_with("Route: A -> C (7.0 units, ~1 min)"));
    assert!(text.contains("Arrive at destination: C"));

    let numbered = result.render(RouteRenderMode::Instructions);
    assert_eq!(
        numbered.lines().collect::<Vec<_>>(),
        vec!["1. Start at A", "2. Continue to B", "3. Arrive at destination: C"]
    );
}

#[test]
fn slower_walking_speed_stretches_time_estimates() {
    let config = EngineConfig::default().with_walking_speed(0.5);
    let result = plan_route(&three_node_floor(), &RouteRequest::new("A", "C"), &config)
        .expect("route");
    assert_eq!(result.total_distance(), 7.0);
    assert_eq!(result.estimated_time_seconds(), 14.0);
}
