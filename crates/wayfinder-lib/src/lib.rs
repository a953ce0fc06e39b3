//! Wayfinder library entry points.
//!
//! This crate models indoor building maps, plans step-by-step routes over
//! them with an accessibility-aware, floor-aware A* search, and orchestrates
//! online/offline route calculation against a live route service and a local
//! snapshot cache. Higher-level consumers (CLI, app shells) should only depend
//! on the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod assembler;
pub mod config;
pub mod distance;
pub mod error;
pub mod graph;
pub mod model;
pub mod output;
pub mod path;
pub mod provider;
pub mod remote;
pub mod routing;
pub mod snapshot;

pub use config::{EngineConfig, ProviderConfig, FLOOR_PENALTY, WALKING_SPEED};
pub use distance::{distance, distance_with_config};
pub use error::{Error, Result, RouteError};
pub use graph::{build_graph, Graph, Link};
pub use model::{
    BuildingId, BuildingSnapshot, Edge, EdgeType, Floor, FloorId, Node, NodeId, NodeType, Point,
    SnapshotIndex,
};
pub use output::{RouteNode, RouteRenderMode, RouteResult, NO_PATH_MESSAGE};
pub use path::{find_route_a_star, find_route_dijkstra};
pub use provider::{
    NetworkStatus, RouteOutcome, RouteProvider, RouteProviderBuilder, RouteSource,
};
pub use remote::{HttpRouteSource, RemoteRouteSource, RouteQuery};
pub use routing::{plan_route, RouteAlgorithm, RoutePlanner, RouteRequest};
pub use snapshot::{default_cache_dir, FileSnapshotStore, InMemorySnapshots, SnapshotProvider};
