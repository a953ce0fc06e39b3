use thiserror::Error;

/// Convenient result alias for the wayfinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by snapshot storage and the remote route service.
///
/// None of these reach callers of [`crate::RouteProvider::route`]: a failed remote
/// attempt is recovered by the offline fallback, and unreadable snapshots are
/// reported as missing.
#[derive(Debug, Error)]
pub enum Error {
    /// No suitable cache directory could be resolved for storing snapshots.
    #[error("failed to resolve cache directories for building snapshots")]
    CacheDirsUnavailable,

    /// Raised when a building id cannot be used as a snapshot file name.
    #[error("invalid building id '{building_id}'")]
    InvalidBuildingId { building_id: String },

    /// The remote route service answered with a non-success status code.
    #[error("remote route service returned HTTP {status}")]
    RemoteStatus { status: u16 },

    /// The remote route service did not answer within the configured budget.
    #[error("remote route request timed out after {timeout_ms}ms")]
    RemoteTimeout { timeout_ms: u64 },

    /// The remote route service answered, but without a usable path.
    #[error("remote route service found no path: {message}")]
    RemoteNoPath { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for snapshot and response (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Route-level failures surfaced to callers.
///
/// "No path exists" is not an error: it is a normal [`crate::RouteResult`]
/// with `path_found == false`. These variants describe requests that could not
/// be searched at all. The type is cloneable because joined in-flight requests
/// share a single outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The start or goal node is not part of the resolved snapshot.
    #[error("unknown node id: {node_id}")]
    NodeNotFound { node_id: String },

    /// Offline fallback was needed but no snapshot is cached for the building.
    #[error("no cached snapshot available for building {building_id}")]
    SnapshotUnavailable { building_id: String },

    /// No building id was given and no cached snapshot contains the start node.
    #[error("no cached building contains node {node_id}")]
    BuildingNotResolved { node_id: String },

    /// The offline computation was cancelled before it completed.
    #[error("route calculation was cancelled")]
    Cancelled,
}

impl RouteError {
    /// Whether the failure stems from missing local data rather than bad input.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            RouteError::SnapshotUnavailable { .. } | RouteError::BuildingNotResolved { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_error_messages_name_the_subject() {
        let err = RouteError::NodeNotFound {
            node_id: "room-101".to_string(),
        };
        assert_eq!(err.to_string(), "unknown node id: room-101");

        let err = RouteError::SnapshotUnavailable {
            building_id: "hq".to_string(),
        };
        assert!(err.to_string().contains("hq"));
        assert!(err.is_missing_data());
    }

    #[test]
    fn node_not_found_is_not_missing_data() {
        let err = RouteError::NodeNotFound {
            node_id: "x".to_string(),
        };
        assert!(!err.is_missing_data());
    }
}
