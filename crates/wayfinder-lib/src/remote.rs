//! Client side of the live route service.
//!
//! The provider treats the service as an optional, fallible accelerator:
//! anything other than a usable path is reported as an [`Error`] and the
//! provider falls back to the local engine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{BuildingId, NodeId};
use crate::output::RouteResult;
use crate::routing::RouteRequest;

const ROUTE_ENDPOINT: &str = "api/routes/calculate";

/// Request body understood by the route service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    pub start_node_id: NodeId,
    pub end_node_id: NodeId,
    pub require_accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_id: Option<BuildingId>,
}

impl From<&RouteRequest> for RouteQuery {
    fn from(request: &RouteRequest) -> Self {
        Self {
            start_node_id: request.start.clone(),
            end_node_id: request.goal.clone(),
            require_accessible: request.require_accessible,
            building_id: request.building_id.clone(),
        }
    }
}

/// A source of routes computed somewhere other than this process.
#[async_trait]
pub trait RemoteRouteSource: Send + Sync {
    /// Ask the remote side for a route.
    ///
    /// Implementations return the service's answer verbatim; the provider
    /// validates and normalizes it.
    async fn calculate(&self, query: &RouteQuery) -> Result<RouteResult>;
}

/// [`RemoteRouteSource`] speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRouteSource {
    client: Client,
    endpoint: String,
}

impl HttpRouteSource {
    /// Create a client for the service rooted at `base_url`.
    ///
    /// `timeout` bounds each request at the transport level; the provider
    /// applies its own budget on top.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("wayfinder/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint_url(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteRouteSource for HttpRouteSource {
    async fn calculate(&self, query: &RouteQuery) -> Result<RouteResult> {
        debug!(endpoint = %self.endpoint, start = %query.start_node_id, goal = %query.end_node_id, "requesting remote route");

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<RouteResult>().await?)
    }
}

/// Validate and normalize a remote answer.
///
/// A business-level "no path" is treated like any other remote failure so the
/// local engine gets a chance with the cached snapshot.
pub(crate) fn accept_remote_result(result: RouteResult, walking_speed: f64) -> Result<RouteResult> {
    let result = result.normalized(walking_speed);
    if result.path_found() {
        Ok(result)
    } else {
        Err(Error::RemoteNoPath {
            message: result
                .error_message()
                .unwrap_or_default()
                .to_string(),
        })
    }
}

fn endpoint_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), ROUTE_ENDPOINT)
}
