//! Online/offline route orchestration.
//!
//! [`RouteProvider`] answers route requests from the live route service when
//! it can and from a cached building snapshot when it cannot. Each request
//! moves through an explicit state machine:
//!
//! ```text
//! OnlineAttempt ──ok──────────────────────────────▶ Success (remote)
//!      │ error / timeout / no path
//!      ▼
//! OfflineFallback ──ok────────────────────────────▶ Success (local)
//!      │ no snapshot / unknown node
//!      ▼
//! Failure (RouteError)
//! ```
//!
//! Requests start in `OfflineFallback` when no remote source is configured or
//! the network is known to be down. Identical requests issued while one is
//! still running join the running computation instead of starting another.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, ProviderConfig};
use crate::error::{Error, Result, RouteError};
use crate::output::RouteResult;
use crate::remote::{accept_remote_result, HttpRouteSource, RemoteRouteSource, RouteQuery};
use crate::routing::{plan_route, RouteRequest};
use crate::snapshot::SnapshotProvider;

/// What the host currently knows about network reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl NetworkStatus {
    fn to_u8(self) -> u8 {
        match self {
            NetworkStatus::Unknown => 0,
            NetworkStatus::Online => 1,
            NetworkStatus::Offline => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => NetworkStatus::Online,
            2 => NetworkStatus::Offline,
            _ => NetworkStatus::Unknown,
        }
    }
}

/// Which path produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Remote,
    Local,
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteSource::Remote => "remote",
            RouteSource::Local => "local",
        })
    }
}

/// A route together with the source that computed it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub result: RouteResult,
    pub source: RouteSource,
}

enum ProviderState {
    OnlineAttempt(Arc<dyn RemoteRouteSource>),
    OfflineFallback,
}

type SharedRoute = Shared<BoxFuture<'static, std::result::Result<RouteOutcome, RouteError>>>;

/// A running computation and the number of callers awaiting it.
struct InFlight {
    future: SharedRoute,
    waiters: usize,
}

/// Route entry point for UI code.
///
/// Cheap to clone; clones share configuration, connectivity state, and the
/// in-flight request table.
#[derive(Clone)]
pub struct RouteProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    snapshots: Arc<dyn SnapshotProvider>,
    remote: Option<Arc<dyn RemoteRouteSource>>,
    network: AtomicU8,
    engine: EngineConfig,
    config: ProviderConfig,
    in_flight: Mutex<HashMap<RouteRequest, InFlight>>,
}

/// Builder for [`RouteProvider`].
pub struct RouteProviderBuilder {
    snapshots: Arc<dyn SnapshotProvider>,
    remote: Option<Arc<dyn RemoteRouteSource>>,
    engine: EngineConfig,
    config: ProviderConfig,
    network: NetworkStatus,
}

impl RouteProviderBuilder {
    /// Use an explicit remote source instead of one derived from `api_base_url`.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteRouteSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_network_status(mut self, status: NetworkStatus) -> Self {
        self.network = status;
        self
    }

    /// Build the provider, creating an HTTP source when only a base URL is configured.
    pub fn build(self) -> Result<RouteProvider> {
        let remote = match (self.remote, self.config.api_base_url.as_deref()) {
            (Some(remote), _) => Some(remote),
            (None, Some(url)) => {
                let source = HttpRouteSource::new(url, self.config.remote_timeout)?;
                debug!(endpoint = %source.endpoint(), "configured remote route source");
                Some(Arc::new(source) as Arc<dyn RemoteRouteSource>)
            }
            (None, None) => None,
        };

        Ok(RouteProvider {
            inner: Arc::new(ProviderInner {
                snapshots: self.snapshots,
                remote,
                network: AtomicU8::new(self.network.to_u8()),
                engine: self.engine,
                config: self.config,
                in_flight: Mutex::new(HashMap::new()),
            }),
        })
    }
}

impl RouteProvider {
    /// Start building a provider over the given snapshot cache.
    pub fn builder(snapshots: Arc<dyn SnapshotProvider>) -> RouteProviderBuilder {
        RouteProviderBuilder {
            snapshots,
            remote: None,
            engine: EngineConfig::default(),
            config: ProviderConfig::default(),
            network: NetworkStatus::Unknown,
        }
    }

    /// Offline-only provider with default configuration.
    pub fn offline(snapshots: Arc<dyn SnapshotProvider>) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                snapshots,
                remote: None,
                network: AtomicU8::new(NetworkStatus::Offline.to_u8()),
                engine: EngineConfig::default(),
                config: ProviderConfig::default(),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn network_status(&self) -> NetworkStatus {
        NetworkStatus::from_u8(self.inner.network.load(Ordering::Acquire))
    }

    /// Record a reachability change reported by the host platform.
    pub fn set_network_status(&self, status: NetworkStatus) {
        let previous = NetworkStatus::from_u8(self.inner.network.swap(status.to_u8(), Ordering::AcqRel));
        if previous != status {
            info!(?previous, current = ?status, "network status changed");
        }
    }

    pub fn has_remote(&self) -> bool {
        self.inner.remote.is_some()
    }

    /// Number of distinct requests currently being computed.
    pub fn in_flight(&self) -> usize {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Calculate a route, preferring the live service and falling back to the cache.
    ///
    /// Fails only when neither source can answer; an unreachable goal is a
    /// normal result with `path_found() == false`.
    pub async fn calculate_route(
        &self,
        start: &str,
        end: &str,
        require_accessible: bool,
        building_id: Option<&str>,
    ) -> std::result::Result<RouteResult, RouteError> {
        let mut request = RouteRequest::new(start, end).accessible(require_accessible);
        if let Some(building_id) = building_id {
            request = request.in_building(building_id);
        }
        self.route(request).await.map(|outcome| outcome.result)
    }

    /// Calculate a route for a full request, reporting which source answered.
    pub async fn route(
        &self,
        request: RouteRequest,
    ) -> std::result::Result<RouteOutcome, RouteError> {
        let future = self.join_or_start(&request);
        let guard = InFlightGuard {
            inner: &*self.inner,
            request,
            future: future.clone(),
        };
        let outcome = future.await;
        drop(guard);
        outcome
    }

    fn join_or_start(&self, request: &RouteRequest) -> SharedRoute {
        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = in_flight.get_mut(request) {
            debug!(start = %request.start, goal = %request.goal, "joining in-flight route request");
            existing.waiters += 1;
            return existing.future.clone();
        }

        let inner = Arc::clone(&self.inner);
        let owned = request.clone();
        let future = async move { inner.compute(owned).await }.boxed().shared();
        in_flight.insert(
            request.clone(),
            InFlight {
                future: future.clone(),
                waiters: 1,
            },
        );
        future
    }
}

impl fmt::Debug for RouteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteProvider")
            .field("has_remote", &self.has_remote())
            .field("network_status", &self.network_status())
            .field("engine", &self.inner.engine)
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Releases one waiter; the last one to finish or be dropped clears the table entry.
struct InFlightGuard<'a> {
    inner: &'a ProviderInner,
    request: RouteRequest,
    future: SharedRoute,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = in_flight.get_mut(&self.request) else {
            return;
        };
        if !entry.future.ptr_eq(&self.future) {
            return;
        }
        entry.waiters = entry.waiters.saturating_sub(1);
        if entry.waiters == 0 {
            in_flight.remove(&self.request);
        }
    }
}

impl ProviderInner {
    fn initial_state(&self) -> ProviderState {
        let network = NetworkStatus::from_u8(self.network.load(Ordering::Acquire));
        match &self.remote {
            Some(remote) if network != NetworkStatus::Offline => {
                ProviderState::OnlineAttempt(Arc::clone(remote))
            }
            _ => ProviderState::OfflineFallback,
        }
    }

    async fn compute(
        self: Arc<Self>,
        request: RouteRequest,
    ) -> std::result::Result<RouteOutcome, RouteError> {
        let started = Instant::now();
        let mut state = self.initial_state();

        loop {
            match state {
                ProviderState::OnlineAttempt(remote) => {
                    match self.attempt_remote(remote.as_ref(), &request).await {
                        Ok(result) => {
                            info!(
                                start = %request.start,
                                goal = %request.goal,
                                source = %RouteSource::Remote,
                                elapsed_ms = started.elapsed().as_millis() as u64,
                                "route calculated"
                            );
                            return Ok(RouteOutcome {
                                result,
                                source: RouteSource::Remote,
                            });
                        }
                        Err(err) => {
                            warn!(
                                start = %request.start,
                                goal = %request.goal,
                                error = %err,
                                "remote route failed; falling back to cached snapshot"
                            );
                            state = ProviderState::OfflineFallback;
                        }
                    }
                }
                ProviderState::OfflineFallback => {
                    let start = request.start.clone();
                    let goal = request.goal.clone();
                    let outcome = Arc::clone(&self).compute_offline(request).await;
                    match &outcome {
                        Ok(result) => info!(
                            start = %start,
                            goal = %goal,
                            source = %RouteSource::Local,
                            path_found = result.path_found(),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "route calculated"
                        ),
                        Err(err) => warn!(
                            start = %start,
                            goal = %goal,
                            error = %err,
                            "route calculation failed"
                        ),
                    }
                    return outcome.map(|result| RouteOutcome {
                        result,
                        source: RouteSource::Local,
                    });
                }
            }
        }
    }

    async fn attempt_remote(
        &self,
        remote: &dyn RemoteRouteSource,
        request: &RouteRequest,
    ) -> Result<RouteResult> {
        let query = RouteQuery::from(request);
        let budget = self.config.remote_timeout;
        let result = tokio::time::timeout(budget, remote.calculate(&query))
            .await
            .map_err(|_| Error::RemoteTimeout {
                timeout_ms: budget.as_millis() as u64,
            })??;
        accept_remote_result(result, self.engine.walking_speed)
    }

    /// Snapshot reads may touch the disk and the search is CPU-bound, so both
    /// run on the blocking pool.
    async fn compute_offline(
        self: Arc<Self>,
        request: RouteRequest,
    ) -> std::result::Result<RouteResult, RouteError> {
        match tokio::task::spawn_blocking(move || self.plan_offline(&request)).await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(RouteError::Cancelled),
        }
    }

    fn plan_offline(&self, request: &RouteRequest) -> std::result::Result<RouteResult, RouteError> {
        let building_id = match &request.building_id {
            Some(id) => id.clone(),
            None => self
                .snapshots
                .find_building_for_node(&request.start)
                .ok_or_else(|| RouteError::BuildingNotResolved {
                    node_id: request.start.clone(),
                })?,
        };

        let snapshot = self
            .snapshots
            .get_cached_building(&building_id)
            .ok_or_else(|| RouteError::SnapshotUnavailable {
                building_id: building_id.clone(),
            })?;

        if let Some(max_age) = self.config.snapshot_max_age {
            if snapshot.is_stale(max_age, Utc::now()) {
                warn!(
                    building_id = %building_id,
                    cached_at = %snapshot.cached_at,
                    "routing on a stale building snapshot"
                );
            }
        }

        plan_route(&snapshot, request, &self.engine)
    }
}
