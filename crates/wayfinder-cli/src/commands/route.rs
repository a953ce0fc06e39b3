//! Route command handler for computing walking routes inside a building.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use wayfinder_lib::{
    EngineConfig, FileSnapshotStore, NetworkStatus, ProviderConfig, RouteAlgorithm, RouteError,
    RouteProvider, RouteRequest, SnapshotProvider,
};
use wayfinder_cli::output::OutputFormat;

/// Arguments for the route command.
#[derive(Args, Debug, Clone)]
pub struct RouteCommandArgs {
    /// Starting node id.
    #[arg(long = "from", required_unless_present = "from_qr", conflicts_with = "from_qr")]
    pub from: Option<String>,
    /// Starting point given as a scanned QR code.
    #[arg(long = "from-qr")]
    pub from_qr: Option<String>,
    /// Destination node id.
    #[arg(long = "to")]
    pub to: String,
    /// Building to search; resolved from the starting node when omitted.
    #[arg(long)]
    pub building: Option<String>,
    /// Only use step-free connections.
    #[arg(long)]
    pub accessible: bool,
    /// Search algorithm for local planning.
    #[arg(long, default_value_t = RouteAlgorithm::AStar)]
    pub algorithm: RouteAlgorithm,
    /// Skip the route service and plan from the local cache only.
    #[arg(long)]
    pub offline: bool,
    /// Base URL of the route service (overrides WAYFINDER_API_URL).
    #[arg(long)]
    pub api_url: Option<String>,
}

impl RouteCommandArgs {
    fn provider_config(&self) -> ProviderConfig {
        let config = ProviderConfig::from_env();
        match &self.api_url {
            Some(url) => config.with_api_base_url(url.clone()),
            None => config,
        }
    }
}

/// Handle the route subcommand.
///
/// Resolves the starting node, then asks the provider for a route, which
/// tries the route service first (unless `--offline`) and falls back to the
/// cached snapshot.
pub async fn handle_route_command(
    store: FileSnapshotStore,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let (start, building) = resolve_start(&store, args)?;

    let mut request = RouteRequest::new(start, args.to.clone())
        .accessible(args.accessible)
        .with_algorithm(args.algorithm);
    if let Some(building) = building {
        request = request.in_building(building);
    }

    let network = if args.offline {
        NetworkStatus::Offline
    } else {
        NetworkStatus::Unknown
    };
    let provider = RouteProvider::builder(Arc::new(store))
        .with_engine_config(EngineConfig::from_env())
        .with_config(args.provider_config())
        .with_network_status(network)
        .build()
        .context("failed to configure route provider")?;

    let outcome = match provider.route(request.clone()).await {
        Ok(outcome) => outcome,
        Err(err) => return Err(handle_route_failure(err)),
    };

    format.render_route(&outcome)?;

    if !outcome.result.path_found() {
        return Err(anyhow::anyhow!(format_route_not_found_message(&request)));
    }
    Ok(())
}

/// Resolve `--from`/`--from-qr` into a node id and, when known, its building.
fn resolve_start(
    store: &FileSnapshotStore,
    args: &RouteCommandArgs,
) -> Result<(String, Option<String>)> {
    if let Some(from) = &args.from {
        return Ok((from.clone(), args.building.clone()));
    }

    let code = args
        .from_qr
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("either --from or --from-qr is required"))?;

    let candidates = match &args.building {
        Some(building) => vec![building.clone()],
        None => store.list().context("failed to list cached buildings")?,
    };

    for building_id in candidates {
        let Some(snapshot) = store.get_cached_building(&building_id) else {
            continue;
        };
        if let Some(node) = snapshot.node_by_qr_code(code) {
            return Ok((node.id.clone(), Some(building_id)));
        }
    }

    Err(anyhow::anyhow!(
        "QR code '{}' does not match any node in the cached buildings.",
        code.trim()
    ))
}

fn handle_route_failure(err: RouteError) -> anyhow::Error {
    match err {
        RouteError::NodeNotFound { node_id } => {
            anyhow::anyhow!("Unknown node '{node_id}' in the selected building.")
        }
        RouteError::SnapshotUnavailable { building_id } => anyhow::anyhow!(
            "Could not calculate route: no cached map for building '{building_id}'. Import one with `wayfinder import <FILE>`."
        ),
        RouteError::BuildingNotResolved { node_id } => anyhow::anyhow!(
            "Could not calculate route: no cached building contains node '{node_id}'. Pass --building or import the building map."
        ),
        other => anyhow::Error::new(other).context("Could not calculate route"),
    }
}

fn format_route_not_found_message(request: &RouteRequest) -> String {
    let mut message = format!("No route found between {} and {}.", request.start, request.goal);
    if request.require_accessible {
        message.push_str(" Try without --accessible if stairs are acceptable.");
    }
    message
}
