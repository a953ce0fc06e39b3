//! Output formatting for route and building listings.
//!
//! Text formats are written for people at a terminal; `json` emits a single
//! document on stdout so the tool can be scripted.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use wayfinder_lib::{RouteOutcome, RouteRenderMode, RouteResult, RouteSource};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Summary line followed by one line per step.
    #[default]
    Text,
    /// Numbered walking instructions only.
    Steps,
    /// JSON document.
    Json,
}

/// JSON shape of a route: the normalized result plus where it came from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteReport<'a> {
    source: RouteSource,
    #[serde(flatten)]
    result: &'a RouteResult,
}

/// One row of the `buildings` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSummary {
    pub building_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    pub floors: usize,
    pub nodes: usize,
    pub edges: usize,
    pub cached_at: String,
}

impl OutputFormat {
    /// Write a computed route to stdout.
    pub fn render_route(self, outcome: &RouteOutcome) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_route(&mut handle, outcome)?;
        handle.flush()?;
        Ok(())
    }

    pub fn write_route<W: Write>(self, out: &mut W, outcome: &RouteOutcome) -> Result<()> {
        match self {
            OutputFormat::Text => {
                write!(out, "{}", outcome.result.render(RouteRenderMode::PlainText))?;
                if outcome.result.path_found() {
                    writeln!(out, "source: {}", outcome.source)?;
                }
            }
            OutputFormat::Steps => {
                if outcome.result.path_found() {
                    write!(out, "{}", outcome.result.render(RouteRenderMode::Instructions))?;
                } else {
                    write!(out, "{}", outcome.result.render(RouteRenderMode::PlainText))?;
                }
            }
            OutputFormat::Json => {
                let report = RouteReport {
                    source: outcome.source,
                    result: &outcome.result,
                };
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// Write the cached building listing to stdout.
    pub fn render_buildings(self, buildings: &[BuildingSummary]) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_buildings(&mut handle, buildings)?;
        handle.flush()?;
        Ok(())
    }

    pub fn write_buildings<W: Write>(self, out: &mut W, buildings: &[BuildingSummary]) -> Result<()> {
        if self == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *out, buildings)?;
            writeln!(out)?;
            return Ok(());
        }

        if buildings.is_empty() {
            writeln!(out, "No cached buildings.")?;
            return Ok(());
        }

        writeln!(out, "Cached buildings ({}):", buildings.len())?;
        writeln!(
            out,
            "{:<20} {:<24} {:>6} {:>6} {:>6}  {}",
            "ID", "Name", "Floors", "Nodes", "Edges", "Cached at"
        )?;
        for building in buildings {
            writeln!(
                out,
                "{:<20} {:<24} {:>6} {:>6} {:>6}  {}",
                building.building_id,
                building.building_name.as_deref().unwrap_or("-"),
                building.floors,
                building.nodes,
                building.edges,
                building.cached_at
            )?;
        }
        Ok(())
    }
}
