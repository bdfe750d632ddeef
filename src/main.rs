mod load;
mod replay;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use canvas::camera::{Camera, Point};
use canvas::config::{CanvasConfig, ConfigError};
use canvas::doc::Bounds;
use canvas::engine::EngineCore;
use canvas::ingest::{self, EntityRecord, SkippedRecord};
use canvas::selection::SelectionEngine;
use canvas::shape::Shape;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use crate::load::LoadError;
use crate::replay::HostEvent;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid --bbox {0:?}: expected min_x,min_y,max_x,max_y")]
    InvalidBbox(String),
}

#[derive(Parser, Debug)]
#[command(name = "draftboard", about = "Inspect, query and replay CAD entity sets")]
struct Cli {
    /// JSON file with canvas settings; defaults to CANVAS_* environment variables.
    #[arg(long, env = "DRAFTBOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize an entity file: kinds, skipped records, overall extent.
    Inspect { file: PathBuf },
    /// List entities whose boxes intersect a world-space rectangle.
    Query {
        file: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        bbox: String,
    },
    /// Report the best hit at a world-space point.
    Hit {
        file: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        /// Search radius in world units; defaults to the configured pixel slop
        /// converted at the unzoomed scale.
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Drive a JSON-lines event script through the interaction engine.
    Replay { file: PathBuf, script: PathBuf },
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        tracing::error!(%error, "draftboard failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "canvas config");

    match cli.command {
        Command::Inspect { file } => inspect(&config, &file),
        Command::Query { file, bbox } => query(&config, &file, &bbox),
        Command::Hit { file, x, y, radius } => hit(&config, &file, x, y, radius),
        Command::Replay { file, script } => run_replay(config, &file, &script),
    }
}

fn load_config(path: Option<&Path>) -> Result<CanvasConfig, CliError> {
    let Some(path) = path else {
        return Ok(CanvasConfig::from_env()?);
    };
    let config: CanvasConfig = serde_json::from_str(&load::read_to_string(path)?)?;
    config.validate()?;
    Ok(config)
}

fn load_records(file: &Path) -> Result<ingest::Decoded, CliError> {
    let records: Vec<EntityRecord> = load::parse_array_or_lines(&load::read_to_string(file)?)?;
    let decoded = ingest::decode_all(&records);
    tracing::info!(file = %file.display(), entities = decoded.entities.len(), skipped = decoded.skipped.len(), "entities loaded");
    Ok(decoded)
}

fn load_engine(config: &CanvasConfig, file: &Path) -> Result<(SelectionEngine<Shape>, Vec<SkippedRecord>), CliError> {
    let decoded = load_records(file)?;
    let mut engine = SelectionEngine::new(config.cell_size);
    engine.register_entities(decoded.entities);
    Ok((engine, decoded.skipped))
}

fn inspect(config: &CanvasConfig, file: &Path) -> Result<(), CliError> {
    let (engine, skipped) = load_engine(config, file)?;

    let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
    let mut extent: Option<Bounds> = None;
    for entity in engine.entities() {
        *kinds.entry(entity.payload.kind().to_string()).or_default() += 1;
        extent = Some(extent.map_or(entity.bounds, |b| b.union(&entity.bounds)));
    }
    let skipped: Vec<Value> =
        skipped.iter().map(|s| json!({ "id": s.id, "error": s.error.to_string() })).collect();

    print_json(&json!({
        "entities": engine.len(),
        "kinds": kinds,
        "layers": engine.layers(),
        "skipped": skipped,
        "bounds": extent,
        "cell_size": engine.index().cell_size(),
        "occupied_cells": engine.index().occupied_cells(),
    }))
}

fn query(config: &CanvasConfig, file: &Path, bbox: &str) -> Result<(), CliError> {
    let bounds = parse_bbox(bbox)?;
    let (engine, _) = load_engine(config, file)?;
    let ids: Vec<_> = engine.entities_in(&bounds).iter().map(|e| e.id).collect();
    print_json(&json!({ "bbox": bounds, "count": ids.len(), "ids": ids }))
}

fn hit(config: &CanvasConfig, file: &Path, x: f64, y: f64, radius: Option<f64>) -> Result<(), CliError> {
    let (engine, _) = load_engine(config, file)?;
    let radius = radius.unwrap_or_else(|| default_hit_radius(config));
    let result = engine.hit_test(Point::new(x, y), radius).map(|hit| {
        let kind = engine.entity(hit.id).map(|e| e.payload.kind().to_string());
        json!({ "id": hit.id, "kind": kind, "distance": hit.distance, "area": hit.area })
    });
    print_json(&json!({ "x": x, "y": y, "radius": radius, "hit": result }))
}

/// World radius of the configured pixel slop on an unzoomed view. Scale 1,
/// unless the configured limits exclude it.
fn default_hit_radius(config: &CanvasConfig) -> f64 {
    Camera::new(config.min_scale, config.max_scale).screen_dist_to_world(config.hit_radius_px)
}

fn run_replay(config: CanvasConfig, file: &Path, script: &Path) -> Result<(), CliError> {
    let decoded = load_records(file)?;
    let events: Vec<HostEvent> = load::parse_lines(&load::read_to_string(script)?)?;

    let mut core = EngineCore::new(config);
    core.load_entities(decoded.entities);
    for step in replay::replay(&mut core, &events) {
        println!("{}", serde_json::to_string(&step)?);
    }
    tracing::info!(events = events.len(), entities = core.selection.len(), "replay finished");
    Ok(())
}

fn parse_bbox(raw: &str) -> Result<Bounds, CliError> {
    let invalid = || CliError::InvalidBbox(raw.to_owned());
    let parts = raw.split(',').map(|p| p.trim().parse::<f64>().map_err(|_| invalid())).collect::<Result<Vec<_>, _>>()?;
    let [a, b, c, d] = parts.as_slice() else {
        return Err(invalid());
    };
    let bounds = Bounds::new(a.min(*c), b.min(*d), a.max(*c), b.max(*d));
    if bounds.is_finite() { Ok(bounds) } else { Err(invalid()) }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
