//! Naksha command-line entry point.
//!
//! # Usage
//!
//! ```bash
//! # Build (or rebuild) the map and print its metadata
//! naksha build --db instance/rtabmap.db
//!
//! # Reuse an existing map if present, build otherwise
//! naksha ensure --config configs/naksha.toml
//!
//! # Only run the bounds pass
//! naksha bounds --resolution 0.1 --stride 5
//! ```
//!
//! Enable per-pass logging with `RUST_LOG=debug`.

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use naksha::config::NakshaConfig;
use naksha::{BuildConfig, MapBuilder, MapCache, PoseGraphStore, export};

/// Occupancy grid builder for SLAM pose-graph stores
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the map from scratch and export it
    Build(CommonArgs),
    /// Return the existing map, building it only if missing
    Ensure(CommonArgs),
    /// Run the bounds pass and print the grid size
    Bounds(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Configuration file path (defaults to configs/naksha.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pose-graph store path (overrides config and DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    out: Option<String>,

    /// Cell size in meters
    #[arg(short, long)]
    resolution: Option<f64>,

    /// Keep every n-th node
    #[arg(long)]
    stride: Option<usize>,

    /// Read at most this many nodes
    #[arg(long)]
    limit: Option<usize>,

    /// Subsampling seed
    #[arg(long)]
    seed: Option<u64>,
}

/// Resolved settings for one invocation.
struct Settings {
    store_path: PathBuf,
    image_path: PathBuf,
    build: BuildConfig,
}

impl CommonArgs {
    fn resolve(&self) -> Result<Settings, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => NakshaConfig::load(path)?,
            None => NakshaConfig::load_default()?,
        };

        if let Some(dir) = &self.out {
            config.output.dir = dir.clone();
        }
        if let Some(resolution) = self.resolution {
            config.build.resolution = resolution;
        }
        if let Some(stride) = self.stride {
            config.build.stride = stride;
        }
        if self.limit.is_some() {
            config.build.limit_nodes = self.limit;
        }
        if self.seed.is_some() {
            config.build.seed = self.seed;
        }
        config.validate()?;

        Ok(Settings {
            store_path: self
                .db
                .clone()
                .unwrap_or_else(|| config.store.resolved_path()),
            image_path: config.output.image_path(),
            build: config.build.to_build_config(),
        })
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Build(args) => {
            let settings = args.resolve()?;
            let store = PoseGraphStore::open(&settings.store_path)?;
            log::info!(
                "Building map from {} ({} nodes)",
                settings.store_path.display(),
                store.node_count()?
            );
            let report = MapBuilder::new(store, settings.build).build()?;
            let meta = export::export_map(&report.grid, &settings.image_path)?;
            log::info!(
                "Map generated: {}x{}, origin=({}, {})",
                meta.width,
                meta.height,
                meta.origin_x,
                meta.origin_y
            );
            print_json(&json!({
                "image": settings.image_path,
                "metadata": meta,
                "occupied_cells": report.grid.occupied_count(),
                "seed": report.seed,
            }))
        }
        Command::Ensure(args) => {
            let settings = args.resolve()?;
            let cache = MapCache::new(settings.store_path, &settings.image_path, settings.build);
            let meta = cache.get_or_build()?;
            print_json(&json!({
                "image": settings.image_path,
                "metadata": meta,
            }))
        }
        Command::Bounds(args) => {
            let settings = args.resolve()?;
            let store = PoseGraphStore::open(&settings.store_path)?;
            let plan = MapBuilder::new(store, settings.build).plan()?;
            let raw = plan.scan.bounds;
            let padded = plan.bounds;
            print_json(&json!({
                "points": plan.scan.point_count,
                "nodes": plan.scan.stats.nodes,
                "fallback": plan.scan.is_fallback(),
                "raw": [raw.min_x, raw.min_y, raw.max_x, raw.max_y],
                "padded": [padded.min_x, padded.min_y, padded.max_x, padded.max_y],
                "width": plan.dimensions.width,
                "height": plan.dimensions.height,
            }))
        }
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn Error>> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{}", text);
    Ok(())
}
