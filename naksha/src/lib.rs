//! # Naksha
//!
//! Builds a 2D occupancy grid from a SLAM pose-graph store and exports it
//! as a grayscale image with a ROS-style YAML sidecar.
//!
//! ## Overview
//!
//! The store holds one row per node: a 3×4 pose, a zlib-compressed point
//! cloud and an optional sensor extrinsic. A build streams those rows twice:
//!
//! 1. **Bounds pass**: fold every map-frame point into an XY bounding box
//! 2. **Raster pass**: size a grid from the padded box and mark each cell
//!    that received a point
//!
//! Only one node's points are held in memory at a time, so memory is
//! bounded by the grid size plus the largest single scan.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use naksha::{BuildConfig, MapBuilder, PoseGraphStore};
//!
//! let store = PoseGraphStore::open("instance/rtabmap.db")?;
//! let report = MapBuilder::new(store, BuildConfig::default()).build()?;
//! let meta = naksha::export::export_map(&report.grid, "map.png".as_ref())?;
//! println!("{}x{} at ({}, {})", meta.width, meta.height, meta.origin_x, meta.origin_y);
//! ```
//!
//! For a long-running service, [`MapCache`] builds on first request and
//! reuses the exported image afterwards.
//!
//! ## Coordinate System
//!
//! Grid cell `(0, 0)` is the minimum-X, minimum-Y corner of the padded
//! bounds. Exported images are flipped so that +Y points up.

#![warn(missing_docs)]

// Math primitives
pub mod core;

// Blob and payload decoding
pub mod cloud;
pub mod decode;

// Map-frame transformation
pub mod frame;

// Node sources and per-node streaming
pub mod store;
pub mod stream;

// Grid, passes and the two-pass builder
pub mod builder;
pub mod grid;

// Image + sidecar output
pub mod export;

// Lazily built map
pub mod cache;

// TOML configuration
pub mod config;

pub mod error;

pub use builder::{BuildConfig, BuildPlan, BuildReport, MapBuilder};
pub use cache::{CacheState, MapCache};
pub use config::NakshaConfig;
pub use core::{Bounds, Point3, Transform3D};
pub use error::{MapError, Result};
pub use export::MapMetadata;
pub use frame::HeightBand;
pub use grid::OccupancyGrid;
pub use store::{MemorySource, NodeRecord, NodeSource, PoseGraphStore};
pub use stream::CancelToken;
