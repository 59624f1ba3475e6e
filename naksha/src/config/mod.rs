//! Configuration loading for Naksha.
//!
//! Loads all settings from a single TOML file; every field has a default,
//! so an empty file (or no file) is a valid configuration.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use naksha::config::NakshaConfig;
//!
//! // Load from default path (configs/naksha.toml), or built-in defaults
//! let config = NakshaConfig::load_default()?;
//!
//! let build = config.build.to_build_config();
//! let store = config.store.resolved_path();
//! let image = config.output.image_path();
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`StoreSection`] | Pose-graph store location (`DB_PATH` env overrides) |
//! | [`BuildSection`] | Resolution, padding, subsampling, cell ceiling |
//! | [`OutputSection`] | Output directory and image file name |
//!
//! ## Example TOML
//!
//! ```toml
//! [store]
//! path = "instance/rtabmap.db"
//!
//! [build]
//! resolution = 0.05        # 5cm cells
//! padding_m = 1.0
//! stride = 1
//! max_points_per_scan = 20000
//! max_cells = 150000000
//! z_range = [0.1, 1.5]     # optional obstacle height band
//! seed = 42                # optional, reproducible subsampling
//!
//! [output]
//! dir = "instance"
//! image_name = "map_occupancy.png"
//! ```

mod build;
mod defaults;
mod error;
mod naksha;
mod output;
mod store;

pub use build::BuildSection;
pub use error::ConfigLoadError;
pub use naksha::NakshaConfig;
pub use output::OutputSection;
pub use store::{DB_PATH_ENV, StoreSection};
