//! Build configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::builder::BuildConfig;
use crate::frame::HeightBand;

/// Map build settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildSection {
    /// Cell resolution (meters)
    #[serde(default = "defaults::resolution")]
    pub resolution: f64,

    /// Padding added to every edge of the point bounds (meters)
    #[serde(default = "defaults::padding_m")]
    pub padding_m: f64,

    /// Read at most this many nodes
    #[serde(default)]
    pub limit_nodes: Option<usize>,

    /// Keep every n-th node
    #[serde(default = "defaults::stride")]
    pub stride: usize,

    /// Random per-scan point cap, 0 disables subsampling
    #[serde(default = "defaults::max_points_per_scan")]
    pub max_points_per_scan: usize,

    /// Map-frame height band `[min, max]` in meters
    #[serde(default)]
    pub z_range: Option<[f32; 2]>,

    /// Refuse grids with more cells than this
    #[serde(default = "defaults::max_cells")]
    pub max_cells: u64,

    /// Subsampling seed (random when omitted)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            resolution: defaults::resolution(),
            padding_m: defaults::padding_m(),
            limit_nodes: None,
            stride: defaults::stride(),
            max_points_per_scan: defaults::max_points_per_scan(),
            z_range: None,
            max_cells: defaults::max_cells(),
            seed: None,
        }
    }
}

impl BuildSection {
    /// Convert to the runtime build configuration.
    pub fn to_build_config(&self) -> BuildConfig {
        BuildConfig {
            resolution: self.resolution,
            padding_m: self.padding_m,
            limit_nodes: self.limit_nodes,
            stride: self.stride,
            max_points_per_scan: (self.max_points_per_scan > 0)
                .then_some(self.max_points_per_scan),
            z_range: self.z_range.map(|[min, max]| HeightBand::new(min, max)),
            max_cells: self.max_cells,
            seed: self.seed,
        }
    }
}
