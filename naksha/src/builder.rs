//! Two-pass map build.
//!
//! ```text
//! ScanStream ──pass 1──► compute_bounds ──► padded bounds ──► GridDimensions
//!            ──pass 2──► GridRasterizer ──► OccupancyGrid
//! ```
//!
//! Both passes draw their per-scan subsets from an RNG seeded with the same
//! value, so they see exactly the same points. Without a configured seed a
//! single seed is drawn from the OS for each build.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cloud::ScanExtractor;
use crate::core::Bounds;
use crate::error::{MapError, Result};
use crate::frame::{FrameTransformer, HeightBand};
use crate::grid::{BoundsScan, GridDimensions, GridRasterizer, OccupancyGrid, compute_bounds};
use crate::store::NodeSource;
use crate::stream::{CancelToken, PassStats, ScanStream};

/// Runtime parameters for one map build.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildConfig {
    /// Meters per cell
    pub resolution: f64,
    /// Margin added to every edge of the point bounds (meters)
    pub padding_m: f64,
    /// Read at most this many nodes
    pub limit_nodes: Option<usize>,
    /// Keep every n-th node
    pub stride: usize,
    /// Random per-scan point cap
    pub max_points_per_scan: Option<usize>,
    /// Map-frame height band
    pub z_range: Option<HeightBand>,
    /// Cell ceiling checked before allocation
    pub max_cells: u64,
    /// Subsampling seed
    pub seed: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            resolution: 0.05,
            padding_m: 1.0,
            limit_nodes: None,
            stride: 1,
            max_points_per_scan: Some(20_000),
            z_range: None,
            max_cells: 150_000_000,
            seed: None,
        }
    }
}

impl BuildConfig {
    /// Reject values that would make grid sizing meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "resolution must be > 0, got {}",
                self.resolution
            )));
        }
        if !(self.padding_m.is_finite() && self.padding_m >= 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "padding must be >= 0, got {}",
                self.padding_m
            )));
        }
        if self.stride == 0 {
            return Err(MapError::InvalidConfig("stride must be >= 1".to_string()));
        }
        if let Some(band) = self.z_range
            && !(band.min <= band.max)
        {
            return Err(MapError::InvalidConfig(format!(
                "z_range min {} exceeds max {}",
                band.min, band.max
            )));
        }
        Ok(())
    }
}

/// Everything produced by a full build.
#[derive(Clone, Debug)]
pub struct BuildReport {
    /// The occupancy grid
    pub grid: OccupancyGrid,
    /// Point bounds before padding (fallback box if the store had no points)
    pub raw_bounds: Bounds,
    /// Bounds the grid was sized from
    pub bounds: Bounds,
    /// Points seen by the bounds pass
    pub point_count: usize,
    /// Seed both passes were drawn from
    pub seed: u64,
    /// Bounds pass counters
    pub bounds_pass: PassStats,
    /// Rasterization pass counters
    pub raster_pass: PassStats,
}

/// Result of [`MapBuilder::plan`]: bounds and grid size without rasterizing.
#[derive(Clone, Copy, Debug)]
pub struct BuildPlan {
    /// Bounds pass output
    pub scan: BoundsScan,
    /// Padded bounds
    pub bounds: Bounds,
    /// Grid size implied by the padded bounds
    pub dimensions: GridDimensions,
    /// Seed used for the bounds pass
    pub seed: u64,
}

/// Runs the bounds and rasterization passes over a node source.
pub struct MapBuilder<S> {
    source: S,
    config: BuildConfig,
    cancel: CancelToken,
}

impl<S: NodeSource> MapBuilder<S> {
    /// Create a builder.
    pub fn new(source: S, config: BuildConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Attach a cancel token, checked between nodes in both passes.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Build configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    fn stream(&self) -> ScanStream<&S> {
        ScanStream::new(&self.source)
            .with_extractor(ScanExtractor::new(self.config.max_points_per_scan))
            .with_transformer(FrameTransformer::new(self.config.z_range))
            .with_limit(self.config.limit_nodes)
            .with_stride(self.config.stride)
            .with_cancel(self.cancel.clone())
    }

    fn seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }

    fn plan_with_seed(&self, stream: &ScanStream<&S>, seed: u64) -> Result<BuildPlan> {
        let mut rng = StdRng::seed_from_u64(seed);
        let scan = compute_bounds(stream, &mut rng)?;
        let bounds = scan.bounds.padded(self.config.padding_m);
        let rasterizer = GridRasterizer::new(self.config.resolution, self.config.max_cells);
        let dimensions = rasterizer.dimensions(&bounds)?;
        Ok(BuildPlan {
            scan,
            bounds,
            dimensions,
            seed,
        })
    }

    /// Run only the bounds pass and size the grid.
    ///
    /// Fails with [`MapError::OversizedGrid`] when the padded bounds exceed
    /// the cell ceiling, exactly as a full build would.
    pub fn plan(&self) -> Result<BuildPlan> {
        self.config.validate()?;
        self.plan_with_seed(&self.stream(), self.seed())
    }

    /// Run both passes and return the grid.
    pub fn build(&self) -> Result<BuildReport> {
        self.config.validate()?;
        let stream = self.stream();
        let seed = self.seed();

        let plan = self.plan_with_seed(&stream, seed)?;
        log::info!(
            "Bounds: {} points from {} nodes, grid {}x{} at {} m/cell",
            plan.scan.point_count,
            plan.scan.stats.nodes,
            plan.dimensions.width,
            plan.dimensions.height,
            self.config.resolution
        );

        let rasterizer = GridRasterizer::new(self.config.resolution, self.config.max_cells);
        let mut rng = StdRng::seed_from_u64(seed);
        let (grid, raster_pass) = rasterizer.build(&stream, &plan.bounds, &mut rng)?;

        log::info!(
            "Rasterized {} points, {} cells occupied",
            raster_pass.points,
            grid.occupied_count()
        );

        Ok(BuildReport {
            grid,
            raw_bounds: plan.scan.bounds,
            bounds: plan.bounds,
            point_count: plan.scan.point_count,
            seed,
            bounds_pass: plan.scan.stats,
            raster_pass,
        })
    }
}
