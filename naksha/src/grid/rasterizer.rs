//! Second pass: quantize map-frame points into grid cells.

use rand::Rng;

use super::OccupancyGrid;
use crate::core::{Bounds, Point3};
use crate::error::{MapError, Result};
use crate::store::NodeSource;
use crate::stream::{PassStats, ScanStream};

/// Grid size implied by bounds and resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDimensions {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
}

impl GridDimensions {
    /// `width = ceil((max_x - min_x) / resolution) + 1`, same for height.
    pub fn from_bounds(bounds: &Bounds, resolution: f64) -> Result<Self> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "resolution must be positive, got {}",
                resolution
            )));
        }
        let width = (bounds.width() / resolution).ceil() + 1.0;
        let height = (bounds.height() / resolution).ceil() + 1.0;
        if !(width >= 1.0 && height >= 1.0) {
            return Err(MapError::InvalidConfig(format!(
                "bounds are empty or inverted: {:?}",
                bounds
            )));
        }
        // Float-to-int casts saturate, so absurd extents still fail the
        // cell ceiling below instead of wrapping.
        Ok(Self {
            width: width as usize,
            height: height as usize,
        })
    }

    /// Total number of cells, without overflow.
    pub fn cells(&self) -> u128 {
        self.width as u128 * self.height as u128
    }

    /// Reject dimensions above the cell ceiling.
    pub fn check_ceiling(&self, max_cells: u64) -> Result<()> {
        let cells = self.cells();
        if cells > max_cells as u128 {
            return Err(MapError::OversizedGrid {
                width: self.width,
                height: self.height,
                cells,
                max_cells,
            });
        }
        Ok(())
    }
}

/// Builds an [`OccupancyGrid`] from a scan stream and precomputed bounds.
#[derive(Clone, Debug)]
pub struct GridRasterizer {
    resolution: f64,
    max_cells: u64,
}

impl GridRasterizer {
    /// Create a rasterizer.
    pub fn new(resolution: f64, max_cells: u64) -> Self {
        Self {
            resolution,
            max_cells,
        }
    }

    /// Meters per cell.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Cell ceiling.
    pub fn max_cells(&self) -> u64 {
        self.max_cells
    }

    /// Size the grid for `bounds` and check it against the ceiling.
    ///
    /// Nothing is allocated here.
    pub fn dimensions(&self, bounds: &Bounds) -> Result<GridDimensions> {
        let dims = GridDimensions::from_bounds(bounds, self.resolution)?;
        dims.check_ceiling(self.max_cells)?;
        Ok(dims)
    }

    /// Allocate a zeroed grid covering `bounds`, after the ceiling check.
    pub fn allocate(&self, bounds: &Bounds) -> Result<OccupancyGrid> {
        let dims = self.dimensions(bounds)?;
        Ok(OccupancyGrid::new(
            dims.width,
            dims.height,
            self.resolution,
            bounds.min_x,
            bounds.min_y,
        ))
    }

    /// Mark every point that falls inside the grid. Returns how many
    /// points were dropped for lying outside.
    pub fn rasterize_points(grid: &mut OccupancyGrid, points: &[Point3]) -> usize {
        points
            .iter()
            .filter(|p| !grid.mark_world(p.x as f64, p.y as f64))
            .count()
    }

    /// Run the rasterization pass.
    ///
    /// Fails with [`MapError::OversizedGrid`] before allocating if the
    /// bounds imply more cells than the ceiling.
    pub fn build<S, R>(
        &self,
        stream: &ScanStream<S>,
        bounds: &Bounds,
        rng: &mut R,
    ) -> Result<(OccupancyGrid, PassStats)>
    where
        S: NodeSource,
        R: Rng + ?Sized,
    {
        let mut grid = self.allocate(bounds)?;
        log::debug!(
            "Rasterizing into {}x{} grid at {} m/cell",
            grid.width(),
            grid.height(),
            self.resolution
        );

        let mut dropped = 0usize;
        let stats = stream.for_each_scan(rng, |points| {
            dropped += Self::rasterize_points(&mut grid, points);
        })?;

        if dropped > 0 {
            log::debug!("{} points fell outside the grid and were dropped", dropped);
        }
        Ok((grid, stats))
    }
}
