//! Binary occupancy grid storage.

use crate::core::Bounds;
use crate::export::MapMetadata;

/// Cell value for a location where a return was observed.
pub const OCCUPIED: u8 = 1;

/// Cell value for a location with no observed return.
pub const FREE: u8 = 0;

/// Row-major `height × width` byte grid anchored at `(origin_x, origin_y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    resolution: f64,
    origin_x: f64,
    origin_y: f64,
    cells: Vec<u8>,
}

impl OccupancyGrid {
    /// Allocate a zeroed grid.
    ///
    /// Callers are expected to have checked the cell count already; see
    /// [`GridDimensions`](super::GridDimensions).
    pub fn new(width: usize, height: usize, resolution: f64, origin_x: f64, origin_y: f64) -> Self {
        Self {
            width,
            height,
            resolution,
            origin_x,
            origin_y,
            cells: vec![FREE; width * height],
        }
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Meters per cell.
    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Map-frame X of cell (0, 0)'s corner.
    #[inline]
    pub fn origin_x(&self) -> f64 {
        self.origin_x
    }

    /// Map-frame Y of cell (0, 0)'s corner.
    #[inline]
    pub fn origin_y(&self) -> f64 {
        self.origin_y
    }

    /// Raw row-major cells.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// One row of cells, `y` counted from the minimum-Y edge.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Cell value, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// True if the cell is in range and occupied.
    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(OCCUPIED)
    }

    /// Cell containing a map-frame point, or `None` if it falls outside.
    ///
    /// Uses `floor((x - origin_x) / resolution)`; points outside are never
    /// wrapped or clamped onto the border.
    pub fn world_to_cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let fx = ((x - self.origin_x) / self.resolution).floor();
        let fy = ((y - self.origin_y) / self.resolution).floor();
        let in_x = fx >= 0.0 && fx < self.width as f64;
        let in_y = fy >= 0.0 && fy < self.height as f64;
        (in_x && in_y).then_some((fx as usize, fy as usize))
    }

    /// Map-frame corner of a cell.
    pub fn cell_to_world(&self, x: usize, y: usize) -> (f64, f64) {
        (
            self.origin_x + x as f64 * self.resolution,
            self.origin_y + y as f64 * self.resolution,
        )
    }

    /// Mark the cell containing a map-frame point. Returns `false` if the
    /// point is outside the grid.
    #[inline]
    pub fn mark_world(&mut self, x: f64, y: f64) -> bool {
        match self.world_to_cell(x, y) {
            Some((cx, cy)) => {
                self.cells[cy * self.width + cx] = OCCUPIED;
                true
            }
            None => false,
        }
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == OCCUPIED).count()
    }

    /// Map-frame extent covered by the grid.
    pub fn extent(&self) -> Bounds {
        Bounds::new(
            self.origin_x,
            self.origin_y,
            self.origin_x + self.width as f64 * self.resolution,
            self.origin_y + self.height as f64 * self.resolution,
        )
    }

    /// Element-wise OR with a grid of identical geometry.
    ///
    /// Returns `false` (and leaves `self` untouched) if the geometry differs.
    pub fn merge(&mut self, other: &OccupancyGrid) -> bool {
        let same_geometry = self.width == other.width
            && self.height == other.height
            && self.resolution == other.resolution
            && self.origin_x == other.origin_x
            && self.origin_y == other.origin_y;
        if !same_geometry {
            return false;
        }
        for (dst, src) in self.cells.iter_mut().zip(&other.cells) {
            *dst |= *src;
        }
        true
    }

    /// Metadata record describing this grid.
    pub fn metadata(&self) -> MapMetadata {
        MapMetadata {
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            resolution: self.resolution,
            width: self.width,
            height: self.height,
        }
    }
}
