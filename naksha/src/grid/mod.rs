//! Binary occupancy grid and the two streaming build passes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   pass 1    ┌───────────────┐
//! │  ScanStream  │ ──────────► │ compute_bounds│ ─► Bounds (+ padding)
//! │ (per node)   │             └───────────────┘          │
//! │              │   pass 2    ┌───────────────┐          ▼
//! │              │ ──────────► │GridRasterizer │ ◄── GridDimensions
//! └──────────────┘             └───────┬───────┘   (cell ceiling check)
//!                                      ▼
//!                               OccupancyGrid
//! ```
//!
//! ## Cell model
//!
//! A cell is `1` once any map-frame point has fallen inside it and `0`
//! otherwise. Marking is a monotonic OR: passes never clear cells, so
//! rasterizing the same location twice is idempotent and shard results can
//! be combined with [`OccupancyGrid::merge`].
//!
//! Grid row 0 is the minimum-Y (southern) edge of the map.

mod bounds_scan;
mod occupancy;
mod rasterizer;

pub use bounds_scan::{BoundsScan, compute_bounds};
pub use occupancy::OccupancyGrid;
pub use rasterizer::{GridDimensions, GridRasterizer};
