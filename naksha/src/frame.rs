//! Sensor-frame to map-frame point transformation.
//!
//! Each point goes through the sensor extrinsic first, then the node pose:
//!
//! ```text
//! p_map = T_pose · T_local · [x, y, z, 1]ᵀ
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{Point3, Transform3D};

/// Inclusive map-frame height band, in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightBand {
    /// Lowest kept z
    pub min: f32,
    /// Highest kept z
    pub max: f32,
}

impl HeightBand {
    /// Create a new band.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// True if `z` lies inside the band.
    #[inline]
    pub fn contains(&self, z: f32) -> bool {
        z >= self.min && z <= self.max
    }
}

/// Maps sensor-frame points into the common map frame.
#[derive(Clone, Debug, Default)]
pub struct FrameTransformer {
    height_band: Option<HeightBand>,
}

impl FrameTransformer {
    /// Create a transformer with an optional height filter.
    pub fn new(height_band: Option<HeightBand>) -> Self {
        Self { height_band }
    }

    /// Configured height band.
    pub fn height_band(&self) -> Option<HeightBand> {
        self.height_band
    }

    /// Transform points into the map frame.
    ///
    /// Non-finite results are dropped, then points outside the height band.
    pub fn to_map_frame(
        &self,
        points: &[Point3],
        local: &Transform3D,
        pose: &Transform3D,
    ) -> Vec<Point3> {
        points
            .iter()
            .map(|p| pose.transform_point(&local.transform_point(p)))
            .filter(Point3::is_finite)
            .filter(|p| self.height_band.is_none_or(|band| band.contains(p.z)))
            .collect()
    }
}
