//! First pass: planar bounds of every map-frame point.

use rand::Rng;

use crate::core::Bounds;
use crate::error::Result;
use crate::store::NodeSource;
use crate::stream::{PassStats, ScanStream};

/// Result of the bounds pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsScan {
    /// XY extent of all points, or [`Bounds::FALLBACK`] if there were none
    pub bounds: Bounds,
    /// Number of points folded in (0 when the fallback is used)
    pub point_count: usize,
    /// Per-pass counters
    pub stats: PassStats,
}

impl BoundsScan {
    /// True when no finite point was seen and the fallback box was used.
    pub fn is_fallback(&self) -> bool {
        self.point_count == 0
    }
}

/// Stream every selected node and fold its X/Y into running min/max.
///
/// Z is ignored. An empty stream yields the fixed fallback box so that
/// grid sizing never sees a zero or inverted range.
pub fn compute_bounds<S, R>(stream: &ScanStream<S>, rng: &mut R) -> Result<BoundsScan>
where
    S: NodeSource,
    R: Rng + ?Sized,
{
    let mut bounds = Bounds::empty();
    let mut point_count = 0usize;

    let stats = stream.for_each_scan(rng, |points| {
        point_count += points.len();
        for p in points {
            bounds.expand_to_include(p.x as f64, p.y as f64);
        }
    })?;

    if point_count == 0 || bounds.is_empty() {
        log::warn!("No finite points in store; using fallback bounds");
        return Ok(BoundsScan {
            bounds: Bounds::FALLBACK,
            point_count: 0,
            stats,
        });
    }

    log::debug!(
        "Bounds pass: {} nodes, {} points, x=[{:.3}, {:.3}] y=[{:.3}, {:.3}]",
        stats.nodes,
        point_count,
        bounds.min_x,
        bounds.max_x,
        bounds.min_y,
        bounds.max_y
    );

    Ok(BoundsScan {
        bounds,
        point_count,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::compress_scan;
    use crate::core::Transform3D;
    use crate::decode::encode_pose;
    use crate::store::{MemorySource, NodeRecord};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn node(id: i64, pose: Transform3D, pts: &[[f32; 4]]) -> NodeRecord {
        NodeRecord {
            id,
            pose: encode_pose(&pose),
            scan: compress_scan(pts).unwrap(),
            scan_info: None,
        }
    }

    #[test]
    fn test_bounds_over_all_nodes() {
        let source = MemorySource::new(vec![
            node(
                1,
                Transform3D::identity(),
                &[[1.0, 2.0, 9.0, 0.0], [-3.0, 0.5, -9.0, 0.0]],
            ),
            node(
                2,
                Transform3D::from_translation(10.0, -1.0, 0.0),
                &[[0.0, 0.0, 0.0, 0.0]],
            ),
        ]);
        let mut rng = StdRng::seed_from_u64(0);
        let scan = compute_bounds(&ScanStream::new(source), &mut rng).unwrap();

        assert_eq!(scan.bounds, Bounds::new(-3.0, -1.0, 10.0, 2.0));
        assert_eq!(scan.point_count, 3);
        assert!(!scan.is_fallback());
    }

    #[test]
    fn test_empty_stream_uses_fallback() {
        let mut rng = StdRng::seed_from_u64(0);
        let scan = compute_bounds(&ScanStream::new(MemorySource::default()), &mut rng).unwrap();
        assert_eq!(scan.bounds, Bounds::new(-10.0, -10.0, 10.0, 10.0));
        assert_eq!(scan.point_count, 0);
        assert!(scan.is_fallback());
    }

    #[test]
    fn test_only_non_finite_points_uses_fallback() {
        let source = MemorySource::new(vec![node(
            1,
            Transform3D::identity(),
            &[[f32::NAN, 0.0, 0.0, 0.0], [0.0, f32::INFINITY, 0.0, 0.0]],
        )]);
        let mut rng = StdRng::seed_from_u64(0);
        let scan = compute_bounds(&ScanStream::new(source), &mut rng).unwrap();
        assert!(scan.is_fallback());
        assert_eq!(scan.bounds, Bounds::FALLBACK);
    }
}
