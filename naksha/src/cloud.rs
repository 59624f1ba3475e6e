//! Scan payload decoding.
//!
//! A scan payload is a zlib stream of little-endian `f32` records laid out
//! as `(x, y, z, extra)`. Only `(x, y, z)` is kept; the fourth channel
//! (intensity or ring, depending on the sensor) is not used by the grid.
//!
//! Large scans can be capped with `max_points_per_scan`. The cap draws a
//! uniform random subset without replacement rather than a prefix, since
//! sensors emit points in sweep order and a prefix would keep only one
//! sector of the scan.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use rand::Rng;

use crate::core::Point3;
use crate::error::{MapError, Result};

/// Floats per point record.
pub const FLOATS_PER_POINT: usize = 4;

/// Bytes per point record.
pub const BYTES_PER_POINT: usize = FLOATS_PER_POINT * std::mem::size_of::<f32>();

/// Decompresses and parses per-node scan payloads.
#[derive(Clone, Debug, Default)]
pub struct ScanExtractor {
    max_points_per_scan: Option<usize>,
}

impl ScanExtractor {
    /// Create an extractor with an optional per-scan point cap.
    pub fn new(max_points_per_scan: Option<usize>) -> Self {
        Self {
            max_points_per_scan,
        }
    }

    /// Configured point cap.
    pub fn max_points_per_scan(&self) -> Option<usize> {
        self.max_points_per_scan
    }

    /// Decode a compressed payload into sensor-frame points.
    ///
    /// `rng` drives subsampling when the scan exceeds the cap; it is not
    /// touched otherwise.
    pub fn extract<R: Rng + ?Sized>(&self, payload: &[u8], rng: &mut R) -> Result<Vec<Point3>> {
        let raw = decompress(payload)?;
        let points = parse_points(&raw)?;

        match self.max_points_per_scan {
            Some(cap) if points.len() > cap => Ok(subsample(points, cap, rng)),
            _ => Ok(points),
        }
    }
}

/// Inflate a zlib stream.
pub fn decompress(payload: &[u8]) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    ZlibDecoder::new(payload)
        .read_to_end(&mut raw)
        .map_err(|e| MapError::CorruptPayload(e.to_string()))?;
    Ok(raw)
}

/// Parse raw `(x, y, z, extra)` float records.
pub fn parse_points(raw: &[u8]) -> Result<Vec<Point3>> {
    if raw.len() % 4 != 0 {
        return Err(MapError::MalformedRecord(format!(
            "scan byte length {} is not a whole number of floats",
            raw.len()
        )));
    }
    let floats = raw.len() / 4;
    if floats % FLOATS_PER_POINT != 0 {
        return Err(MapError::MalformedRecord(format!(
            "unexpected float count {} (not divisible by {})",
            floats, FLOATS_PER_POINT
        )));
    }

    let read = |b: &[u8]| f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    Ok(raw
        .chunks_exact(BYTES_PER_POINT)
        .map(|rec| Point3::new(read(&rec[0..4]), read(&rec[4..8]), read(&rec[8..12])))
        .collect())
}

/// Serialize and compress `(x, y, z, extra)` records into a scan payload.
pub fn compress_scan(records: &[[f32; FLOATS_PER_POINT]]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    for record in records {
        for value in record {
            encoder.write_all(&value.to_le_bytes())?;
        }
    }
    Ok(encoder.finish()?)
}

/// Keep `cap` points chosen uniformly without replacement, in scan order.
fn subsample<R: Rng + ?Sized>(points: Vec<Point3>, cap: usize, rng: &mut R) -> Vec<Point3> {
    let mut indices = rand::seq::index::sample(rng, points.len(), cap).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| points[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn records(n: usize) -> Vec<[f32; 4]> {
        (0..n)
            .map(|i| [i as f32, -(i as f32), 0.5, 99.0])
            .collect()
    }

    #[test]
    fn test_extract_keeps_xyz() {
        let payload = compress_scan(&[[1.0, 2.0, 3.0, 7.0], [-1.0, -2.0, -3.0, 8.0]]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let points = ScanExtractor::default().extract(&payload, &mut rng).unwrap();
        assert_eq!(
            points,
            vec![Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, -2.0, -3.0)]
        );
    }

    #[test]
    fn test_corrupt_payload() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = ScanExtractor::default()
            .extract(b"definitely not zlib", &mut rng)
            .unwrap_err();
        assert!(matches!(err, MapError::CorruptPayload(_)));
    }

    #[test]
    fn test_float_count_not_divisible_by_four() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0] {
            encoder.write_all(&v.to_le_bytes()).unwrap();
        }
        let payload = encoder.finish().unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let err = ScanExtractor::default().extract(&payload, &mut rng).unwrap_err();
        assert!(matches!(err, MapError::MalformedRecord(_)));
        assert!(err.to_string().contains("6"));
    }

    #[test]
    fn test_partial_float_is_malformed() {
        assert!(matches!(
            parse_points(&[0u8; 17]),
            Err(MapError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_empty_scan() {
        let payload = compress_scan(&[]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let points = ScanExtractor::new(Some(10)).extract(&payload, &mut rng).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_cap_draws_distinct_subset() {
        let payload = compress_scan(&records(1000)).unwrap();
        let extractor = ScanExtractor::new(Some(100));
        let mut rng = StdRng::seed_from_u64(7);
        let points = extractor.extract(&payload, &mut rng).unwrap();

        assert_eq!(points.len(), 100);
        let mut xs: Vec<i32> = points.iter().map(|p| p.x as i32).collect();
        xs.dedup();
        assert_eq!(xs.len(), 100, "subset must not repeat points");
        assert!(xs.windows(2).all(|w| w[0] < w[1]), "scan order preserved");
        // A prefix would end at 99.
        assert!(*xs.last().unwrap() > 99);
    }

    #[test]
    fn test_cap_is_reproducible_with_seed() {
        let payload = compress_scan(&records(500)).unwrap();
        let extractor = ScanExtractor::new(Some(50));

        let a = extractor
            .extract(&payload, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = extractor
            .extract(&payload, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let c = extractor
            .extract(&payload, &mut StdRng::seed_from_u64(43))
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_under_cap_returns_everything() {
        let payload = compress_scan(&records(20)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let points = ScanExtractor::new(Some(20)).extract(&payload, &mut rng).unwrap();
        assert_eq!(points.len(), 20);
        assert_eq!(points[19], Point3::new(19.0, -19.0, 0.5));
    }
}
