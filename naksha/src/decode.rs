//! Rigid-transform blob decoding.
//!
//! Both blob layouts hold a row-major 3×4 matrix of little-endian `f32`
//! (48 bytes):
//!
//! - `Node.pose`: exactly 48 bytes, map-from-node
//! - `Data.scan_info`: arbitrary header followed by the 48-byte
//!   node-from-sensor local transform at its tail

use crate::core::Transform3D;
use crate::error::{MapError, Result};

/// Size of a serialized 3×4 `f32` matrix.
pub const TRANSFORM_BLOB_SIZE: usize = 12 * std::mem::size_of::<f32>();

/// Decode a node pose blob.
///
/// Fails with [`MapError::MalformedRecord`] unless the blob holds exactly
/// 12 `f32` values.
pub fn decode_pose(blob: &[u8]) -> Result<Transform3D> {
    if blob.len() != TRANSFORM_BLOB_SIZE {
        let detail = if blob.len() % 4 == 0 {
            format!("{} floats", blob.len() / 4)
        } else {
            format!("{} bytes", blob.len())
        };
        return Err(MapError::MalformedRecord(format!(
            "unexpected pose size: {} (expected 12 floats)",
            detail
        )));
    }
    Ok(Transform3D::from_rows_3x4(&read_matrix(blob)))
}

/// Decode the sensor local transform stored at the tail of `scan_info`.
///
/// Missing or short blobs decode to the identity.
pub fn decode_local_transform(blob: Option<&[u8]>) -> Transform3D {
    match blob {
        Some(bytes) if bytes.len() >= TRANSFORM_BLOB_SIZE => {
            let tail = &bytes[bytes.len() - TRANSFORM_BLOB_SIZE..];
            Transform3D::from_rows_3x4(&read_matrix(tail))
        }
        _ => Transform3D::identity(),
    }
}

/// Serialize the top three rows of a transform into the pose blob layout.
pub fn encode_pose(transform: &Transform3D) -> Vec<u8> {
    transform
        .to_rows_3x4()
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

/// Caller guarantees `bytes.len() == TRANSFORM_BLOB_SIZE`.
fn read_matrix(bytes: &[u8]) -> [f32; 12] {
    let mut values = [0.0f32; 12];
    for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    values
}
