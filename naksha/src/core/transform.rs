//! Homogeneous rigid transforms.
//!
//! A [`Transform3D`] is a 4×4 row-major matrix whose top three rows hold the
//! rotation and translation and whose bottom row is `[0, 0, 0, 1]`.
//!
//! ```text
//! ┌                 ┐
//! │ r00 r01 r02 tx  │
//! │ r10 r11 r12 ty  │   p' = T · [x, y, z, 1]ᵀ
//! │ r20 r21 r22 tz  │
//! │  0   0   0   1  │
//! └                 ┘
//! ```
//!
//! Applying `A` then `B` to a point is the same as applying `B.compose(&A)`.

use super::Point3;

/// 4×4 homogeneous transform, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    /// Matrix entries, `m[row][col]`
    pub m: [[f32; 4]; 4],
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// The identity transform.
    #[inline]
    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Build from the 12 values of a row-major 3×4 matrix.
    ///
    /// The bottom row is fixed to `[0, 0, 0, 1]`.
    pub fn from_rows_3x4(values: &[f32; 12]) -> Self {
        let mut m = Self::identity().m;
        for (row, chunk) in m.iter_mut().zip(values.chunks_exact(4)) {
            row.copy_from_slice(chunk);
        }
        Self { m }
    }

    /// Pure translation.
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut t = Self::identity();
        t.m[0][3] = x;
        t.m[1][3] = y;
        t.m[2][3] = z;
        t
    }

    /// Rotation about +Z by `yaw` radians followed by a translation.
    pub fn from_yaw_translation(yaw: f32, x: f32, y: f32, z: f32) -> Self {
        let (s, c) = yaw.sin_cos();
        Self {
            m: [
                [c, -s, 0.0, x],
                [s, c, 0.0, y],
                [0.0, 0.0, 1.0, z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// The top three rows flattened back into 12 row-major values.
    pub fn to_rows_3x4(&self) -> [f32; 12] {
        let mut out = [0.0; 12];
        for (chunk, row) in out.chunks_exact_mut(4).zip(self.m.iter()) {
            chunk.copy_from_slice(row);
        }
        out
    }

    /// Translation component.
    #[inline]
    pub fn translation(&self) -> Point3 {
        Point3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// Matrix product `self · other`.
    pub fn compose(&self, other: &Transform3D) -> Transform3D {
        let mut m = [[0.0f32; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Transform3D { m }
    }

    /// Apply the transform to a point (homogeneous w = 1).
    #[inline]
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        let m = &self.m;
        Point3::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }
}
