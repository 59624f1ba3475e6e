//! Foundation types shared by every pipeline stage.
//!
//! - [`Point3`]: a 3D point in meters
//! - [`Transform3D`]: 4×4 homogeneous rigid transform
//! - [`Bounds`]: planar axis-aligned bounding box

mod bounds;
mod point;
mod transform;

pub use bounds::Bounds;
pub use point::Point3;
pub use transform::Transform3D;
