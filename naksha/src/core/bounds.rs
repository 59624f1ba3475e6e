//! Planar axis-aligned bounding box.
//!
//! [`Bounds`] tracks the X/Y extent of every point seen during the first
//! pass of a map build. Coordinates are kept in `f64` so that padding and
//! grid sizing do not pick up additional `f32` rounding.
//!
//! ```rust
//! use naksha::core::Bounds;
//!
//! let mut bounds = Bounds::empty();
//! bounds.expand_to_include(1.0, 1.0);
//! bounds.expand_to_include(-2.0, 3.0);
//! assert_eq!(bounds, Bounds::new(-2.0, 1.0, 1.0, 3.0));
//!
//! let padded = bounds.padded(0.5);
//! assert_eq!(padded.min_x, -2.5);
//! assert_eq!(padded.max_y, 3.5);
//! ```

/// Axis-aligned bounding box in map-frame meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Smallest X
    pub min_x: f64,
    /// Smallest Y
    pub min_y: f64,
    /// Largest X
    pub max_x: f64,
    /// Largest Y
    pub max_y: f64,
}

impl Bounds {
    /// Box used when a store yields no finite points at all.
    pub const FALLBACK: Bounds = Bounds::new(-10.0, -10.0, 10.0, 10.0);

    /// Create a new bounding box from its edges.
    #[inline]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an empty (inverted) bounding box that grows to fit any point.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// True if no point has been folded in yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    /// X extent.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Y extent.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grow to include a point.
    #[inline]
    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Expand all four edges by `margin` meters.
    #[inline]
    pub fn padded(&self, margin: f64) -> Bounds {
        Bounds::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}
