//! Point and axis-aligned box primitives over an arbitrary number of dimensions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::disk_rtree::rtree_types::{SpatialError, SpatialResult};

/// A point in `d`-dimensional space.
///
/// Points are immutable once constructed; identity is the coordinate vector.
///
/// # Examples
///
/// ```rust
/// use rstar_disk::SpatialPoint;
///
/// let p = SpatialPoint::new(vec![1.0, 2.0]);
/// assert_eq!(p.dimension(), 2);
/// assert_eq!(p.coord(1), 2.0);
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SpatialPoint {
    coords: Vec<f64>,
}

impl SpatialPoint {
    /// Creates a point from its coordinates.
    pub fn new(coords: Vec<f64>) -> Self {
        SpatialPoint { coords }
    }

    /// Returns the number of coordinates.
    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// Returns all coordinates.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Returns the coordinate along `axis`.
    pub fn coord(&self, axis: usize) -> f64 {
        self.coords[axis]
    }

    /// Returns true when no coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }

    /// Squared Euclidean distance to another point of the same dimension.
    pub fn distance_squared(&self, other: &SpatialPoint) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    pub fn into_coords(self) -> Vec<f64> {
        self.coords
    }
}

impl From<Vec<f64>> for SpatialPoint {
    fn from(coords: Vec<f64>) -> Self {
        SpatialPoint::new(coords)
    }
}

impl From<&[f64]> for SpatialPoint {
    fn from(coords: &[f64]) -> Self {
        SpatialPoint::new(coords.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for SpatialPoint {
    fn from(coords: [f64; N]) -> Self {
        SpatialPoint::new(coords.to_vec())
    }
}

impl fmt::Display for SpatialPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpatialPoint(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

/// An axis-aligned bounding box in `d`-dimensional space.
///
/// A rectangle is either *empty* (it bounds nothing, `low = +inf`,
/// `high = -inf` on every axis) or satisfies `low[i] <= high[i]` on every
/// axis. An empty rectangle is distinct from a zero-area rectangle that
/// bounds a single point or two touching boxes.
///
/// # Examples
///
/// ```rust
/// use rstar_disk::{HyperRectangle, SpatialPoint};
///
/// let mut mbr = HyperRectangle::new(2);
/// assert!(mbr.is_empty());
///
/// mbr.update(&SpatialPoint::new(vec![0.0, 0.0]));
/// mbr.update(&SpatialPoint::new(vec![2.0, 3.0]));
/// assert_eq!(mbr.area(), 6.0);
/// assert_eq!(mbr.margin(), 5.0);
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct HyperRectangle {
    low: Vec<f64>,
    high: Vec<f64>,
}

impl HyperRectangle {
    /// Creates an empty rectangle of the given dimension.
    pub fn new(dimension: usize) -> Self {
        HyperRectangle {
            low: vec![f64::INFINITY; dimension],
            high: vec![f64::NEG_INFINITY; dimension],
        }
    }

    /// Creates a rectangle from explicit bounds.
    ///
    /// # Errors
    ///
    /// Fails when the bound vectors differ in length or `low[i] > high[i]`
    /// on some axis.
    pub fn from_bounds(low: Vec<f64>, high: Vec<f64>) -> SpatialResult<Self> {
        if low.len() != high.len() {
            return Err(SpatialError::InvalidOperation(format!(
                "bounds have different dimensions ({} and {})",
                low.len(),
                high.len()
            )));
        }
        if let Some(axis) = (0..low.len()).find(|&i| !(low[i] <= high[i])) {
            return Err(SpatialError::InvalidOperation(format!(
                "low bound {} exceeds high bound {} on axis {}",
                low[axis], high[axis], axis
            )));
        }
        Ok(HyperRectangle { low, high })
    }

    /// Creates the zero-area rectangle covering a single point.
    pub fn from_point(point: &SpatialPoint) -> Self {
        HyperRectangle {
            low: point.coords().to_vec(),
            high: point.coords().to_vec(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.low.len()
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    /// Returns true when the rectangle bounds nothing.
    pub fn is_empty(&self) -> bool {
        self.low.iter().zip(self.high.iter()).any(|(l, h)| l > h)
    }

    /// Extends the bounds in place so they include `point`.
    ///
    /// # Panics
    ///
    /// Panics if `point` has a different dimension. The methods below that
    /// take a point or another rectangle share this requirement.
    pub fn update(&mut self, point: &SpatialPoint) {
        debug_assert_eq!(self.dimension(), point.dimension());
        for (axis, &c) in point.coords().iter().enumerate() {
            self.low[axis] = self.low[axis].min(c);
            self.high[axis] = self.high[axis].max(c);
        }
    }

    /// Extends the bounds in place so they include `other`.
    pub fn expand(&mut self, other: &HyperRectangle) {
        debug_assert_eq!(self.dimension(), other.dimension());
        for axis in 0..self.low.len() {
            self.low[axis] = self.low[axis].min(other.low[axis]);
            self.high[axis] = self.high[axis].max(other.high[axis]);
        }
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &HyperRectangle) -> HyperRectangle {
        let mut merged = self.clone();
        merged.expand(other);
        merged
    }

    /// Returns the overlap region, or `None` when the rectangles are disjoint
    /// or either one is empty. Touching rectangles overlap in a zero-area
    /// region.
    pub fn intersection(&self, other: &HyperRectangle) -> Option<HyperRectangle> {
        if !self.intersects(other) {
            return None;
        }
        let low = self
            .low
            .iter()
            .zip(other.low.iter())
            .map(|(a, b)| a.max(*b))
            .collect();
        let high = self
            .high
            .iter()
            .zip(other.high.iter())
            .map(|(a, b)| a.min(*b))
            .collect();
        Some(HyperRectangle { low, high })
    }

    pub fn intersects(&self, other: &HyperRectangle) -> bool {
        debug_assert_eq!(self.dimension(), other.dimension());
        if self.is_empty() || other.is_empty() {
            return false;
        }
        (0..self.low.len()).all(|i| self.low[i] <= other.high[i] && self.high[i] >= other.low[i])
    }

    /// Checks if `point` lies inside the rectangle, boundary included.
    pub fn contains_point(&self, point: &SpatialPoint) -> bool {
        debug_assert_eq!(self.dimension(), point.dimension());
        point
            .coords()
            .iter()
            .enumerate()
            .all(|(i, &c)| c >= self.low[i] && c <= self.high[i])
    }

    /// Checks if `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &HyperRectangle) -> bool {
        debug_assert_eq!(self.dimension(), other.dimension());
        if other.is_empty() {
            return true;
        }
        (0..self.low.len()).all(|i| other.low[i] >= self.low[i] && other.high[i] <= self.high[i])
    }

    /// Product of side lengths. An empty rectangle has zero area.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.low
            .iter()
            .zip(self.high.iter())
            .map(|(l, h)| h - l)
            .product()
    }

    /// Sum of side lengths. An empty rectangle has zero margin.
    pub fn margin(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.low.iter().zip(self.high.iter()).map(|(l, h)| h - l).sum()
    }

    /// Area of the intersection with `other`, zero if disjoint.
    pub fn overlap(&self, other: &HyperRectangle) -> f64 {
        self.intersection(other).map(|r| r.area()).unwrap_or(0.0)
    }

    /// Area growth needed to also cover `other`.
    pub fn enlargement(&self, other: &HyperRectangle) -> f64 {
        self.union(other).area() - self.area()
    }

    /// Squared distance from `point` to the closest point of the rectangle,
    /// zero when the point is inside.
    pub fn min_distance_squared(&self, point: &SpatialPoint) -> f64 {
        debug_assert_eq!(self.dimension(), point.dimension());
        if self.is_empty() {
            return f64::INFINITY;
        }
        point
            .coords()
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let closest = c.clamp(self.low[i], self.high[i]);
                (c - closest) * (c - closest)
            })
            .sum()
    }
}

impl fmt::Display for HyperRectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "HyperRectangle(empty, d={})", self.dimension());
        }
        write!(f, "HyperRectangle({:?}, {:?})", self.low, self.high)
    }
}
