//! Cell positions and the position lookup used for transverse energy.

use crate::detid::DetId;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Point in the global detector frame (cm).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate (along the beam axis).
    pub z: f64,
}

impl Point3 {
    /// Creates a new point.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance from the beam axis.
    #[inline]
    #[must_use]
    pub fn perp(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Pseudorapidity of the direction from the origin to this point.
    ///
    /// Points on the beam axis give an infinite pseudorapidity with the
    /// sign of `z`; the origin itself gives zero.
    #[must_use]
    pub fn eta(&self) -> f64 {
        let perp = self.perp();
        if perp == 0.0 {
            return match self.z.partial_cmp(&0.0) {
                Some(std::cmp::Ordering::Greater) => f64::INFINITY,
                Some(std::cmp::Ordering::Less) => f64::NEG_INFINITY,
                _ => 0.0,
            };
        }
        (self.z / perp).asinh()
    }
}

/// Factor converting energy at `point` into transverse energy: `1 / cosh(eta)`.
#[inline]
#[must_use]
pub fn transverse_factor(point: &Point3) -> f64 {
    1.0 / point.eta().cosh()
}

/// Position lookup for detector cells.
pub trait CaloGeometry: Send + Sync {
    /// Returns the position of a cell, if known.
    fn position(&self, id: DetId) -> Option<Point3>;
}

/// In-memory geometry keyed by raw identifier.
#[derive(Debug, Clone, Default)]
pub struct GeometryTable {
    positions: HashMap<DetId, Point3>,
}

impl GeometryTable {
    /// Creates an empty geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the position of a cell, replacing any previous one.
    pub fn insert(&mut self, id: DetId, position: Point3) {
        self.positions.insert(id, position);
    }

    /// Number of cells with a position.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no positions are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromIterator<(DetId, Point3)> for GeometryTable {
    fn from_iter<I: IntoIterator<Item = (DetId, Point3)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl CaloGeometry for GeometryTable {
    fn position(&self, id: DetId) -> Option<Point3> {
        self.positions.get(&id).copied()
    }
}
