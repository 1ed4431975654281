//! Calorimeter cell measurements.

use crate::detid::DetId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reconstructed energy deposit in one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecHit {
    /// Cell identifier.
    pub id: DetId,
    /// Reconstructed energy (GeV).
    pub energy: f32,
}

impl RecHit {
    /// Creates a new measurement.
    #[inline]
    #[must_use]
    pub fn new(id: DetId, energy: f32) -> Self {
        Self { id, energy }
    }
}

/// Measurements sorted by identifier for exact lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecHitCollection {
    hits: Vec<RecHit>,
}

impl RecHitCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the measurement for `id`. Only exact matches are returned.
    #[must_use]
    pub fn find(&self, id: DetId) -> Option<&RecHit> {
        self.hits
            .binary_search_by_key(&id, |hit| hit.id)
            .ok()
            .map(|pos| &self.hits[pos])
    }

    /// Number of measurements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if there are no measurements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterates in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &RecHit> {
        self.hits.iter()
    }
}

impl From<Vec<RecHit>> for RecHitCollection {
    fn from(mut hits: Vec<RecHit>) -> Self {
        hits.sort_by_key(|hit| hit.id);
        Self { hits }
    }
}

impl FromIterator<RecHit> for RecHitCollection {
    fn from_iter<I: IntoIterator<Item = RecHit>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
