//! Positional per-object weight maps.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar weights keyed by position in a reference collection.
///
/// Entry `i` belongs to the `i`-th object of the collection the map was
/// produced for. The mapping is positional, not content-addressed: the
/// caller must supply the same collection ordering to the consumer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WeightMap {
    values: Vec<f32>,
}

impl WeightMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the weight for the reference object at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Appends the weight for the next reference object.
    pub fn push(&mut self, weight: f32) {
        self.values.push(weight);
    }

    /// Number of reference objects with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<f32>> for WeightMap {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

impl FromIterator<f32> for WeightMap {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
