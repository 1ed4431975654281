//! Nearest-match weight table producer.
//!
//! For every selected jet, the closest jet in ΔR from a reference
//! collection is found. If it lies within the configured gate, each
//! configured weight source is read at the reference jet's position and
//! stored as a deviation from the neutral weight 1.0. Unmatched jets get
//! 0.0 in every column.

use hepfilter_core::error::{Error, Result};
use hepfilter_core::kinematics::{delta_r, Direction, GenJet};
use hepfilter_core::table::FlatTable;
use hepfilter_core::weights::WeightMap;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Starting value of the running minimum distance.
///
/// Larger than any realizable ΔR.
pub const NO_MATCH_DISTANCE: f64 = 999.0;

/// Weight value stored as zero in the output.
const NEUTRAL_WEIGHT: f64 = 1.0;

/// Weight maps by configured source identifier.
pub type WeightInputs = HashMap<String, WeightMap>;

/// Compiled selection predicate over primary objects.
pub type Selector<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Simple kinematic selection on generator jets.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KinematicCut {
    /// Minimum transverse momentum (GeV).
    pub min_pt: f64,
    /// Maximum |eta|, unbounded if unset.
    pub max_abs_eta: Option<f64>,
}

impl Default for KinematicCut {
    fn default() -> Self {
        Self {
            min_pt: 0.0,
            max_abs_eta: None,
        }
    }
}

impl KinematicCut {
    /// Returns true if the jet passes the cut.
    #[must_use]
    pub fn accepts(&self, jet: &GenJet) -> bool {
        jet.pt() >= self.min_pt && self.max_abs_eta.map_or(true, |max| jet.eta().abs() <= max)
    }
}

/// Weight table configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeightTableConfig {
    /// Output table name.
    pub name: String,
    /// Selection applied to primary jets.
    pub cut: KinematicCut,
    /// Matching gate; a match needs ΔR strictly below it.
    pub delta_r: f64,
    /// Mantissa bits kept for every output column.
    pub precision: i32,
    /// Weight sources as `module:instance[:process]` tags, in column order.
    pub weight_sources: Vec<String>,
    /// Prefix of each column's documentation string.
    pub doc_prefix: String,
}

impl Default for WeightTableConfig {
    fn default() -> Self {
        Self {
            name: "GenJet".to_string(),
            cut: KinematicCut::default(),
            delta_r: 0.1,
            precision: 10,
            weight_sources: Vec::new(),
            doc_prefix: "jet fragmentation weight: ".to_string(),
        }
    }
}

impl WeightTableConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output table name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the primary selection.
    #[must_use]
    pub fn with_cut(mut self, cut: KinematicCut) -> Self {
        self.cut = cut;
        self
    }

    /// Sets the matching gate.
    #[must_use]
    pub fn with_delta_r(mut self, delta_r: f64) -> Self {
        self.delta_r = delta_r;
        self
    }

    /// Sets the precision hint.
    #[must_use]
    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }

    /// Appends a weight source tag.
    #[must_use]
    pub fn with_weight_source(mut self, tag: impl Into<String>) -> Self {
        self.weight_sources.push(tag.into());
        self
    }
}

/// Column name for a `module:instance[:process]` tag.
///
/// The instance label names the column; a tag without one falls back to
/// the module label.
///
/// # Errors
/// Fails if the module label is empty.
pub fn column_label(tag: &str) -> Result<String> {
    let mut parts = tag.split(':');
    let module = parts.next().unwrap_or_default().trim();
    if module.is_empty() {
        return Err(Error::ConfigError(format!(
            "weight source '{tag}' has no module label"
        )));
    }
    let label = match parts.next().map(str::trim) {
        Some(instance) if !instance.is_empty() => instance,
        _ => module,
    };
    Ok(label.to_string())
}

struct WeightSource {
    tag: String,
    column: String,
}

/// Matches selected jets to a reference collection and tabulates weights.
pub struct NearestMatchWeightTable<T = GenJet> {
    name: String,
    selector: Selector<T>,
    delta_r: f64,
    precision: i32,
    doc_prefix: String,
    sources: Vec<WeightSource>,
}

impl NearestMatchWeightTable<GenJet> {
    /// Creates a producer that selects jets with the configured cut.
    ///
    /// # Errors
    /// Fails on malformed or duplicate weight-source labels.
    pub fn new(config: WeightTableConfig) -> Result<Self> {
        let cut = config.cut.clone();
        Self::with_selector(config, move |jet: &GenJet| cut.accepts(jet))
    }
}

impl<T: Direction> NearestMatchWeightTable<T> {
    /// Creates a producer with an arbitrary selection predicate.
    ///
    /// The `cut` field of the configuration is ignored.
    ///
    /// # Errors
    /// Fails on malformed or duplicate weight-source labels, or a NaN gate.
    pub fn with_selector<F>(config: WeightTableConfig, selector: F) -> Result<Self>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        if config.delta_r.is_nan() {
            return Err(Error::ConfigError("delta_r must be a number".to_string()));
        }

        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(config.weight_sources.len());
        for tag in config.weight_sources {
            let column = column_label(&tag)?;
            if !seen.insert(column.clone()) {
                return Err(Error::ConfigError(format!(
                    "weight source '{tag}' duplicates column '{column}'"
                )));
            }
            sources.push(WeightSource { tag, column });
        }

        Ok(Self {
            name: config.name,
            selector: Box::new(selector),
            delta_r: config.delta_r,
            precision: config.precision,
            doc_prefix: config.doc_prefix,
            sources,
        })
    }

    /// Output table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in output order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.column.as_str())
    }

    /// Returns true if the primary object passes the selection.
    pub fn selects(&self, object: &T) -> bool {
        (self.selector)(object)
    }

    /// Closest reference object and its distance.
    ///
    /// Ties keep the earliest reference object. Returns `None` for an empty
    /// reference collection or if no distance is below [`NO_MATCH_DISTANCE`].
    pub fn best_match<R: Direction>(object: &T, reference: &[R]) -> Option<(usize, f64)> {
        let mut best: Option<usize> = None;
        let mut best_dr = NO_MATCH_DISTANCE;
        for (idx, candidate) in reference.iter().enumerate() {
            let dr = delta_r(object, candidate);
            if dr < best_dr {
                best_dr = dr;
                best = Some(idx);
            }
        }
        best.map(|idx| (idx, best_dr))
    }

    /// Builds the weight table for one event.
    ///
    /// # Errors
    /// Fails if a configured source is absent from `weights`, or if a
    /// matched reference object has no entry in one of the sources.
    #[allow(clippy::cast_possible_truncation)]
    pub fn produce<R: Direction>(
        &self,
        primary: &[T],
        reference: &[R],
        weights: &WeightInputs,
    ) -> Result<FlatTable> {
        let maps = self
            .sources
            .iter()
            .map(|source| {
                weights.get(&source.tag).ok_or_else(|| {
                    Error::ConfigError(format!("weight source '{}' not provided", source.tag))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut columns: Vec<Vec<f32>> = vec![Vec::new(); self.sources.len()];
        let mut n_selected = 0usize;
        let mut n_matched = 0usize;

        for object in primary.iter().filter(|object| self.selects(object)) {
            n_selected += 1;

            let matched = Self::best_match(object, reference).filter(|&(_, dr)| dr < self.delta_r);
            match matched {
                Some((idx, _)) => {
                    n_matched += 1;
                    for ((source, map), column) in
                        self.sources.iter().zip(&maps).zip(columns.iter_mut())
                    {
                        let weight = map.get(idx).ok_or_else(|| Error::MissingWeight {
                            source_name: source.tag.clone(),
                            index: idx,
                        })?;
                        column.push((f64::from(weight) - NEUTRAL_WEIGHT) as f32);
                    }
                }
                None => {
                    for column in &mut columns {
                        column.push(0.0);
                    }
                }
            }
        }

        debug!(
            table = %self.name,
            selected = n_selected,
            matched = n_matched,
            "built weight table"
        );

        let mut table = FlatTable::new(n_selected, self.name.clone(), false, true);
        for (source, values) in self.sources.iter().zip(columns) {
            table.add_float_column(
                source.column.clone(),
                values,
                format!("{}{}", self.doc_prefix, source.column),
                self.precision,
            )?;
        }
        Ok(table)
    }
}
