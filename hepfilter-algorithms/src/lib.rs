//! hepfilter-algorithms: Per-event producers and filters.
//!
//! This crate provides the two per-event components:
//! - **NearestMatchWeightTable** - ΔR matching of selected jets to a
//!   reference collection with per-object weight lookup
//! - **BadCellVeto** - event rejection when flagged calorimeter cells carry
//!   transverse energy above threshold
//!
//! plus helpers that run either component over many events in parallel.
//!
#![warn(missing_docs)]

mod bad_cell;
mod processing;
mod weight_table;

pub use bad_cell::{BadCellVeto, BadCellVetoConfig, VetoDecision};
pub use processing::{filter_events, produce_tables, MatchInput, VetoInput, VetoStatistics};
pub use weight_table::{
    column_label, KinematicCut, NearestMatchWeightTable, Selector, WeightInputs,
    WeightTableConfig, NO_MATCH_DISTANCE,
};

// Re-export core types used in the public signatures
pub use hepfilter_core::{FlatTable, RecHitCollection, WeightMap};
