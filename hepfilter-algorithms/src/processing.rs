//! Parallel helpers that run a component over many independent events.

use crate::bad_cell::{BadCellVeto, VetoDecision};
use crate::weight_table::{NearestMatchWeightTable, WeightInputs};
use hepfilter_core::error::Result;
use hepfilter_core::geometry::CaloGeometry;
use hepfilter_core::kinematics::Direction;
use hepfilter_core::rechit::RecHitCollection;
use hepfilter_core::table::FlatTable;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Borrowed inputs of the weight table for one event.
#[derive(Debug)]
pub struct MatchInput<'a, T, R> {
    /// Primary objects.
    pub primary: &'a [T],
    /// Reference objects.
    pub reference: &'a [R],
    /// Weight maps over `reference`.
    pub weights: &'a WeightInputs,
}

/// Borrowed inputs of the bad-cell filter for one event.
#[derive(Debug, Clone, Copy)]
pub struct VetoInput<'a> {
    /// Barrel measurements.
    pub eb_hits: &'a RecHitCollection,
    /// Endcap measurements.
    pub ee_hits: &'a RecHitCollection,
}

/// Builds one table per event in parallel. Output order follows input order.
///
/// # Errors
/// Returns the error of a failing event; no partial output is produced.
pub fn produce_tables<T, R>(
    producer: &NearestMatchWeightTable<T>,
    events: &[MatchInput<'_, T, R>],
) -> Result<Vec<FlatTable>>
where
    T: Direction,
    R: Direction,
{
    events
        .par_iter()
        .map(|event| producer.produce(event.primary, event.reference, event.weights))
        .collect()
}

/// Evaluates the filter on every event in parallel. Output order follows
/// input order.
///
/// # Errors
/// Returns the error of a failing event; no partial output is produced.
pub fn filter_events<G: CaloGeometry + ?Sized>(
    veto: &BadCellVeto,
    events: &[VetoInput<'_>],
    geometry: &G,
) -> Result<Vec<VetoDecision>> {
    events
        .par_iter()
        .map(|event| veto.filter(event.eb_hits, event.ee_hits, geometry))
        .collect()
}

/// Summary counts over a run of filter decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VetoStatistics {
    /// Events evaluated.
    pub events_processed: usize,
    /// Events whose recorded verdict is pass.
    pub events_passed: usize,
    /// Events propagated downstream.
    pub events_kept: usize,
}

impl VetoStatistics {
    /// Tallies a slice of decisions.
    #[must_use]
    pub fn from_decisions(decisions: &[VetoDecision]) -> Self {
        decisions.iter().fold(Self::default(), |mut stats, d| {
            stats.events_processed += 1;
            stats.events_passed += usize::from(d.pass);
            stats.events_kept += usize::from(d.keep);
            stats
        })
    }

    /// Events whose recorded verdict is fail.
    #[must_use]
    pub fn events_failed(&self) -> usize {
        self.events_processed - self.events_passed
    }
}
