//! Event files.
//!
//! An event file is a JSON array with one object per event. Every field is
//! optional and defaults to an empty collection:
//!
//! ```json
//! [{
//!   "gen_jets": [{"pt": 30.0, "eta": 0.1, "phi": 0.1}],
//!   "gen_jets_with_nu": [{"pt": 31.0, "eta": 0.1, "phi": 0.1}],
//!   "weights": {"bfragWgtProducer:fragCP5BL": [1.05]},
//!   "eb_rec_hits": [],
//!   "ee_rec_hits": [{"id": 872431745, "energy": 5.0}]
//! }]
//! ```

use crate::Result;
use hepfilter_algorithms::{MatchInput, VetoInput, WeightInputs};
use hepfilter_core::{GenJet, RecHit, RecHitCollection, WeightMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Event as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    /// Primary jets.
    pub gen_jets: Vec<GenJet>,
    /// Reference jets, including neutrinos in the clustering.
    pub gen_jets_with_nu: Vec<GenJet>,
    /// Weight maps over `gen_jets_with_nu`, by source tag.
    pub weights: HashMap<String, WeightMap>,
    /// Barrel measurements.
    pub eb_rec_hits: Vec<RecHit>,
    /// Endcap measurements.
    pub ee_rec_hits: Vec<RecHit>,
}

/// Event ready for processing.
#[derive(Debug, Clone, Default)]
pub struct Event {
    /// Primary jets.
    pub gen_jets: Vec<GenJet>,
    /// Reference jets.
    pub gen_jets_with_nu: Vec<GenJet>,
    /// Weight maps over `gen_jets_with_nu`.
    pub weights: WeightInputs,
    /// Barrel measurements, sorted for lookup.
    pub eb_hits: RecHitCollection,
    /// Endcap measurements, sorted for lookup.
    pub ee_hits: RecHitCollection,
}

impl Event {
    /// Inputs of the weight table.
    #[must_use]
    pub fn match_input(&self) -> MatchInput<'_, GenJet, GenJet> {
        MatchInput {
            primary: &self.gen_jets,
            reference: &self.gen_jets_with_nu,
            weights: &self.weights,
        }
    }

    /// Inputs of the bad-cell filter.
    #[must_use]
    pub fn veto_input(&self) -> VetoInput<'_> {
        VetoInput {
            eb_hits: &self.eb_hits,
            ee_hits: &self.ee_hits,
        }
    }
}

impl From<EventRecord> for Event {
    fn from(record: EventRecord) -> Self {
        Self {
            gen_jets: record.gen_jets,
            gen_jets_with_nu: record.gen_jets_with_nu,
            weights: record.weights,
            eb_hits: RecHitCollection::from(record.eb_rec_hits),
            ee_hits: RecHitCollection::from(record.ee_rec_hits),
        }
    }
}

/// Reads all events from a JSON event file.
///
/// # Errors
/// Fails if the file cannot be opened or is not a JSON array of events.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let file = File::open(path)?;
    let records: Vec<EventRecord> = serde_json::from_reader(BufReader::new(file))?;
    Ok(records.into_iter().map(Event::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hepfilter_core::DetId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_events() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{
                    "gen_jets": [{{"pt": 30.0, "eta": 0.1, "phi": 0.1}}],
                    "gen_jets_with_nu": [{{"pt": 31.0, "eta": 0.1, "phi": 0.1, "mass": 2.0, "constituents": 12}}],
                    "weights": {{"p:w": [1.05]}},
                    "ee_rec_hits": [{{"id": 20, "energy": 2.0}}, {{"id": 10, "energy": 1.0}}]
                }},
                {{}}
            ]"#
        )
        .unwrap();

        let events = read_events(file.path()).unwrap();
        assert_eq!(events.len(), 2);

        let first = &events[0];
        assert_eq!(first.gen_jets.len(), 1);
        assert_eq!(first.gen_jets_with_nu[0].constituents, 12);
        assert_eq!(first.weights["p:w"].get(0), Some(1.05));
        assert!(first.eb_hits.is_empty());
        assert_eq!(first.ee_hits.find(DetId::new(10)).map(|h| h.energy), Some(1.0));

        let input = first.match_input();
        assert_eq!(input.primary.len(), 1);
        assert_eq!(input.reference.len(), 1);

        assert!(events[1].gen_jets.is_empty());
        assert!(events[1].veto_input().ee_hits.is_empty());
    }

    #[test]
    fn test_read_events_rejects_non_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"gen_jets": []}}"#).unwrap();
        assert!(matches!(read_events(file.path()), Err(crate::Error::Json(_))));
    }
}
