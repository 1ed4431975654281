//! Calorimeter bad-cell event filter.
//!
//! Cells with known-bad calibration are listed per region. An event fails
//! when any listed cell has a measurement whose transverse energy exceeds
//! the region threshold. Every listed cell is evaluated even after the
//! event has failed, so diagnostics cover all offending cells.

use hepfilter_core::detid::{BarrelCell, DetId, EndcapCell, Subdetector};
use hepfilter_core::error::{Error, Result};
use hepfilter_core::geometry::{transverse_factor, CaloGeometry};
use hepfilter_core::rechit::RecHitCollection;
use tracing::{info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bad-cell filter configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BadCellVetoConfig {
    /// Barrel transverse-energy threshold (GeV).
    pub eb_min_et: f64,
    /// Endcap transverse-energy threshold (GeV).
    pub ee_min_et: f64,
    /// Raw identifiers of flagged barrel cells.
    pub bad_det_eb: Vec<u32>,
    /// Raw identifiers of flagged endcap cells.
    pub bad_det_ee: Vec<u32>,
    /// Keep every event and only record the verdict.
    pub tagging_mode: bool,
    /// Log every evaluated cell.
    pub debug: bool,
    /// Evaluate only the endcap list.
    pub endcap_only: bool,
}

impl Default for BadCellVetoConfig {
    fn default() -> Self {
        Self {
            eb_min_et: 50.0,
            ee_min_et: 50.0,
            bad_det_eb: Vec::new(),
            bad_det_ee: Vec::new(),
            tagging_mode: false,
            debug: false,
            endcap_only: false,
        }
    }
}

impl BadCellVetoConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the barrel threshold.
    #[must_use]
    pub fn with_eb_min_et(mut self, threshold: f64) -> Self {
        self.eb_min_et = threshold;
        self
    }

    /// Sets the endcap threshold.
    #[must_use]
    pub fn with_ee_min_et(mut self, threshold: f64) -> Self {
        self.ee_min_et = threshold;
        self
    }

    /// Sets the flagged barrel cells.
    #[must_use]
    pub fn with_bad_det_eb(mut self, ids: Vec<u32>) -> Self {
        self.bad_det_eb = ids;
        self
    }

    /// Sets the flagged endcap cells.
    #[must_use]
    pub fn with_bad_det_ee(mut self, ids: Vec<u32>) -> Self {
        self.bad_det_ee = ids;
        self
    }

    /// Sets tagging mode.
    #[must_use]
    pub fn with_tagging_mode(mut self, tagging: bool) -> Self {
        self.tagging_mode = tagging;
        self
    }

    /// Sets per-cell debug logging.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Restricts evaluation to the endcap list.
    #[must_use]
    pub fn with_endcap_only(mut self, endcap_only: bool) -> Self {
        self.endcap_only = endcap_only;
        self
    }
}

/// Outcome of the filter for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VetoDecision {
    /// Recorded verdict: false if any flagged cell was above threshold.
    pub pass: bool,
    /// Whether the event continues down the pipeline.
    pub keep: bool,
    /// Flagged cells that had a measurement and were evaluated.
    pub cells_checked: usize,
    /// Evaluated cells above their region threshold.
    pub cells_above_threshold: usize,
}

struct Region {
    subdetector: Subdetector,
    threshold: f64,
    cells: Vec<DetId>,
}

#[derive(Default)]
struct Scan {
    checked: usize,
    above: usize,
}

/// Event filter on flagged calorimeter cells.
pub struct BadCellVeto {
    barrel: Region,
    endcap: Region,
    tagging_mode: bool,
    debug: bool,
    endcap_only: bool,
}

impl BadCellVeto {
    /// Creates the filter.
    ///
    /// # Errors
    /// Fails if a threshold is NaN.
    pub fn new(config: BadCellVetoConfig) -> Result<Self> {
        if config.eb_min_et.is_nan() || config.ee_min_et.is_nan() {
            return Err(Error::ConfigError(
                "transverse-energy thresholds must be numbers".to_string(),
            ));
        }
        Ok(Self {
            barrel: Region {
                subdetector: Subdetector::Barrel,
                threshold: config.eb_min_et,
                cells: config.bad_det_eb.into_iter().map(DetId::new).collect(),
            },
            endcap: Region {
                subdetector: Subdetector::Endcap,
                threshold: config.ee_min_et,
                cells: config.bad_det_ee.into_iter().map(DetId::new).collect(),
            },
            tagging_mode: config.tagging_mode,
            debug: config.debug,
            endcap_only: config.endcap_only,
        })
    }

    /// Returns true if failing events are kept.
    #[must_use]
    pub fn tagging_mode(&self) -> bool {
        self.tagging_mode
    }

    /// Evaluates one event.
    ///
    /// # Errors
    /// Fails if the geometry has no position for a flagged cell that
    /// carries a measurement.
    pub fn filter<G: CaloGeometry + ?Sized>(
        &self,
        eb_hits: &RecHitCollection,
        ee_hits: &RecHitCollection,
        geometry: &G,
    ) -> Result<VetoDecision> {
        let mut scan = Scan::default();

        self.scan_region(&self.endcap, ee_hits, geometry, &mut scan)?;
        if !self.endcap_only {
            self.scan_region(&self.barrel, eb_hits, geometry, &mut scan)?;
        }

        let pass = scan.above == 0;
        if !pass && self.debug {
            info!(cells = scan.above, "rejecting event");
        }

        Ok(VetoDecision {
            pass,
            keep: self.tagging_mode || pass,
            cells_checked: scan.checked,
            cells_above_threshold: scan.above,
        })
    }

    fn scan_region<G: CaloGeometry + ?Sized>(
        &self,
        region: &Region,
        hits: &RecHitCollection,
        geometry: &G,
        scan: &mut Scan,
    ) -> Result<()> {
        for &id in &region.cells {
            if id.is_null() {
                continue;
            }
            let Some(hit) = hits.find(id) else {
                continue;
            };

            let position = geometry.position(id).ok_or(Error::UnknownPosition(id))?;
            let et = f64::from(hit.energy) * transverse_factor(&position);
            scan.checked += 1;

            if self.debug {
                info!(
                    region = %region.subdetector,
                    det_id = %id,
                    cell = %describe_cell(id, region.subdetector),
                    et,
                    threshold = region.threshold,
                    "flagged cell"
                );
            }

            if et > region.threshold {
                scan.above += 1;
                warn!(
                    region = %region.subdetector,
                    det_id = %id,
                    et,
                    threshold = region.threshold,
                    "flagged cell above threshold"
                );
            }
        }
        Ok(())
    }
}

fn describe_cell(id: DetId, subdetector: Subdetector) -> String {
    match subdetector {
        Subdetector::Endcap => EndcapCell::from_id(id).map_or_else(
            || "undecodable".to_string(),
            |c| format!("ix={} iy={} iz={}", c.ix, c.iy, c.zside),
        ),
        Subdetector::Barrel => BarrelCell::from_id(id).map_or_else(
            || "undecodable".to_string(),
            |c| format!("ieta={} iphi={}", c.ieta, c.iphi),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hepfilter_core::geometry::{GeometryTable, Point3};
    use hepfilter_core::rechit::RecHit;

    fn endcap_id() -> DetId {
        EndcapCell::new(40, 50, 1).id()
    }

    fn barrel_id() -> DetId {
        BarrelCell::new(10, 100).id()
    }

    // Both cells sit in the transverse plane, so Et equals energy.
    fn geometry() -> GeometryTable {
        [
            (endcap_id(), Point3::new(100.0, 0.0, 0.0)),
            (barrel_id(), Point3::new(0.0, 129.0, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    fn hits(id: DetId, energy: f32) -> RecHitCollection {
        RecHitCollection::from(vec![RecHit::new(id, energy)])
    }

    #[test]
    fn test_config_defaults() {
        let config = BadCellVetoConfig::default();
        assert!((config.eb_min_et - 50.0).abs() < f64::EPSILON);
        assert!((config.ee_min_et - 50.0).abs() < f64::EPSILON);
        assert!(!config.tagging_mode);
        assert!(!config.debug);
        assert!(!config.endcap_only);
    }

    #[test]
    fn test_sentinel_then_hot_cell_fails() {
        let config = BadCellVetoConfig::new()
            .with_ee_min_et(3.0)
            .with_bad_det_ee(vec![0, endcap_id().raw()]);
        let veto = BadCellVeto::new(config).unwrap();

        let decision = veto
            .filter(&RecHitCollection::new(), &hits(endcap_id(), 5.0), &geometry())
            .unwrap();
        assert!(!decision.pass);
        assert!(!decision.keep);
        assert_eq!(decision.cells_checked, 1);
        assert_eq!(decision.cells_above_threshold, 1);
    }

    #[test]
    fn test_tagging_mode_keeps_failed_event() {
        let config = BadCellVetoConfig::new()
            .with_ee_min_et(3.0)
            .with_bad_det_ee(vec![0, endcap_id().raw()])
            .with_tagging_mode(true);
        let veto = BadCellVeto::new(config).unwrap();

        let decision = veto
            .filter(&RecHitCollection::new(), &hits(endcap_id(), 5.0), &geometry())
            .unwrap();
        assert!(!decision.pass);
        assert!(decision.keep);
    }

    #[test]
    fn test_missing_hit_is_skipped() {
        let config = BadCellVetoConfig::new()
            .with_ee_min_et(3.0)
            .with_bad_det_ee(vec![endcap_id().raw()]);
        let veto = BadCellVeto::new(config).unwrap();

        let other = EndcapCell::new(41, 50, 1).id();
        let decision = veto
            .filter(&RecHitCollection::new(), &hits(other, 500.0), &geometry())
            .unwrap();
        assert!(decision.pass);
        assert_eq!(decision.cells_checked, 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = BadCellVetoConfig::new()
            .with_ee_min_et(5.0)
            .with_bad_det_ee(vec![endcap_id().raw()]);
        let veto = BadCellVeto::new(config).unwrap();

        let decision = veto
            .filter(&RecHitCollection::new(), &hits(endcap_id(), 5.0), &geometry())
            .unwrap();
        assert!(decision.pass);
        assert_eq!(decision.cells_checked, 1);
    }

    #[test]
    fn test_barrel_region_uses_own_collection() {
        let config = BadCellVetoConfig::new()
            .with_eb_min_et(3.0)
            .with_bad_det_eb(vec![barrel_id().raw()]);
        let veto = BadCellVeto::new(config).unwrap();

        // Hot barrel cell placed in the endcap collection is not found.
        let misplaced = veto
            .filter(&RecHitCollection::new(), &hits(barrel_id(), 10.0), &geometry())
            .unwrap();
        assert!(misplaced.pass);

        let decision = veto
            .filter(&hits(barrel_id(), 10.0), &RecHitCollection::new(), &geometry())
            .unwrap();
        assert!(!decision.pass);
    }

    #[test]
    fn test_endcap_only_ignores_barrel() {
        let config = BadCellVetoConfig::new()
            .with_eb_min_et(3.0)
            .with_bad_det_eb(vec![barrel_id().raw()])
            .with_endcap_only(true);
        let veto = BadCellVeto::new(config).unwrap();

        let decision = veto
            .filter(&hits(barrel_id(), 10.0), &RecHitCollection::new(), &geometry())
            .unwrap();
        assert!(decision.pass);
        assert_eq!(decision.cells_checked, 0);
    }

    #[test]
    fn test_all_cells_scanned_after_failure() {
        let second = EndcapCell::new(60, 50, -1).id();
        let mut geo = geometry();
        geo.insert(second, Point3::new(-100.0, 0.0, 0.0));
        let config = BadCellVetoConfig::new()
            .with_ee_min_et(1.0)
            .with_bad_det_ee(vec![endcap_id().raw(), second.raw()]);
        let veto = BadCellVeto::new(config).unwrap();

        let ee = RecHitCollection::from(vec![
            RecHit::new(endcap_id(), 2.0),
            RecHit::new(second, 3.0),
        ]);
        let decision = veto.filter(&RecHitCollection::new(), &ee, &geo).unwrap();
        assert!(!decision.pass);
        assert_eq!(decision.cells_checked, 2);
        assert_eq!(decision.cells_above_threshold, 2);
    }

    #[test]
    fn test_forward_cell_uses_transverse_energy() {
        // eta ~ 2.3: 100 GeV deposit has Et of about 20 GeV.
        let id = endcap_id();
        let geo: GeometryTable = [(id, Point3::new(30.0, 0.0, 150.0))].into_iter().collect();
        let config = BadCellVetoConfig::new()
            .with_ee_min_et(25.0)
            .with_bad_det_ee(vec![id.raw()]);
        let veto = BadCellVeto::new(config).unwrap();

        let decision = veto
            .filter(&RecHitCollection::new(), &hits(id, 100.0), &geo)
            .unwrap();
        assert!(decision.pass);
    }

    #[test]
    fn test_unknown_position_is_fatal() {
        let config = BadCellVetoConfig::new().with_bad_det_ee(vec![endcap_id().raw()]);
        let veto = BadCellVeto::new(config).unwrap();

        let err = veto
            .filter(
                &RecHitCollection::new(),
                &hits(endcap_id(), 1.0),
                &GeometryTable::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnknownPosition(id) if id == endcap_id()));
    }

    #[test]
    fn test_debug_mode_matches_silent_run() {
        // Detector code 1 is not a calorimeter cell and cannot be decoded.
        let foreign = DetId::new(0x1000_0001);
        let mut geo = geometry();
        geo.insert(foreign, Point3::new(0.0, -100.0, 0.0));

        let config = BadCellVetoConfig::new()
            .with_ee_min_et(3.0)
            .with_eb_min_et(3.0)
            .with_bad_det_ee(vec![endcap_id().raw(), foreign.raw()])
            .with_bad_det_eb(vec![barrel_id().raw()]);
        let silent = BadCellVeto::new(config.clone()).unwrap();
        let verbose = BadCellVeto::new(config.with_debug(true)).unwrap();

        let eb = hits(barrel_id(), 2.0);
        let ee = RecHitCollection::from(vec![
            RecHit::new(endcap_id(), 4.0),
            RecHit::new(foreign, 6.0),
        ]);

        let expected = silent.filter(&eb, &ee, &geo).unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        let decision = tracing::subscriber::with_default(subscriber, || {
            verbose.filter(&eb, &ee, &geo).unwrap()
        });
        assert_eq!(decision, expected);
        assert!(!decision.pass);
        assert_eq!(decision.cells_checked, 3);
        assert_eq!(decision.cells_above_threshold, 2);
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let config = BadCellVetoConfig::new().with_eb_min_et(f64::NAN);
        assert!(BadCellVeto::new(config).is_err());
    }

    #[test]
    fn test_describe_cell() {
        assert_eq!(
            describe_cell(endcap_id(), Subdetector::Endcap),
            "ix=40 iy=50 iz=1"
        );
        assert_eq!(
            describe_cell(barrel_id(), Subdetector::Barrel),
            "ieta=10 iphi=100"
        );
        assert_eq!(describe_cell(DetId::new(1), Subdetector::Barrel), "undecodable");
    }
}
