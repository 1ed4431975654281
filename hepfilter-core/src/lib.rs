//! hepfilter-core: Core types for per-event physics object processing.
//!
//! This crate provides the foundational abstractions shared by the
//! matching and veto algorithms: directions and the ΔR metric, positional
//! weight maps, calorimeter cell identifiers, cell positions and the flat
//! output table.
//!

pub mod detid;
pub mod error;
pub mod geometry;
pub mod kinematics;
pub mod rechit;
pub mod table;
pub mod weights;

pub use detid::{BarrelCell, DetId, EndcapCell, Subdetector};
pub use error::{Error, Result};
pub use geometry::{transverse_factor, CaloGeometry, GeometryTable, Point3};
pub use kinematics::{delta_phi, delta_r, delta_r2, reduce_range, Direction, GenJet, P4};
pub use rechit::{RecHit, RecHitCollection};
pub use table::{reduce_mantissa, Column, ColumnType, FlatTable};
pub use weights::WeightMap;
