//! hepfilter-io: File I/O for hepfilter.
//!
//! This crate reads event, geometry and configuration files (JSON) and
//! writes weight tables and filter decisions (CSV or JSON).
//!

mod config;
mod error;
mod event;
mod geometry;
mod writer;

pub use config::{read_config, RunConfig};
pub use error::{Error, Result};
pub use event::{read_events, Event, EventRecord};
pub use geometry::{read_geometry, CellPosition};
pub use writer::DataFileWriter;
