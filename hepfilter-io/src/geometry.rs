//! Geometry files: a JSON array of `{"id", "x", "y", "z"}` cell positions.

use crate::{Error, Result};
use hepfilter_core::{DetId, GeometryTable, Point3};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Position of one cell as stored on disk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CellPosition {
    /// Raw cell identifier.
    pub id: DetId,
    /// X coordinate (cm).
    pub x: f64,
    /// Y coordinate (cm).
    pub y: f64,
    /// Z coordinate (cm).
    pub z: f64,
}

/// Reads a geometry file.
///
/// # Errors
/// Fails on unreadable or malformed files, null identifiers, and cells
/// listed more than once.
pub fn read_geometry<P: AsRef<Path>>(path: P) -> Result<GeometryTable> {
    let file = File::open(path)?;
    let cells: Vec<CellPosition> = serde_json::from_reader(BufReader::new(file))?;

    let mut geometry = GeometryTable::new();
    for cell in cells {
        if cell.id.is_null() {
            return Err(Error::InvalidFormat(
                "geometry contains the null cell identifier".to_string(),
            ));
        }
        let before = geometry.len();
        geometry.insert(cell.id, Point3::new(cell.x, cell.y, cell.z));
        if geometry.len() == before {
            return Err(Error::InvalidFormat(format!(
                "cell {} listed more than once",
                cell.id
            )));
        }
    }
    debug!(cells = geometry.len(), "loaded geometry");
    Ok(geometry)
}
