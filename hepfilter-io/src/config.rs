//! Run configuration files.

use crate::Result;
use hepfilter_algorithms::{BadCellVetoConfig, WeightTableConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Configuration of both components. Missing sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Nearest-match weight table settings.
    pub weight_table: WeightTableConfig,
    /// Bad-cell filter settings.
    pub bad_cell_veto: BadCellVetoConfig,
}

/// Reads a JSON run configuration.
///
/// # Errors
/// Fails if the file cannot be read or does not match the schema.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "weight_table": {{"delta_r": 0.3, "weight_sources": ["p:w"], "cut": {{"min_pt": 15.0}}}},
                "bad_cell_veto": {{"ee_min_et": 25.0, "bad_det_ee": [0, 872423215], "tagging_mode": true}}
            }}"#
        )
        .unwrap();

        let config = read_config(file.path()).unwrap();
        assert_relative_eq!(config.weight_table.delta_r, 0.3);
        assert_eq!(config.weight_table.name, "GenJet");
        assert_eq!(config.weight_table.precision, 10);
        assert_relative_eq!(config.weight_table.cut.min_pt, 15.0);
        assert!(config.weight_table.cut.max_abs_eta.is_none());

        let veto = &config.bad_cell_veto;
        assert_relative_eq!(veto.ee_min_et, 25.0);
        assert_relative_eq!(veto.eb_min_et, 50.0);
        assert_eq!(veto.bad_det_ee, vec![0, 872_423_215]);
        assert!(veto.tagging_mode);
        assert!(!veto.debug);
    }

    #[test]
    fn test_empty_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        let config = read_config(file.path()).unwrap();
        assert!(config.weight_table.weight_sources.is_empty());
        assert!(config.bad_cell_veto.bad_det_eb.is_empty());
    }
}
