//! Writers for weight tables and filter decisions.

use crate::Result;
use hepfilter_algorithms::VetoDecision;
use hepfilter_core::FlatTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Buffered writer for per-event outputs.
pub struct DataFileWriter {
    writer: BufWriter<File>,
}

impl DataFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Fails if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes one table per event as CSV.
    ///
    /// Columns are `event,row` followed by the table columns, taken from
    /// the first table. Values have the column precision hint applied.
    ///
    /// # Errors
    /// Fails on write errors.
    pub fn write_tables_csv(&mut self, tables: &[FlatTable]) -> Result<()> {
        write!(self.writer, "event,row")?;
        if let Some(first) = tables.first() {
            for column in first.columns() {
                write!(self.writer, ",{}", column.name)?;
            }
        }
        writeln!(self.writer)?;

        for (event, table) in tables.iter().enumerate() {
            let reduced: Vec<Vec<f32>> = table
                .columns()
                .iter()
                .map(|c| c.reduced_values())
                .collect();
            for row in 0..table.n_rows() {
                write!(self.writer, "{event},{row}")?;
                for values in &reduced {
                    write!(self.writer, ",{}", values[row])?;
                }
                writeln!(self.writer)?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes the tables as a JSON array, one entry per event.
    ///
    /// # Errors
    /// Fails on serialization or write errors.
    pub fn write_tables_json(&mut self, tables: &[FlatTable]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, tables)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes filter decisions as CSV.
    ///
    /// # Errors
    /// Fails on write errors.
    pub fn write_decisions_csv(&mut self, decisions: &[VetoDecision]) -> Result<()> {
        writeln!(self.writer, "event,pass,keep,cells_checked,cells_above_threshold")?;
        for (event, d) in decisions.iter().enumerate() {
            writeln!(
                self.writer,
                "{},{},{},{},{}",
                event, d.pass, d.keep, d.cells_checked, d.cells_above_threshold
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes filter decisions as a JSON array.
    ///
    /// # Errors
    /// Fails on serialization or write errors.
    pub fn write_decisions_json(&mut self, decisions: &[VetoDecision]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, decisions)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn table(values: Vec<f32>) -> FlatTable {
        let mut table = FlatTable::new(values.len(), "GenJet", false, true);
        table
            .add_float_column("w", values, "jet fragmentation weight: w", 10)
            .unwrap();
        table
    }

    #[test]
    fn test_write_tables_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();

        writer
            .write_tables_csv(&[table(vec![0.5, 0.0]), table(vec![]), table(vec![-0.25])])
            .unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["event,row,w", "0,0,0.5", "0,1,0", "2,0,-0.25"]);
    }

    #[test]
    fn test_write_empty_tables_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();
        writer.write_tables_csv(&[]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "event,row\n");
    }

    #[test]
    fn test_write_decisions_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();

        let decisions = vec![
            VetoDecision {
                pass: true,
                keep: true,
                cells_checked: 0,
                cells_above_threshold: 0,
            },
            VetoDecision {
                pass: false,
                keep: true,
                cells_checked: 2,
                cells_above_threshold: 1,
            },
        ];
        writer.write_decisions_csv(&decisions).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("event,pass,keep,cells_checked,cells_above_threshold\n"));
        assert!(content.contains("0,true,true,0,0"));
        assert!(content.contains("1,false,true,2,1"));
    }

    #[test]
    fn test_write_tables_json() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DataFileWriter::create(file.path()).unwrap();
        writer.write_tables_json(&[table(vec![0.5])]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let parsed: Vec<FlatTable> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].column("w").unwrap().values, vec![0.5]);
    }
}
