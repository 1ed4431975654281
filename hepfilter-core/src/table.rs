//! Flat columnar output tables.
//!
//! A [`FlatTable`] holds one row per selected object and one named column
//! per quantity. Each column carries a documentation string and a precision
//! hint: the number of float mantissa bits worth keeping when the table is
//! written out.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of explicit mantissa bits in an IEEE-754 single.
const F32_MANTISSA_BITS: i32 = 23;

/// Column value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColumnType {
    /// Single-precision float column.
    Float,
}

/// A single named column.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Human-readable description.
    pub doc: String,
    /// Value type.
    pub column_type: ColumnType,
    /// Mantissa bits to keep on output (`<= 0` keeps full precision).
    pub precision: i32,
    /// Stored values, one per row.
    pub values: Vec<f32>,
}

impl Column {
    /// Values with the precision hint applied.
    #[must_use]
    pub fn reduced_values(&self) -> Vec<f32> {
        self.values
            .iter()
            .map(|&v| reduce_mantissa(v, self.precision))
            .collect()
    }
}

/// Table of per-object columns for one event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatTable {
    name: String,
    n_rows: usize,
    singleton: bool,
    extension: bool,
    columns: Vec<Column>,
}

impl FlatTable {
    /// Creates a table with a fixed number of rows and no columns.
    ///
    /// `singleton` tables hold exactly one event-level row; `extension`
    /// tables add columns to an existing table of the same name.
    #[must_use]
    pub fn new(n_rows: usize, name: impl Into<String>, singleton: bool, extension: bool) -> Self {
        Self {
            name: name.into(),
            n_rows,
            singleton,
            extension,
            columns: Vec::new(),
        }
    }

    /// Appends a float column.
    ///
    /// # Errors
    /// Fails if `values` does not have one entry per row or a column with
    /// the same name already exists.
    pub fn add_float_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f32>,
        doc: impl Into<String>,
        precision: i32,
    ) -> Result<()> {
        let name = name.into();
        if values.len() != self.n_rows {
            return Err(Error::ColumnLength {
                column: name,
                expected: self.n_rows,
                found: values.len(),
            });
        }
        if self.column(&name).is_some() {
            return Err(Error::DuplicateColumn(name));
        }
        self.columns.push(Column {
            name,
            doc: doc.into(),
            column_type: ColumnType::Float,
            precision,
            values,
        });
        Ok(())
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns true for a one-row event-level table.
    #[must_use]
    pub fn singleton(&self) -> bool {
        self.singleton
    }

    /// Returns true if the table extends an existing table.
    #[must_use]
    pub fn extension(&self) -> bool {
        self.extension
    }

    /// Columns in insertion order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of row `index` in column order.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<f32>> {
        if index >= self.n_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[index]).collect())
    }
}

/// Rounds `value` to the nearest float with `bits` mantissa bits, keeping
/// its exponent. Values whose kept mantissa is all ones are truncated.
///
/// `bits <= 0` or `bits >= 23` returns the value unchanged, as do NaN and
/// infinities.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn reduce_mantissa(value: f32, bits: i32) -> f32 {
    if bits <= 0 || bits >= F32_MANTISSA_BITS || !value.is_finite() {
        return value;
    }
    let shift = (F32_MANTISSA_BITS - bits) as u32;
    let mask = u32::MAX << shift;
    let half = 1u32 << (shift - 1);
    let raw = value.to_bits();
    let mantissa = (raw & 0x007F_FFFF) >> shift;
    // Round up only while the kept mantissa has room; an all-ones mantissa
    // is truncated so the exponent never changes.
    let reduced = if raw & half != 0 && mantissa < (1u32 << bits) - 1 {
        (raw & 0xFF80_0000) | ((mantissa + 1) << shift)
    } else {
        raw & mask
    };
    f32::from_bits(reduced)
}
