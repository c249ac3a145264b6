//! Payoff matrix

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;

/// Hider's payoff for every (hider location, seeker location) pair.
///
/// Rows belong to the Hider, columns to the Seeker. Non-empty,
/// rectangular and finite by construction; (de)serialises as nested rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct PayoffMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<f64>,
}

impl PayoffMatrix {
    /// `rows × cols` matrix with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::Empty);
        }
        if !value.is_finite() {
            return Err(MatrixError::NonFinite { row: 0, col: 0 });
        }
        Ok(Self { rows, cols, entries: vec![value; rows * cols] })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(MatrixError::Empty);
        }
        let mut entries = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::Ragged { row: r, expected: cols, found: row.len() });
            }
            if let Some(c) = row.iter().position(|v| !v.is_finite()) {
                return Err(MatrixError::NonFinite { row: r, col: c });
            }
            entries.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, entries })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.entries[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().skip(col).step_by(self.cols).copied()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.entries.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }

    /// Callers guarantee non-zero dimensions.
    pub(crate) fn zeroed(rows: usize, cols: usize) -> Self {
        debug_assert!(rows > 0 && cols > 0);
        Self { rows, cols, entries: vec![0.0; rows * cols] }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.entries[row * self.cols + col] = value;
    }

    pub(crate) fn scale(&mut self, row: usize, col: usize, factor: f64) {
        self.entries[row * self.cols + col] *= factor;
    }
}

impl TryFrom<Vec<Vec<f64>>> for PayoffMatrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<PayoffMatrix> for Vec<Vec<f64>> {
    fn from(matrix: PayoffMatrix) -> Self {
        matrix.to_rows()
    }
}
