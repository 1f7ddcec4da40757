//! Rectangular integer matrices

use std::fmt;
use thiserror::Error;

/// Continuation rows line up under the first one after the `>> ` output marker
const ROW_SEPARATOR: &str = "\n   ";

/// Why a matrix could not be built or multiplied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("a matrix needs at least one row")]
    Empty,

    #[error("matrix row {row} is empty")]
    EmptyRow { row: usize },

    #[error("matrix row {row} has {found} entries, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("cannot multiply a {left_rows}x{left_cols} matrix by a {right_rows}x{right_cols} matrix")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error("integer overflow in matrix product")]
    Overflow,
}

/// Matrix of integers; every row has the same length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: Vec<Vec<i64>>,
}

impl Matrix {
    /// Build a matrix, rejecting empty and ragged row sets
    pub fn new(rows: Vec<Vec<i64>>) -> Result<Self, MatrixError> {
        let expected = rows.first().map(Vec::len).ok_or(MatrixError::Empty)?;
        for (index, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(MatrixError::EmptyRow { row: index + 1 });
            }
            if row.len() != expected {
                return Err(MatrixError::Ragged {
                    row: index + 1,
                    expected,
                    found: row.len(),
                });
            }
        }
        Ok(Matrix { rows })
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.rows[0].len())
    }

    /// Row-by-column product
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        let (n, k) = self.shape();
        let (k2, m) = other.shape();
        if k != k2 {
            return Err(MatrixError::DimensionMismatch {
                left_rows: n,
                left_cols: k,
                right_rows: k2,
                right_cols: m,
            });
        }

        let mut rows = Vec::with_capacity(n);
        for row in &self.rows {
            let mut out = Vec::with_capacity(m);
            for col in 0..m {
                let mut acc: i64 = 0;
                for (j, a) in row.iter().enumerate() {
                    acc = a
                        .checked_mul(other.rows[j][col])
                        .and_then(|p| acc.checked_add(p))
                        .ok_or(MatrixError::Overflow)?;
                }
                out.push(acc);
            }
            rows.push(out);
        }
        Ok(Matrix { rows })
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str(ROW_SEPARATOR)?;
            }
            let entries: Vec<String> = row.iter().map(i64::to_string).collect();
            write!(f, "[ {} ]", entries.join(" , "))?;
        }
        Ok(())
    }
}
