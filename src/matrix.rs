//! Integer matrix algebra for the matrix-substitution path.
//!
//! Multiplication is exact. Division is deliberately not: the format
//! defines `divide(target, b)` as a randomized search for *any* integer
//! matrix whose product with `b` equals `target`, growing the entry
//! bound until a candidate passes. The result is some valid solution,
//! not necessarily the matrix the encoder started from, and callers
//! must not assume determinism across runs. Replacing the search with
//! elimination would change which solutions can be observed.

use rand::Rng;
use thiserror::Error;

use crate::search::{SearchBudget, SearchExhausted};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix shape mismatch: {left_rows}x{left_cols} cannot multiply {right_rows}x{right_cols}")]
    ShapeMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },
    #[error("malformed matrix literal: {0:?}")]
    BadLiteral(String),
    #[error(transparent)]
    Exhausted(#[from] SearchExhausted),
}

/// Row-major integer matrix. Entries in this format stay tiny (token
/// code points times single-digit key entries), so `i64` is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: Vec<Vec<i64>>,
}

impl Matrix {
    /// Build from rows. Rows must be non-empty and of equal length.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self, MatrixError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return Err(MatrixError::BadLiteral(format!("{rows:?}")));
        }
        Ok(Matrix { rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows[0].len()
    }

    pub fn row(&self, i: usize) -> &[i64] {
        &self.rows[i]
    }

    /// Per-document 3x3 matrix key with entries drawn from 1..=3.
    pub fn random_key(rng: &mut impl Rng) -> Matrix {
        let rows = (0..3)
            .map(|_| (0..3).map(|_| rng.gen_range(1..=3)).collect())
            .collect();
        Matrix { rows }
    }

    /// Exact integer product `self x rhs`.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        if self.col_count() != rhs.row_count() {
            return Err(MatrixError::ShapeMismatch {
                left_rows: self.row_count(),
                left_cols: self.col_count(),
                right_rows: rhs.row_count(),
                right_cols: rhs.col_count(),
            });
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                (0..rhs.col_count())
                    .map(|c| row.iter().zip(&rhs.rows).map(|(x, r)| x * r[c]).sum())
                    .collect()
            })
            .collect();
        Ok(Matrix { rows })
    }

    /// Recover some `candidate` with `candidate x b == target`.
    ///
    /// For each bound `maxv = 1, 2, ...` this draws
    /// `maxv^2 * rows(b) * cols(b) + 10` random matrices shaped
    /// `cols(b) x rows(b)` with entries in `0..=maxv` and keeps the first
    /// whose product matches. Runs until the budget trips; with the
    /// default unbounded budget it can run arbitrarily long.
    pub fn divide(
        target: &Matrix,
        b: &Matrix,
        budget: &SearchBudget,
        rng: &mut impl Rng,
    ) -> Result<Matrix, MatrixError> {
        let (b_rows, b_cols) = (b.row_count(), b.col_count());
        let mut spent = 0u64;
        let mut maxv: i64 = 0;
        loop {
            maxv += 1;
            let attempts = (maxv * maxv) as usize * b_rows * b_cols + 10;
            for _ in 0..attempts {
                budget.register(&mut spent)?;
                let candidate = Matrix {
                    rows: (0..b_cols)
                        .map(|_| (0..b_rows).map(|_| rng.gen_range(0..=maxv)).collect())
                        .collect(),
                };
                if candidate.multiply(b)? == *target {
                    return Ok(candidate);
                }
            }
        }
    }

    /// Textual literal as stored in the artifact:
    /// `[[1, 2, 3], [4, 5, 6], [7, 8, 9]]`.
    pub fn literal(&self) -> String {
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(i64::to_string).collect();
                format!("[{}]", cells.join(", "))
            })
            .collect();
        format!("[{}]", rows.join(", "))
    }

    /// Parse a literal produced by [`Matrix::literal`].
    pub fn parse(text: &str) -> Result<Matrix, MatrixError> {
        let bad = || MatrixError::BadLiteral(text.to_string());
        let inner = text
            .strip_prefix("[[")
            .and_then(|s| s.strip_suffix("]]"))
            .ok_or_else(bad)?;
        let rows = inner
            .split("], [")
            .map(|row| {
                row.split(", ")
                    .map(|cell| cell.trim().parse::<i64>().map_err(|_| bad()))
                    .collect::<Result<Vec<i64>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Matrix::from_rows(rows).map_err(|_| bad())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn multiply_known_product() {
        let a = m(&[&[1, 2], &[3, 4]]);
        let b = m(&[&[5, 6], &[7, 8]]);
        assert_eq!(a.multiply(&b).unwrap(), m(&[&[19, 22], &[43, 50]]));
    }

    #[test]
    fn multiply_rejects_bad_shapes() {
        let a = m(&[&[1, 2, 3]]);
        let b = m(&[&[1, 2]]);
        assert!(matches!(
            a.multiply(&b),
            Err(MatrixError::ShapeMismatch { left_cols: 3, right_rows: 1, .. })
        ));
    }

    #[test]
    fn literal_round_trip() {
        let a = m(&[&[0, 0, 0], &[1, 2, 3], &[3, 2, 1]]);
        assert_eq!(a.literal(), "[[0, 0, 0], [1, 2, 3], [3, 2, 1]]");
        assert_eq!(Matrix::parse(&a.literal()).unwrap(), a);
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "[]", "[[1, 2], [3]]", "[[a, b]]", "[1, 2, 3]"] {
            assert!(Matrix::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn divide_finds_some_solution() {
        // Small shapes keep the candidate space tiny relative to the
        // per-level attempt count, so the search converges quickly.
        let a = m(&[&[3]]);
        let b = m(&[&[2]]);
        let target = a.multiply(&b).unwrap();
        let solution = Matrix::divide(
            &target,
            &b,
            &SearchBudget::limited(1_000_000),
            &mut thread_rng(),
        )
        .unwrap();
        assert_eq!(solution.multiply(&b).unwrap(), target);
    }

    #[test]
    fn divide_handles_non_square_factors() {
        // b is 1x2, so candidates are shaped 2x1 and the target is 2x2.
        let a = m(&[&[1], &[1]]);
        let b = m(&[&[2, 3]]);
        let target = a.multiply(&b).unwrap();
        let solution = Matrix::divide(
            &target,
            &b,
            &SearchBudget::limited(1_000_000),
            &mut thread_rng(),
        )
        .unwrap();
        assert_eq!(solution.row_count(), 2);
        assert_eq!(solution.col_count(), 1);
        assert_eq!(solution.multiply(&b).unwrap(), target);
    }

    #[test]
    fn divide_reports_exhaustion() {
        let b = m(&[&[1, 1], &[1, 1]]);
        // No candidate multiplies a singular b into this target.
        let target = m(&[&[1, 0], &[0, 1]]);
        let result = Matrix::divide(&target, &b, &SearchBudget::limited(500), &mut thread_rng());
        assert!(matches!(result, Err(MatrixError::Exhausted(_))));
    }
}
