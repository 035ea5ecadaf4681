use crate::math::RealNumber;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
}

pub type ProblemResult<T> = Result<T, ProblemError>;

/// A sparse matrix in compressed-column form: `indptr` has length `ncols + 1`
/// and is non-decreasing, `indices` holds row indices in `[0, nrows)`, and
/// `data` holds the corresponding nonzero values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CscMatrix<T> {
    pub nrows: usize,
    pub ncols: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub data: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: RealNumber,
{
    pub fn empty() -> Self {
        Self {
            nrows: 0,
            ncols: 0,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn validate(&self) -> ProblemResult<()> {
        if self.indptr.len() != self.ncols + 1 {
            return Err(ProblemError::DimensionMismatch(format!(
                "indptr length {} != ncols + 1 ({})",
                self.indptr.len(),
                self.ncols + 1
            )));
        }
        if self.indices.len() != self.data.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "indices length {} != data length {}",
                self.indices.len(),
                self.data.len()
            )));
        }
        // Non-decreasing, not strictly increasing: empty columns (w[0] == w[1])
        // are a legal CSC pattern, so this is intentionally looser than the
        // "strictly increasing" pre-flight check described for this step.
        if !self.indptr.windows(2).all(|w| w[0] <= w[1]) {
            return Err(ProblemError::InvalidStructure(
                "column pointers must be non-decreasing".into(),
            ));
        }
        if let Some(&max_row) = self.indices.iter().max() {
            if self.nrows == 0 || max_row >= self.nrows {
                return Err(ProblemError::InvalidStructure(format!(
                    "row index {max_row} out of bounds for {} rows",
                    self.nrows
                )));
            }
        }
        Ok(())
    }

    /// `y <- A*x`.
    pub fn mul(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        for yi in y.iter_mut() {
            *yi = T::zero();
        }
        for col in 0..self.ncols {
            let xv = x[col];
            if xv == T::zero() {
                continue;
            }
            for idx in self.indptr[col]..self.indptr[col + 1] {
                y[self.indices[idx]] += self.data[idx] * xv;
            }
        }
    }

    /// `y <- A^T*x`.
    pub fn mul_transpose(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.nrows);
        assert_eq!(y.len(), self.ncols);
        for (col, yi) in y.iter_mut().enumerate() {
            let mut acc = T::zero();
            for idx in self.indptr[col]..self.indptr[col + 1] {
                acc += self.data[idx] * x[self.indices[idx]];
            }
            *yi = acc;
        }
    }
}

/// A single block of the product cone `K`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Cone {
    /// The zero cone `{0}^n` (equality constraints); its dual is the free cone.
    Zero(usize),
    /// The free (unconstrained) cone; only ever valid as a dual-cone counterpart.
    Free(usize),
    /// The nonnegative orthant `R^n_+`; self-dual.
    NonNegative(usize),
    /// The second-order (Lorentz) cone of dimension `n`; self-dual.
    SecondOrder(usize),
}

impl Cone {
    pub fn dim(&self) -> usize {
        match self {
            Cone::Zero(n) | Cone::Free(n) | Cone::NonNegative(n) | Cone::SecondOrder(n) => *n,
        }
    }

    pub fn validate(&self) -> ProblemResult<()> {
        match self {
            Cone::SecondOrder(n) if *n < 1 => Err(ProblemError::InvalidStructure(
                "second-order cone must have dimension >= 1".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Cone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cone::Zero(n) => write!(f, "Zero({n})"),
            Cone::Free(n) => write!(f, "Free({n})"),
            Cone::NonNegative(n) => write!(f, "NonNegative({n})"),
            Cone::SecondOrder(n) => write!(f, "SecondOrder({n})"),
        }
    }
}

pub fn cones_dim(cones: &[Cone]) -> usize {
    cones.iter().map(Cone::dim).sum()
}

/// The immutable problem data for one solve: `minimize c'x s.t. Ax + s = b, s in K`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem<T> {
    pub a: CscMatrix<T>,
    pub b: Vec<T>,
    pub c: Vec<T>,
    pub cones: Vec<Cone>,
}

impl<T> Problem<T>
where
    T: RealNumber,
{
    pub fn nvars(&self) -> usize {
        self.a.ncols
    }

    pub fn ncons(&self) -> usize {
        self.a.nrows
    }

    /// Pre-flight validation per the solver's admissibility contract: positive,
    /// consistent dimensions, a well-formed sparse pattern, and a cone partition
    /// that exactly covers the constraint dimension.
    pub fn validate(&self) -> ProblemResult<()> {
        let n = self.nvars();
        let m = self.ncons();
        if n == 0 || m == 0 {
            return Err(ProblemError::InvalidStructure(
                "both n and m must be positive".into(),
            ));
        }
        if m < n {
            return Err(ProblemError::InvalidStructure(format!(
                "m ({m}) must be >= n ({n})"
            )));
        }
        self.a.validate()?;
        let nnz = self.a.nnz();
        if nnz == 0 || nnz > m.saturating_mul(n) {
            return Err(ProblemError::InvalidStructure(format!(
                "nonzero count {nnz} must lie in (0, m*n] = (0, {}]",
                m * n
            )));
        }
        if self.b.len() != m {
            return Err(ProblemError::DimensionMismatch(format!(
                "b length {} != m ({m})",
                self.b.len()
            )));
        }
        if self.c.len() != n {
            return Err(ProblemError::DimensionMismatch(format!(
                "c length {} != n ({n})",
                self.c.len()
            )));
        }
        for cone in &self.cones {
            cone.validate()?;
        }
        let total = cones_dim(&self.cones);
        if total != m {
            return Err(ProblemError::DimensionMismatch(format!(
                "sum of cone dimensions {total} != m ({m})"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmStart<T> {
    pub x: Vec<T>,
    pub y: Vec<T>,
    pub s: Vec<T>,
}

impl<T> WarmStart<T>
where
    T: RealNumber,
{
    pub fn empty() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            s: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal(n: usize) -> CscMatrix<f64> {
        let mut indptr = Vec::with_capacity(n + 1);
        let mut indices = Vec::with_capacity(n);
        let mut data = Vec::with_capacity(n);
        indptr.push(0);
        for i in 0..n {
            indices.push(i);
            data.push(1.0);
            indptr.push(indices.len());
        }
        CscMatrix {
            nrows: n,
            ncols: n,
            indptr,
            indices,
            data,
        }
    }

    #[test]
    fn square_problem_validates() {
        let problem = Problem {
            a: diagonal(2),
            b: vec![1.0, 2.0],
            c: vec![-1.0, -1.0],
            cones: vec![Cone::NonNegative(2)],
        };
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn rejects_m_less_than_n() {
        let a = CscMatrix {
            nrows: 1,
            ncols: 2,
            indptr: vec![0, 1, 1],
            indices: vec![0],
            data: vec![1.0],
        };
        let problem = Problem {
            a,
            b: vec![1.0],
            c: vec![1.0, 1.0],
            cones: vec![Cone::NonNegative(1)],
        };
        assert!(problem.validate().is_err());
    }

    #[test]
    fn rejects_cone_dimension_mismatch() {
        let problem = Problem {
            a: diagonal(2),
            b: vec![1.0, 2.0],
            c: vec![-1.0, -1.0],
            cones: vec![Cone::NonNegative(1)],
        };
        assert!(problem.validate().is_err());
    }
}
