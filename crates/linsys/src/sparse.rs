use crate::dense::{DenseKktMatrix, DenseKktSolver, DensePattern};
use anyhow::Result;
use cvxrs_core::math::RealNumber;
use cvxrs_core::problem::CscMatrix;
use cvxrs_core::traits::KktSolver;
use num_traits::{FromPrimitive, One};
use sprs::{CsMat, TriMat};

fn to_sprs<T>(a: &CscMatrix<T>) -> CsMat<T>
where
    T: RealNumber,
{
    CsMat::new_csc(
        (a.nrows, a.ncols),
        a.indptr.clone(),
        a.indices.clone(),
        a.data.clone(),
    )
}

/// Assembles the saddle-point operator as an `sprs` sparse matrix (symmetric,
/// stored as a full square pattern rather than triangular), for backends that
/// want to inspect sparsity before falling back to a dense factorization.
#[derive(Debug, Clone)]
pub struct SparseKktMatrix<T: RealNumber> {
    pub matrix: CsMat<T>,
}

impl<T> SparseKktMatrix<T>
where
    T: RealNumber,
{
    pub fn assemble_saddle(a: &CscMatrix<T>, rho_x: T) -> Self {
        let n = a.ncols;
        let m = a.nrows;
        let dim = n + m;
        let mut triplets = TriMat::new((dim, dim));
        for i in 0..n {
            triplets.add_triplet(i, i, rho_x);
        }
        for row in 0..m {
            triplets.add_triplet(n + row, n + row, -T::one());
        }
        let sparse_a = to_sprs(a);
        for (col, column) in sparse_a.outer_iterator().enumerate() {
            for (row, value) in column.iter() {
                triplets.add_triplet(n + row, col, *value);
                triplets.add_triplet(col, n + row, *value);
            }
        }
        Self {
            matrix: triplets.to_csc(),
        }
    }

    fn to_dense(&self) -> DenseKktMatrix<T> {
        let (rows, cols) = self.matrix.shape();
        assert_eq!(rows, cols, "saddle-point matrices must be square");
        let dimension = rows;
        let mut data = vec![T::zero(); dimension * dimension];
        for (col, column) in self.matrix.outer_iterator().enumerate() {
            for (row, value) in column.iter() {
                data[row * dimension + col] = *value;
            }
        }
        DenseKktMatrix::new(dimension, data)
    }
}

#[derive(Debug, Clone)]
pub struct SparsePattern {
    dimension: usize,
}

impl SparsePattern {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// A sparsity-aware front end that currently factors through the dense
/// backend; the contract (`setup`/`solve`/`summary`) is identical to
/// [`crate::dense::SaddleKktSolver`], so swapping a real sparse factorization
/// in later is a drop-in change for the iteration engine.
pub struct SparseKktSolver<T: RealNumber> {
    dense: DenseKktSolver<T>,
    pattern: Option<SparsePattern>,
}

impl<T> SparseKktSolver<T>
where
    T: RealNumber + FromPrimitive + One,
{
    pub fn new() -> Self {
        Self {
            dense: DenseKktSolver::new(),
            pattern: None,
        }
    }
}

impl<T> Default for SparseKktSolver<T>
where
    T: RealNumber + FromPrimitive + One,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KktSolver<T> for SparseKktSolver<T>
where
    T: RealNumber + FromPrimitive + One,
{
    fn setup(&mut self, a: &CscMatrix<T>, rho_x: T) -> Result<()> {
        let assembled = SparseKktMatrix::assemble_saddle(a, rho_x);
        let dimension = assembled.matrix.rows();
        self.pattern = Some(SparsePattern::new(dimension));
        self.dense.analyze_pattern(&DensePattern::new(dimension))?;
        let dense = assembled.to_dense();
        self.dense.factor(&dense)
    }

    fn solve(&self, rhs: &mut [T], _warm_start: Option<&[T]>, _iter_hint: usize) -> Result<()> {
        self.dense.solve_in_place(rhs)
    }

    fn summary(&self) -> Option<String> {
        self.pattern
            .as_ref()
            .map(|p| format!("sparse-front dense LDL^T, dimension {}", p.dimension()))
    }
}
