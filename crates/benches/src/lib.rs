#![forbid(unsafe_code)]

//! Random problem generators shared across benchmark targets.

use cvxrs_core::math::Scalar;
use cvxrs_core::problem::{Cone, CscMatrix};
use rand::{rngs::SmallRng, Rng};

/// A diagonal matrix with positive entries close to 1, used as a cheap
/// `A` block whose associated saddle-point system is well conditioned.
pub fn diagonal_matrix(n: usize, rng: &mut SmallRng) -> CscMatrix<Scalar> {
    let mut indptr = Vec::with_capacity(n + 1);
    let mut indices = Vec::with_capacity(n);
    let mut data = Vec::with_capacity(n);
    indptr.push(0);
    for col in 0..n {
        indices.push(col);
        data.push(1.0 + rng.gen::<Scalar>() * 0.1);
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

/// A random trivial LP-shaped cone program: `A` is a dense `m x n` block,
/// `b` is strictly positive (feasible slack), `c` random, and the cone is a
/// single nonnegative-orthant block covering all of `m`.
pub fn random_lp(n: usize, m: usize, rng: &mut SmallRng) -> (CscMatrix<Scalar>, Vec<Scalar>, Vec<Scalar>, Vec<Cone>) {
    let mut indptr = Vec::with_capacity(n + 1);
    let mut indices = Vec::new();
    let mut data = Vec::new();
    indptr.push(0);
    for _col in 0..n {
        for row in 0..m {
            indices.push(row);
            data.push(rng.gen::<Scalar>() * 0.5 - 0.25);
        }
        indptr.push(indices.len());
    }
    let a = CscMatrix {
        nrows: m,
        ncols: n,
        indptr,
        indices,
        data,
    };
    let b = (0..m).map(|_| rng.gen::<Scalar>() + 0.5).collect();
    let c = (0..n).map(|_| rng.gen::<Scalar>() - 0.5).collect();
    (a, b, c, vec![Cone::NonNegative(m)])
}
