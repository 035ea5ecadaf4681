use anyhow::{anyhow, Result};
use cvxrs_core::math::RealNumber;
use cvxrs_core::problem::CscMatrix;
use cvxrs_core::traits::KktSolver;
use num_traits::{FromPrimitive, One};

/// A dense symmetric matrix, stored row-major, used as the in-memory
/// representation of the saddle-point operator `M = [rho*I A'; A -I]`.
#[derive(Debug, Clone)]
pub struct DenseKktMatrix<T: RealNumber> {
    pub dimension: usize,
    pub data: Vec<T>,
}

impl<T> DenseKktMatrix<T>
where
    T: RealNumber,
{
    pub fn new(dimension: usize, data: Vec<T>) -> Self {
        assert_eq!(dimension * dimension, data.len());
        Self { dimension, data }
    }

    fn entry(&self, row: usize, col: usize) -> T {
        self.data[row * self.dimension + col]
    }

    /// Assemble the quasi-definite saddle-point matrix for a (possibly
    /// equilibrated) constraint matrix `a` and x-block regularizer `rho_x`:
    /// `M = [rho_x*I  A'; A  -I]`, dimension `n + m`.
    pub fn assemble_saddle(a: &CscMatrix<T>, rho_x: T) -> Self {
        let n = a.ncols;
        let m = a.nrows;
        let dimension = n + m;
        let mut data = vec![T::zero(); dimension * dimension];
        for i in 0..n {
            data[i * dimension + i] = rho_x;
        }
        for row in 0..m {
            data[(n + row) * dimension + (n + row)] = -T::one();
        }
        for col in 0..n {
            for idx in a.indptr[col]..a.indptr[col + 1] {
                let row = a.indices[idx];
                let value = a.data[idx];
                data[(n + row) * dimension + col] = value;
                data[col * dimension + (n + row)] = value;
            }
        }
        Self::new(dimension, data)
    }
}

#[derive(Debug, Clone)]
pub struct DensePattern {
    dimension: usize,
}

impl DensePattern {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Dense LDL^T factorization without pivoting, sound for a quasi-definite
/// matrix (symmetric with a (+,-) block signature), as used to realize the
/// fixed saddle-point solve.
pub struct DenseKktSolver<T: RealNumber> {
    dimension: usize,
    l: Vec<T>,
    d: Vec<T>,
    analyzed: bool,
    factorizations: usize,
}

impl<T> DenseKktSolver<T>
where
    T: RealNumber + FromPrimitive + One,
{
    pub fn new() -> Self {
        Self {
            dimension: 0,
            l: Vec::new(),
            d: Vec::new(),
            analyzed: false,
            factorizations: 0,
        }
    }

    fn epsilon() -> T {
        T::from_f64(1e-12).unwrap()
    }

    fn l(&self, row: usize, col: usize) -> T {
        let idx = row * self.dimension + col;
        self.l[idx]
    }

    fn l_mut(&mut self, row: usize, col: usize) -> &mut T {
        let idx = row * self.dimension + col;
        &mut self.l[idx]
    }

    pub fn analyze_pattern(&mut self, pattern: &DensePattern) -> Result<()> {
        self.dimension = pattern.dimension();
        self.l = vec![T::zero(); self.dimension * self.dimension];
        self.d = vec![T::zero(); self.dimension];
        for i in 0..self.dimension {
            *self.l_mut(i, i) = T::one();
        }
        self.analyzed = true;
        Ok(())
    }

    pub fn factor(&mut self, matrix: &DenseKktMatrix<T>) -> Result<()> {
        if !self.analyzed {
            self.analyze_pattern(&DensePattern::new(matrix.dimension))?;
        }
        if matrix.dimension != self.dimension {
            return Err(anyhow!(
                "matrix dimension {} does not match analysed dimension {}",
                matrix.dimension,
                self.dimension
            ));
        }
        for i in 0..self.dimension {
            for j in 0..self.dimension {
                *self.l_mut(i, j) = if i == j { T::one() } else { T::zero() };
            }
        }

        for j in 0..self.dimension {
            let mut d_j = matrix.entry(j, j);
            for k in 0..j {
                let l_jk = self.l(j, k);
                d_j -= l_jk * l_jk * self.d[k];
            }
            if d_j.abs() <= Self::epsilon() {
                let magnitude = d_j.abs().to_f64().unwrap_or(f64::NAN);
                return Err(anyhow!(
                    "near-singular pivot encountered at column {} (|d_j| = {:.3e})",
                    j,
                    magnitude
                ));
            }
            self.d[j] = d_j;

            for i in (j + 1)..self.dimension {
                let mut lij = matrix.entry(i, j);
                for k in 0..j {
                    lij -= self.l(i, k) * self.l(j, k) * self.d[k];
                }
                lij = lij / self.d[j];
                *self.l_mut(i, j) = lij;
            }
        }
        self.factorizations += 1;
        Ok(())
    }

    pub fn solve_in_place(&self, rhs: &mut [T]) -> Result<()> {
        if rhs.len() != self.dimension {
            return Err(anyhow!(
                "rhs length {} does not match dimension {}",
                rhs.len(),
                self.dimension
            ));
        }
        for i in 0..self.dimension {
            for j in 0..i {
                rhs[i] -= self.l(i, j) * rhs[j];
            }
        }
        for i in 0..self.dimension {
            if self.d[i].abs() <= Self::epsilon() {
                return Err(anyhow!("singular diagonal entry encountered at {}", i));
            }
            rhs[i] = rhs[i] / self.d[i];
        }
        for i in (0..self.dimension).rev() {
            for j in (i + 1)..self.dimension {
                rhs[i] -= self.l(j, i) * rhs[j];
            }
        }
        Ok(())
    }
}

impl<T> Default for DenseKktSolver<T>
where
    T: RealNumber + FromPrimitive + One,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The direct linear-subspace solver backend: factors the saddle-point
/// matrix `M = [rho_x*I A'; A -I]` once at setup and reuses the
/// factorization for every outer iteration, since RHO_X is fixed for the
/// duration of a solve.
pub struct SaddleKktSolver<T: RealNumber> {
    dimension: usize,
    inner: DenseKktSolver<T>,
}

impl<T> SaddleKktSolver<T>
where
    T: RealNumber + FromPrimitive + One,
{
    pub fn new() -> Self {
        Self {
            dimension: 0,
            inner: DenseKktSolver::new(),
        }
    }
}

impl<T> Default for SaddleKktSolver<T>
where
    T: RealNumber + FromPrimitive + One,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KktSolver<T> for SaddleKktSolver<T>
where
    T: RealNumber + FromPrimitive + One,
{
    fn setup(&mut self, a: &CscMatrix<T>, rho_x: T) -> Result<()> {
        let matrix = DenseKktMatrix::assemble_saddle(a, rho_x);
        self.dimension = matrix.dimension;
        self.inner.factor(&matrix)
    }

    fn solve(&self, rhs: &mut [T], _warm_start: Option<&[T]>, _iter_hint: usize) -> Result<()> {
        if rhs.len() != self.dimension {
            return Err(anyhow!(
                "rhs length {} does not match saddle-system dimension {}",
                rhs.len(),
                self.dimension
            ));
        }
        self.inner.solve_in_place(rhs)
    }

    fn summary(&self) -> Option<String> {
        Some(format!(
            "dense LDL^T, dimension {}, {} factorization(s)",
            self.dimension, self.inner.factorizations
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal(n: usize, value: f64) -> CscMatrix<f64> {
        let mut indptr = Vec::with_capacity(n + 1);
        let mut indices = Vec::with_capacity(n);
        let mut data = Vec::with_capacity(n);
        indptr.push(0);
        for i in 0..n {
            indices.push(i);
            data.push(value);
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
    fn solves_identity_saddle_system() {
        let a = diagonal(2, 1.0);
        let mut solver = SaddleKktSolver::<f64>::new();
        solver.setup(&a, 1e-3).expect("setup");
        let mut rhs = vec![1.0, 2.0, 3.0, 4.0];
        solver.solve(&mut rhs, None, 0).expect("solve");
        assert_eq!(rhs.len(), 4);
        assert!(rhs.iter().all(|v| v.is_finite()));
    }
}
