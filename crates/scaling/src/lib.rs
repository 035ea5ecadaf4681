#![forbid(unsafe_code)]

use cvxrs_core::math::{norm2, RealNumber};
use cvxrs_core::problem::{Cone, CscMatrix};
use cvxrs_core::scales::EquilibrationScales;
use cvxrs_core::solution::Sol;
use cvxrs_core::traits::Equilibrator;

/// Ruiz-style diagonal equilibration, generalized from column-only scaling
/// to a row-and-column pass over `(A, b, c)`. Row scaling respects the
/// product-cone partition: every row in a second-order-cone block is scaled
/// by the same factor, since non-uniform scaling of a Lorentz-cone block
/// would not commute with its projection. Rows in zero/free/nonnegative
/// blocks scale independently, since those cones are invariant under
/// arbitrary positive diagonal scaling.
#[derive(Debug, Clone)]
pub struct RuizEquilibrator<T: RealNumber> {
    passes: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T> RuizEquilibrator<T>
where
    T: RealNumber,
{
    pub fn new(passes: usize) -> Self {
        Self {
            passes,
            _marker: std::marker::PhantomData,
        }
    }

    fn column_pass(&self, a: &mut CscMatrix<T>, c: &mut [T], e: &mut [T]) {
        let n = a.ncols;
        let mut factors = vec![T::one(); n];
        for col in 0..n {
            let mut mx = c[col].abs();
            for idx in a.indptr[col]..a.indptr[col + 1] {
                mx = mx.max(a.data[idx].abs());
            }
            factors[col] = if mx > T::zero() { mx.sqrt() } else { T::one() };
        }
        for col in 0..n {
            let f = factors[col];
            e[col] = e[col] / f;
            c[col] = c[col] / f;
            for idx in a.indptr[col]..a.indptr[col + 1] {
                a.data[idx] = a.data[idx] / f;
            }
        }
    }

    fn row_pass(&self, a: &mut CscMatrix<T>, b: &mut [T], d: &mut [T], cones: &[Cone]) {
        let m = a.nrows;
        let mut row_max = vec![T::zero(); m];
        for col in 0..a.ncols {
            for idx in a.indptr[col]..a.indptr[col + 1] {
                let row = a.indices[idx];
                let v = a.data[idx].abs();
                if v > row_max[row] {
                    row_max[row] = v;
                }
            }
        }
        let mut offset = 0;
        for cone in cones {
            let dim = cone.dim();
            if let Cone::SecondOrder(_) = cone {
                let block = &row_max[offset..offset + dim];
                let block_max = block.iter().copied().fold(T::zero(), |acc, v| acc.max(v));
                for v in row_max[offset..offset + dim].iter_mut() {
                    *v = block_max;
                }
            }
            offset += dim;
        }

        let mut factors = vec![T::one(); m];
        for row in 0..m {
            factors[row] = if row_max[row] > T::zero() {
                row_max[row].sqrt()
            } else {
                T::one()
            };
        }
        for row in 0..m {
            d[row] = d[row] / factors[row];
            b[row] = b[row] / factors[row];
        }
        for col in 0..a.ncols {
            for idx in a.indptr[col]..a.indptr[col + 1] {
                let row = a.indices[idx];
                a.data[idx] = a.data[idx] / factors[row];
            }
        }
    }
}

impl<T> Default for RuizEquilibrator<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self::new(10)
    }
}

impl<T> Equilibrator<T> for RuizEquilibrator<T>
where
    T: RealNumber,
{
    fn normalize(
        &mut self,
        a: &mut CscMatrix<T>,
        b: &mut [T],
        c: &mut [T],
        cones: &[Cone],
    ) -> EquilibrationScales<T> {
        let m = a.nrows;
        let n = a.ncols;
        let mut d = vec![T::one(); m];
        let mut e = vec![T::one(); n];

        for _ in 0..self.passes {
            self.column_pass(a, c, &mut e);
            self.row_pass(a, b, &mut d, cones);
        }

        let (mut total, mut count) = (T::zero(), 0usize);
        for &value in &a.data {
            total += value.abs();
            count += 1;
        }
        let mean_abs = if count > 0 {
            total / T::from_usize(count).unwrap()
        } else {
            T::one()
        };
        let sigma = if mean_abs > T::zero() {
            T::one() / mean_abs
        } else {
            T::one()
        };
        for value in a.data.iter_mut() {
            *value = *value * sigma;
        }

        let norm_b = norm2(b);
        let sigma_b = if norm_b > T::zero() {
            T::one() / norm_b
        } else {
            T::one()
        };
        for value in b.iter_mut() {
            *value = *value * sigma_b;
        }

        let norm_c = norm2(c);
        let sigma_c = if norm_c > T::zero() {
            T::one() / norm_c
        } else {
            T::one()
        };
        for value in c.iter_mut() {
            *value = *value * sigma_c;
        }

        EquilibrationScales {
            d,
            e,
            sigma_b,
            sigma_c,
            sigma,
        }
    }

    fn normalize_warm_start(
        &self,
        scales: &EquilibrationScales<T>,
        x: &mut [T],
        y: &mut [T],
        s: &mut [T],
    ) {
        for (xi, &ei) in x.iter_mut().zip(scales.e.iter()) {
            *xi = *xi / ei;
        }
        for ((yi, si), &di) in y.iter_mut().zip(s.iter_mut()).zip(scales.d.iter()) {
            *si = *si * di * scales.sigma_b;
            *yi = *yi / (di * scales.sigma_c);
        }
    }

    fn unnormalize_a(&self, scales: &EquilibrationScales<T>, a: &mut CscMatrix<T>) {
        for col in 0..a.ncols {
            let ei = scales.e[col];
            for idx in a.indptr[col]..a.indptr[col + 1] {
                let row = a.indices[idx];
                a.data[idx] = a.data[idx] / (scales.sigma * scales.d[row] * ei);
            }
        }
    }

    fn unnormalize_sol_bc(
        &self,
        scales: &EquilibrationScales<T>,
        sol: &mut Sol<T>,
        b: &mut [T],
        c: &mut [T],
    ) {
        for (xi, &ei) in sol.x.iter_mut().zip(scales.e.iter()) {
            *xi = *xi * ei;
        }
        for ((yi, si), &di) in sol.y.iter_mut().zip(sol.s.iter_mut()).zip(scales.d.iter()) {
            *yi = *yi * di * scales.sigma_c;
            *si = *si / (di * scales.sigma_b);
        }
        for (bi, &di) in b.iter_mut().zip(scales.d.iter()) {
            *bi = *bi / (scales.sigma_b * di);
        }
        for (ci, &ei) in c.iter_mut().zip(scales.e.iter()) {
            *ci = *ci / (scales.sigma_c * ei);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_problem() -> (CscMatrix<f64>, Vec<f64>, Vec<f64>, Vec<Cone>) {
        let a = CscMatrix {
            nrows: 2,
            ncols: 2,
            indptr: vec![0, 2, 4],
            indices: vec![0, 1, 0, 1],
            data: vec![4.0, 1.0, 1.0, 100.0],
        };
        (a, vec![1.0, 2.0], vec![3.0, 4.0], vec![Cone::NonNegative(2)])
    }

    #[test]
    fn normalize_then_unnormalize_a_round_trips() {
        let (mut a, mut b, mut c, cones) = small_problem();
        let original = a.clone();
        let mut eq = RuizEquilibrator::new(10);
        let scales = eq.normalize(&mut a, &mut b, &mut c, &cones);
        eq.unnormalize_a(&scales, &mut a);
        for (got, want) in a.data.iter().zip(original.data.iter()) {
            assert_relative_eq!(got, want, epsilon = 1e-8);
        }
    }

    #[test]
    fn soc_block_gets_uniform_row_scale() {
        let a = CscMatrix {
            nrows: 3,
            ncols: 1,
            indptr: vec![0, 3],
            indices: vec![0, 1, 2],
            data: vec![1.0, 2.0, 100.0],
        };
        let mut a = a;
        let mut b = vec![1.0, 1.0, 1.0];
        let mut c = vec![1.0];
        let cones = vec![Cone::SecondOrder(3)];
        let mut eq = RuizEquilibrator::new(3);
        let scales = eq.normalize(&mut a, &mut b, &mut c, &cones);
        assert_relative_eq!(scales.d[0], scales.d[1], epsilon = 1e-12);
        assert_relative_eq!(scales.d[1], scales.d[2], epsilon = 1e-12);
    }

    #[test]
    fn warm_start_round_trips_through_normalize_and_unnormalize() {
        let (mut a, mut b, mut c, cones) = small_problem();
        let mut eq = RuizEquilibrator::new(5);
        let scales = eq.normalize(&mut a, &mut b, &mut c, &cones);

        let mut x = vec![1.5, -2.5];
        let mut y = vec![0.5, 0.75];
        let mut s = vec![2.0, 3.0];
        let (x0, y0, s0) = (x.clone(), y.clone(), s.clone());

        eq.normalize_warm_start(&scales, &mut x, &mut y, &mut s);
        let mut sol = Sol {
            x: x.clone(),
            y: y.clone(),
            s: s.clone(),
        };
        eq.unnormalize_sol_bc(&scales, &mut sol, &mut b.clone(), &mut c.clone());

        for (got, want) in sol.x.iter().zip(x0.iter()) {
            assert_relative_eq!(got, want, epsilon = 1e-8);
        }
        for (got, want) in sol.y.iter().zip(y0.iter()) {
            assert_relative_eq!(got, want, epsilon = 1e-8);
        }
        for (got, want) in sol.s.iter().zip(s0.iter()) {
            assert_relative_eq!(got, want, epsilon = 1e-8);
        }
    }
}
