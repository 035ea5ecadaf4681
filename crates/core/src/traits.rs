use crate::math::RealNumber;
use crate::problem::{Cone, CscMatrix};
use crate::scales::EquilibrationScales;
use crate::solution::Sol;
use anyhow::Result;

/// The linear-subspace solver: a direct or indirect backend for the fixed
/// saddle-point system `M z = rhs`, `M = [rho*I A'; A -I]`. The iteration
/// engine is polymorphic over this trait and must not depend on whether an
/// implementation factors `M` once (direct) or iterates (e.g. CG/indirect).
pub trait KktSolver<T: RealNumber>: Send {
    /// One-time factorization/preconditioner setup against the (possibly
    /// equilibrated) constraint matrix and the fixed x-block regularizer.
    fn setup(&mut self, a: &CscMatrix<T>, rho_x: T) -> Result<()>;

    /// Solve `M z = rhs` in place. `warm_start`, when present, holds a prior
    /// iterate of the same length as `rhs` and may be used to accelerate
    /// indirect backends; direct backends may ignore it. `iter_hint` is the
    /// outer iteration count, useful for indirect backends that tighten their
    /// inner tolerance as the outer loop converges.
    fn solve(&self, rhs: &mut [T], warm_start: Option<&[T]>, iter_hint: usize) -> Result<()>;

    /// A short, human-readable description of the backend (e.g. factorization
    /// kind and dimension), surfaced in the verbose console header/footer.
    fn summary(&self) -> Option<String> {
        None
    }
}

/// The cone projector: a black-box `Pi_K(.)` with one-time setup/teardown.
pub trait ConeProjector<T: RealNumber>: Send {
    /// One-time setup against the product cone's block structure.
    fn init(&mut self, cones: &[Cone]) -> Result<()>;

    /// Project `v` (length equal to the total cone dimension) onto the
    /// primal cone `K` in place. `iter` is the outer iteration count, for
    /// iteration-aware projectors (e.g. warm-started eigenvalue refinement
    /// for SDP blocks).
    fn project_primal(&mut self, v: &mut [T], cones: &[Cone], iter: usize);

    /// Project `v` onto the dual cone `K*` in place. Derived from
    /// [`Self::project_primal`] via the Moreau decomposition
    /// `Pi_{K*}(v) = v + Pi_K(-v)`, which holds for any closed convex cone
    /// and requires no cone-specific code beyond the primal projection.
    fn project_dual(&mut self, v: &mut [T], cones: &[Cone], iter: usize) {
        let mut neg: Vec<T> = v.iter().map(|&vi| -vi).collect();
        self.project_primal(&mut neg, cones, iter);
        for (vi, pi) in v.iter_mut().zip(neg.iter()) {
            *vi += *pi;
        }
    }
}

/// Diagonal equilibration of `(A, b, c)`, cone-compatible (never mixes rows
/// across cone blocks).
pub trait Equilibrator<T: RealNumber>: Send {
    /// Rescale `a`, `b`, `c` in place and return the scales used, so that `A`
    /// has approximately unit row/column norms.
    fn normalize(
        &mut self,
        a: &mut CscMatrix<T>,
        b: &mut [T],
        c: &mut [T],
        cones: &[Cone],
    ) -> EquilibrationScales<T>;

    /// Apply the equilibration scales to a warm-started `(x, y, s)` triple.
    fn normalize_warm_start(
        &self,
        scales: &EquilibrationScales<T>,
        x: &mut [T],
        y: &mut [T],
        s: &mut [T],
    );

    /// Undo scaling on `A` in place.
    fn unnormalize_a(&self, scales: &EquilibrationScales<T>, a: &mut CscMatrix<T>);

    /// Undo scaling on the returned solution and on `b`, `c`.
    fn unnormalize_sol_bc(
        &self,
        scales: &EquilibrationScales<T>,
        sol: &mut Sol<T>,
        b: &mut [T],
        c: &mut [T],
    );
}
