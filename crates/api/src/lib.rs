#![forbid(unsafe_code)]

//! Public, user-facing surface over the cone-program solver: a small builder
//! for `Problem<T>`, and a `Solver<T>` that wires the three collaborators
//! (linear-subspace solver, cone projector, equilibrator) cvxrs-algos is
//! polymorphic over into one concrete, easy-to-call backend.

use cvxrs_algos::ScsSolver;
use cvxrs_cones::ProductConeProjector;
use cvxrs_core::math::RealNumber;
use cvxrs_core::problem::{Cone, CscMatrix, Problem, ProblemError};
use cvxrs_linsys::{SaddleKktSolver, SparseKktSolver};
use cvxrs_scaling::RuizEquilibrator;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cvxrs_core::options::{Method, SolveOptions};
pub use cvxrs_core::problem::WarmStart;
pub use cvxrs_core::solution::{Info, Sol, Status};
pub use cvxrs_core::stats::SolveStats;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("problem validation failed: {0}")]
    InvalidProblem(#[from] ProblemError),
    #[error("unsupported method: {0:?}")]
    Unsupported(Method),
}

/// Which linear-subspace backend a `Solver` assembles the saddle-point
/// system with. Both factor through the same dense `LDL^T` kernel today
/// (see `cvxrs-linsys`); the choice only changes how the matrix is
/// assembled, and is here so a caller with a genuinely sparse problem can
/// opt into the sparsity-aware front end without the engine itself caring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinearBackend {
    #[default]
    Dense,
    Sparse,
}

/// Assembles a `Problem<T>` from its constraint matrix, right-hand side,
/// cost vector, and cone partition, validating eagerly on `build()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemBuilder<T: RealNumber> {
    a: Option<CscMatrix<T>>,
    b: Option<Vec<T>>,
    c: Option<Vec<T>>,
    cones: Vec<Cone>,
}

impl<T> Default for ProblemBuilder<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self {
            a: None,
            b: None,
            c: None,
            cones: Vec::new(),
        }
    }
}

impl<T> ProblemBuilder<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn a(mut self, matrix: CscMatrix<T>) -> Self {
        self.a = Some(matrix);
        self
    }

    pub fn b(mut self, rhs: Vec<T>) -> Self {
        self.b = Some(rhs);
        self
    }

    pub fn c(mut self, cost: Vec<T>) -> Self {
        self.c = Some(cost);
        self
    }

    pub fn cone(mut self, cone: Cone) -> Self {
        self.cones.push(cone);
        self
    }

    pub fn cones(mut self, cones: Vec<Cone>) -> Self {
        self.cones = cones;
        self
    }

    pub fn build(self) -> Result<Problem<T>, SolverError> {
        let a = self
            .a
            .ok_or_else(|| ProblemError::InvalidStructure("constraint matrix missing".into()))?;
        let b = self
            .b
            .ok_or_else(|| ProblemError::InvalidStructure("right-hand side missing".into()))?;
        let c = self
            .c
            .ok_or_else(|| ProblemError::InvalidStructure("cost vector missing".into()))?;
        let problem = Problem {
            a,
            b,
            c,
            cones: self.cones,
        };
        problem.validate()?;
        Ok(problem)
    }
}

/// The user-facing solver handle: owns the options, an optional warm start,
/// and the equilibrator's running state (its diagonal scales are recomputed
/// per solve, but the instance itself is reused across calls).
pub struct Solver<T: RealNumber + FromPrimitive> {
    method: Method,
    backend: LinearBackend,
    options: SolveOptions<T>,
    warm_start: Option<WarmStart<T>>,
    equilibrator: RuizEquilibrator<T>,
}

impl<T> Solver<T>
where
    T: RealNumber + FromPrimitive,
{
    pub fn new() -> Self {
        Self {
            method: Method::Scs,
            backend: LinearBackend::default(),
            options: SolveOptions::default(),
            warm_start: None,
            equilibrator: RuizEquilibrator::default(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn backend(mut self, backend: LinearBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn options(mut self, options: SolveOptions<T>) -> Self {
        self.options = options;
        self
    }

    pub fn warm_start(mut self, warm: WarmStart<T>) -> Self {
        self.warm_start = Some(warm);
        self
    }

    pub fn solve(&mut self, problem: Problem<T>) -> Result<(Sol<T>, Info<T>), SolverError> {
        match self.method {
            Method::Scs => {
                let mut cones = ProductConeProjector::new();
                let mut scs = ScsSolver::new(self.options.clone());
                if let Some(warm) = self.warm_start.clone() {
                    scs = scs.with_warm_start(warm);
                }
                let result = match self.backend {
                    LinearBackend::Dense => {
                        let mut kkt = SaddleKktSolver::<T>::new();
                        scs.solve(problem, &mut kkt, &mut cones, &mut self.equilibrator)
                    }
                    LinearBackend::Sparse => {
                        let mut kkt = SparseKktSolver::<T>::new();
                        scs.solve(problem, &mut kkt, &mut cones, &mut self.equilibrator)
                    }
                };
                Ok(result)
            }
            Method::Ipm => Err(SolverError::Unsupported(Method::Ipm)),
        }
    }
}

impl<T> Default for Solver<T>
where
    T: RealNumber + FromPrimitive,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience entry point for a one-shot solve with default options.
pub fn solve<T: RealNumber + FromPrimitive>(
    problem: Problem<T>,
    options: SolveOptions<T>,
) -> Result<(Sol<T>, Info<T>), SolverError> {
    Solver::new().options(options).solve(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvxrs_core::math::Scalar;

    fn trivial_lp() -> Problem<Scalar> {
        let a = CscMatrix {
            nrows: 2,
            ncols: 2,
            indptr: vec![0, 2, 4],
            indices: vec![0, 1, 0, 1],
            data: vec![1.0, 0.0, 0.0, 1.0],
        };
        ProblemBuilder::new()
            .a(a)
            .b(vec![1.0, 1.0])
            .c(vec![-1.0, -1.0])
            .cone(Cone::NonNegative(2))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_rejects_missing_fields() {
        let result = ProblemBuilder::<Scalar>::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn solver_reports_a_terminal_status() {
        let problem = trivial_lp();
        let mut options = SolveOptions::default();
        options.verbose = false;
        let (sol, info) = Solver::new().options(options).solve(problem).unwrap();
        assert_eq!(sol.x.len(), 2);
        assert_ne!(info.status, Status::Failure);
    }
}
