//! Integration tests for the homogeneous self-dual embedding engine,
//! covering the solver's six canonical scenarios: a trivial LP, an
//! infeasible pair of halfspaces, an unbounded direction, a feasible SOCP,
//! warm-start idempotence, and equilibration invariance.

use cvxrs_cones::ProductConeProjector;
use cvxrs_core::math::Scalar;
use cvxrs_core::options::{SolveOptions, CONVERGED_INTERVAL};
use cvxrs_core::problem::{Cone, CscMatrix, Problem, WarmStart};
use cvxrs_core::solution::Status;
use cvxrs_linsys::SaddleKktSolver;
use cvxrs_algos::ScsSolver;
use cvxrs_scaling::RuizEquilibrator;

fn diagonal(diag: &[Scalar]) -> CscMatrix<Scalar> {
    let n = diag.len();
    let mut indptr = Vec::with_capacity(n + 1);
    let mut indices = Vec::with_capacity(n);
    let mut data = Vec::with_capacity(n);
    indptr.push(0);
    for (idx, &value) in diag.iter().enumerate() {
        indices.push(idx);
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

fn default_solve(problem: Problem<Scalar>, options: SolveOptions<Scalar>) -> (cvxrs_core::solution::Sol<Scalar>, cvxrs_core::solution::Info<Scalar>) {
    let mut kkt = SaddleKktSolver::<Scalar>::new();
    let mut cones = ProductConeProjector::new();
    let mut equilibrator = RuizEquilibrator::<Scalar>::default();
    ScsSolver::new(options).solve(problem, &mut kkt, &mut cones, &mut equilibrator)
}

#[test]
fn trivial_lp_solves() {
    let problem = Problem {
        a: diagonal(&[1.0]),
        b: vec![1.0],
        c: vec![-1.0],
        cones: vec![Cone::NonNegative(1)],
    };
    let (sol, info) = default_solve(problem, SolveOptions::default());
    assert_eq!(info.status, Status::Solved);
    assert!((sol.x[0] - 1.0).abs() < 1e-3);
    assert!((info.pobj + 1.0).abs() < 1e-3);
}

#[test]
fn two_contradictory_halfspaces_are_infeasible() {
    let a = CscMatrix {
        nrows: 2,
        ncols: 1,
        indptr: vec![0, 2],
        indices: vec![0, 1],
        data: vec![1.0, -1.0],
    };
    let problem = Problem {
        a,
        b: vec![1.0, -2.0],
        c: vec![0.0],
        cones: vec![Cone::NonNegative(2)],
    };
    let (_sol, info) = default_solve(problem, SolveOptions::default());
    assert_eq!(info.status, Status::Infeasible);
    assert!(info.dobj < 0.0);
}

#[test]
fn unbounded_direction_is_detected() {
    let problem = Problem {
        a: diagonal(&[1.0, 1.0]),
        b: vec![0.0, 0.0],
        c: vec![-1.0, -1.0],
        cones: vec![Cone::Free(1), Cone::NonNegative(1)],
    };
    let (_sol, info) = default_solve(problem, SolveOptions::default());
    assert_eq!(info.status, Status::Unbounded);
    assert!(info.pobj < 0.0);
}

#[test]
fn socp_feasibility_converges_near_origin() {
    // minimize 0 s.t. ||x||_2 <= 1, encoded as s = (1, x) in SecondOrder(3).
    let a = CscMatrix {
        nrows: 3,
        ncols: 2,
        indptr: vec![0, 2, 4],
        indices: vec![1, 2, 1, 2],
        data: vec![-1.0, 0.0, 0.0, -1.0],
    };
    let problem = Problem {
        a,
        b: vec![1.0, 0.0, 0.0],
        c: vec![0.0, 0.0],
        cones: vec![Cone::SecondOrder(3)],
    };
    let (sol, info) = default_solve(problem, SolveOptions::default());
    assert_eq!(info.status, Status::Solved);
    assert!(sol.x[0].abs() < 1e-2);
    assert!(sol.x[1].abs() < 1e-2);
}

#[test]
fn warm_start_from_the_optimum_converges_quickly() {
    let problem = Problem {
        a: diagonal(&[1.0]),
        b: vec![1.0],
        c: vec![-1.0],
        cones: vec![Cone::NonNegative(1)],
    };
    let (sol, _) = default_solve(problem.clone(), SolveOptions::default());

    let warm = WarmStart {
        x: sol.x.clone(),
        y: sol.y.clone(),
        s: sol.s.clone(),
    };
    let mut kkt = SaddleKktSolver::<Scalar>::new();
    let mut cones = ProductConeProjector::new();
    let mut equilibrator = RuizEquilibrator::<Scalar>::default();
    let (_sol2, info2) = ScsSolver::new(SolveOptions::default())
        .with_warm_start(warm)
        .solve(problem, &mut kkt, &mut cones, &mut equilibrator);
    assert_eq!(info2.status, Status::Solved);
    assert!(info2.iter <= CONVERGED_INTERVAL);
}

#[test]
fn equilibration_recovers_the_same_solution_under_rescaling() {
    let unscaled = Problem {
        a: diagonal(&[1.0, 1.0]),
        b: vec![3.0, 5.0],
        c: vec![-1.0, -1.0],
        cones: vec![Cone::NonNegative(2)],
    };
    let (sol, _) = default_solve(unscaled, SolveOptions::default());

    // D = (2, 3) row scales, E = (4, 0.5) column scales; A_ii' = D_i * E_i.
    let d = [2.0, 3.0];
    let e = [4.0, 0.5];
    let scaled = Problem {
        a: diagonal(&[d[0] * e[0], d[1] * e[1]]),
        b: vec![d[0] * 3.0, d[1] * 5.0],
        c: vec![e[0] * -1.0, e[1] * -1.0],
        cones: vec![Cone::NonNegative(2)],
    };
    let (sol2, info2) = default_solve(scaled, SolveOptions::default());
    assert_eq!(info2.status, Status::Solved);

    let eps = SolveOptions::<Scalar>::default().eps;
    assert!((sol2.x[0] * e[0] - sol.x[0]).abs() < 10.0 * eps.max(1e-3));
    assert!((sol2.x[1] * e[1] - sol.x[1]).abs() < 10.0 * eps.max(1e-3));
}
