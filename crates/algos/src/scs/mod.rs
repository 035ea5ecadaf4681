//! The homogeneous self-dual embedding splitting engine: the operator that
//! alternates a linear-subspace projection with a cone projection and a
//! dual update, driving the three tightly coupled subsystems (iteration
//! loop, linear solve, termination oracle) that make up this solver.

pub mod extract;
pub mod oracle;
pub mod printer;

use cvxrs_core::error::SolveError;
use cvxrs_core::math::{dot, norm2, RealNumber, Timer};
use cvxrs_core::options::{Method, SolveOptions, CONVERGED_INTERVAL, PRINT_INTERVAL};
use cvxrs_core::problem::Problem;
use cvxrs_core::scales::EquilibrationScales;
use cvxrs_core::solution::{Info, Sol, Status};
use cvxrs_core::stats::{IterationRecord, SolveStats};
use cvxrs_core::traits::{ConeProjector, Equilibrator, KktSolver};
use cvxrs_core::workspace::Workspace;
use num_traits::FromPrimitive;
use oracle::Verdict;

/// Owns the options and any caller-supplied warm start for one solve, built
/// with a small builder API and polymorphic over the three external
/// collaborators (`KktSolver`, `ConeProjector`, `Equilibrator`) the
/// cone-program engine needs.
pub struct ScsSolver<T: RealNumber> {
    options: SolveOptions<T>,
    warm_start: Option<cvxrs_core::problem::WarmStart<T>>,
}

impl<T> ScsSolver<T>
where
    T: RealNumber + FromPrimitive,
{
    pub fn new(options: SolveOptions<T>) -> Self {
        Self {
            options,
            warm_start: None,
        }
    }

    pub fn with_warm_start(mut self, warm: cvxrs_core::problem::WarmStart<T>) -> Self {
        self.warm_start = Some(warm);
        self
    }

    pub fn method(&self) -> Method {
        Method::Scs
    }

    /// Runs one full solve: validation, equilibration, cold/warm start,
    /// the outer iteration loop, and solution extraction. Never panics or
    /// propagates an error to the caller — every failure path is folded
    /// into a `Failure`-status `Info` with NaN-filled `Sol`, matching the
    /// "core must never throw" contract.
    pub fn solve<K, P, E>(
        self,
        mut problem: Problem<T>,
        kkt: &mut K,
        cones: &mut P,
        equilibrator: &mut E,
    ) -> (Sol<T>, Info<T>)
    where
        K: KktSolver<T>,
        P: ConeProjector<T>,
        E: Equilibrator<T>,
    {
        let timer = Timer::start();
        match self.try_solve(&mut problem, kkt, cones, equilibrator, &timer) {
            Ok(result) => result,
            Err(_err) => {
                let n = problem.nvars();
                let m = problem.ncons();
                (Sol::fill_nan(n, m), Info::failure())
            }
        }
    }

    fn try_solve<K, P, E>(
        &self,
        problem: &mut Problem<T>,
        kkt: &mut K,
        cones: &mut P,
        equilibrator: &mut E,
        timer: &Timer,
    ) -> Result<(Sol<T>, Info<T>), SolveError>
    where
        K: KktSolver<T>,
        P: ConeProjector<T>,
        E: Equilibrator<T>,
    {
        problem.validate().map_err(SolveError::InvalidProblem)?;
        self.options
            .validate()
            .map_err(SolveError::InvalidOptions)?;

        let original = problem.clone();
        let n = problem.nvars();
        let m = problem.ncons();

        let nm_b = norm2(&problem.b);
        let nm_c = norm2(&problem.c);

        let scales = if self.options.normalize {
            equilibrator.normalize(&mut problem.a, &mut problem.b, &mut problem.c, &problem.cones)
        } else {
            EquilibrationScales::identity(m, n)
        };

        cones
            .init(&problem.cones)
            .map_err(SolveError::ConeSetup)?;
        kkt.setup(&problem.a, self.options.rho_x)
            .map_err(SolveError::LinearSolverSetup)?;

        let mut ws = self.build_workspace(problem, kkt, &scales, nm_b, nm_c)?;
        ws.method = kkt.summary();

        let warm_started = self.warm_start.is_some();
        if let Some(warm) = &self.warm_start {
            load_warm_start(&mut ws, warm, &scales, equilibrator);
        } else {
            load_cold_start(&mut ws);
        }

        if self.options.verbose {
            printer::print_header(&original, &self.options, warm_started);
        }

        let mut stats = SolveStats::new();
        let mut verdict = Verdict::Continue;
        let mut hit_max_iters = true;
        let mut iters_run = 0usize;

        for iter in 0..self.options.max_iterations {
            iterate_once(
                &mut ws,
                problem,
                kkt,
                cones,
                self.options.alpha,
                self.options.rho_x,
                iter,
            )
            .map_err(SolveError::LinearSolverSetup)?;
            stats.linear_solves += 1;
            iters_run = iter + 1;

            if (iter + 1) % CONVERGED_INTERVAL == 0 {
                let sample = oracle::sample(&ws, problem, self.options.alpha);
                let record = IterationRecord::new(
                    iter,
                    sample.res_pri,
                    sample.res_dual,
                    sample.rel_gap,
                    sample.pobj,
                    sample.dobj,
                    sample.kappa,
                    timer.elapsed(),
                );
                if self.options.verbose && (iter + 1) % PRINT_INTERVAL == 0 {
                    printer::print_row(&record);
                }
                stats.push(record);

                let classified = oracle::classify(&sample, self.options.eps);
                if classified != Verdict::Continue {
                    verdict = classified;
                    hit_max_iters = false;
                    break;
                }
            }

            if let Some(limit) = self.options.max_time {
                if timer.elapsed() > limit {
                    hit_max_iters = false;
                    break;
                }
            }
        }

        let early_verdict = if verdict == Verdict::Continue {
            None
        } else {
            Some(verdict)
        };
        let (sol, metrics) = extract::extract(
            &ws,
            &original,
            &scales,
            equilibrator,
            early_verdict,
            self.options.undet_tol,
        );

        stats.solve_time = timer.elapsed();
        let info = Info {
            status: metrics.status,
            status_tag: metrics.status.tag(hit_max_iters),
            iter: iters_run,
            solve_time: timer.elapsed(),
            pobj: metrics.pobj,
            dobj: metrics.dobj,
            rel_gap: metrics.rel_gap,
            res_pri: metrics.res_pri,
            res_dual: metrics.res_dual,
            linear_solver_summary: ws.method.clone(),
            stats,
        };
        if self.options.verbose {
            printer::print_footer(&info, &original, &sol);
        }
        Ok((sol, info))
    }

    fn build_workspace<K: KktSolver<T>>(
        &self,
        problem: &Problem<T>,
        kkt: &mut K,
        scales: &EquilibrationScales<T>,
        nm_b: T,
        nm_c: T,
    ) -> Result<Workspace<T>, SolveError> {
        let n = problem.nvars();
        let m = problem.ncons();
        let ell = n + m + 1;

        let mut h = vec![T::zero(); n + m];
        h[0..n].copy_from_slice(&problem.c);
        h[n..n + m].copy_from_slice(&problem.b);

        let mut g = h.clone();
        kkt.solve(&mut g, None, 0)
            .map_err(SolveError::LinearSolverSetup)?;
        for v in g[n..n + m].iter_mut() {
            *v = -*v;
        }
        let gth = dot(&g, &h);

        Ok(Workspace {
            n,
            m,
            u: vec![T::zero(); ell],
            v: vec![T::zero(); ell],
            ut: vec![T::zero(); ell],
            u_prev: vec![T::zero(); ell],
            h,
            g,
            gth,
            pr: vec![T::zero(); m],
            dr: vec![T::zero(); n],
            d: scales.d.clone(),
            e: scales.e.clone(),
            sigma_b: scales.sigma_b,
            sigma_c: scales.sigma_c,
            sigma: scales.sigma,
            nm_b,
            nm_c,
            method: None,
        })
    }
}

fn load_cold_start<T: RealNumber>(ws: &mut Workspace<T>) {
    let ell = ws.ell();
    for v in ws.u.iter_mut() {
        *v = T::zero();
    }
    for v in ws.v.iter_mut() {
        *v = T::zero();
    }
    let sqrt_ell = T::from_usize(ell).unwrap().sqrt();
    ws.u[ell - 1] = sqrt_ell;
    ws.v[ell - 1] = sqrt_ell;
}

fn load_warm_start<T, E>(
    ws: &mut Workspace<T>,
    warm: &cvxrs_core::problem::WarmStart<T>,
    scales: &EquilibrationScales<T>,
    equilibrator: &E,
) where
    T: RealNumber,
    E: Equilibrator<T>,
{
    let n = ws.n;
    let m = ws.m;
    let ell = ws.ell();

    let mut x = if warm.x.len() == n {
        warm.x.clone()
    } else {
        vec![T::zero(); n]
    };
    let mut y = if warm.y.len() == m {
        warm.y.clone()
    } else {
        vec![T::zero(); m]
    };
    let mut s = if warm.s.len() == m {
        warm.s.clone()
    } else {
        vec![T::zero(); m]
    };
    equilibrator.normalize_warm_start(scales, &mut x, &mut y, &mut s);

    for v in ws.u.iter_mut() {
        *v = T::zero();
    }
    for v in ws.v.iter_mut() {
        *v = T::zero();
    }
    ws.u[0..n].copy_from_slice(&x);
    ws.u[n..n + m].copy_from_slice(&y);
    ws.v[n..n + m].copy_from_slice(&s);
    ws.u[ell - 1] = T::one();
    ws.v[ell - 1] = T::zero();
}

/// One outer iteration: snapshot, linear-subspace projection, cone
/// projection with over-relaxation, and the dual update. Exactly the five
/// steps the iteration engine's contract names, in order.
fn iterate_once<T, K, P>(
    ws: &mut Workspace<T>,
    problem: &Problem<T>,
    kkt: &mut K,
    cones: &mut P,
    alpha: T,
    rho_x: T,
    iter: usize,
) -> anyhow::Result<()>
where
    T: RealNumber,
    K: KktSolver<T>,
    P: ConeProjector<T>,
{
    ws.u_prev.copy_from_slice(&ws.u);

    project_lin(ws, kkt, rho_x, iter)?;
    project_cone(ws, problem, cones, alpha, iter);
    update_dual(ws, alpha);

    Ok(())
}

fn project_lin<T, K>(ws: &mut Workspace<T>, kkt: &mut K, rho_x: T, iter: usize) -> anyhow::Result<()>
where
    T: RealNumber,
    K: KktSolver<T>,
{
    let n = ws.n;
    let m = ws.m;
    let ell = ws.ell();
    let nm = n + m;

    let mut w = vec![T::zero(); ell];
    for i in 0..ell {
        w[i] = ws.u[i] + ws.v[i];
    }
    for v in w[0..n].iter_mut() {
        *v = *v * rho_x;
    }

    let mut u_tilde = w[0..nm].to_vec();
    for i in 0..nm {
        u_tilde[i] = u_tilde[i] - w[ell - 1] * ws.h[i];
    }
    let correction = dot(&u_tilde, &ws.g) / (ws.gth + T::one());
    for i in 0..nm {
        u_tilde[i] = u_tilde[i] - correction * ws.h[i];
    }
    for v in u_tilde[n..nm].iter_mut() {
        *v = -*v;
    }

    let warm_start: Vec<T> = ws.u[0..nm].to_vec();
    kkt.solve(&mut u_tilde, Some(&warm_start), iter)?;

    ws.ut[ell - 1] = w[ell - 1] + dot(&u_tilde, &ws.h);
    ws.ut[0..nm].copy_from_slice(&u_tilde);

    Ok(())
}

fn project_cone<T, P>(ws: &mut Workspace<T>, problem: &Problem<T>, cones: &mut P, alpha: T, iter: usize)
where
    T: RealNumber,
    P: ConeProjector<T>,
{
    let n = ws.n;
    let m = ws.m;
    let ell = ws.ell();
    let one = T::one();

    let mut q_x = vec![T::zero(); n];
    for i in 0..n {
        q_x[i] = ws.ut[i] - ws.v[i];
    }

    let mut q_y = vec![T::zero(); m];
    for i in 0..m {
        q_y[i] = alpha * ws.ut[n + i] + (one - alpha) * ws.u_prev[n + i] - ws.v[n + i];
    }
    let q_tau = alpha * ws.ut[ell - 1] + (one - alpha) * ws.u_prev[ell - 1] - ws.v[ell - 1];

    cones.project_dual(&mut q_y, &problem.cones, iter);

    ws.u[0..n].copy_from_slice(&q_x);
    ws.u[n..n + m].copy_from_slice(&q_y);
    ws.u[ell - 1] = q_tau.max(T::zero());
}

fn update_dual<T: RealNumber>(ws: &mut Workspace<T>, alpha: T) {
    let n = ws.n;
    let m = ws.m;
    let ell = ws.ell();
    let one = T::one();
    let near_one = (alpha - one).abs() < T::from_f64(1e-9).unwrap();

    for i in n..n + m {
        ws.v[i] = if near_one {
            ws.v[i] + (ws.u[i] - ws.ut[i])
        } else {
            ws.v[i] + (ws.u[i] - alpha * ws.ut[i] - (one - alpha) * ws.u_prev[i])
        };
    }
    ws.v[ell - 1] = if near_one {
        ws.v[ell - 1] + (ws.u[ell - 1] - ws.ut[ell - 1])
    } else {
        ws.v[ell - 1]
            + (ws.u[ell - 1] - alpha * ws.ut[ell - 1] - (one - alpha) * ws.u_prev[ell - 1])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvxrs_cones::ProductConeProjector;
    use cvxrs_core::math::Scalar;
    use cvxrs_core::problem::{Cone, CscMatrix};
    use cvxrs_core::scales::EquilibrationScales;
    use cvxrs_linsys::SaddleKktSolver;

    fn trivial_problem() -> Problem<Scalar> {
        Problem {
            a: CscMatrix {
                nrows: 1,
                ncols: 1,
                indptr: vec![0, 1],
                indices: vec![0],
                data: vec![1.0],
            },
            b: vec![1.0],
            c: vec![-1.0],
            cones: vec![Cone::NonNegative(1)],
        }
    }

    #[test]
    fn cold_start_is_deterministic() {
        let mut ws: Workspace<Scalar> = Workspace {
            n: 1,
            m: 1,
            u: vec![1.0, 2.0, 3.0],
            v: vec![4.0, 5.0, 6.0],
            ut: vec![0.0; 3],
            u_prev: vec![0.0; 3],
            h: vec![0.0; 2],
            g: vec![0.0; 2],
            gth: 0.0,
            pr: vec![0.0],
            dr: vec![0.0],
            d: vec![1.0],
            e: vec![1.0],
            sigma_b: 1.0,
            sigma_c: 1.0,
            sigma: 1.0,
            nm_b: 1.0,
            nm_c: 1.0,
            method: None,
        };
        load_cold_start(&mut ws);
        let first_u = ws.u.clone();
        let first_v = ws.v.clone();

        // Reloading from an already-cold workspace must reproduce exactly
        // the same state, not merely a state with the same norm.
        load_cold_start(&mut ws);
        assert_eq!(ws.u, first_u);
        assert_eq!(ws.v, first_v);
        assert_eq!(ws.u[ws.ell() - 1], (3.0 as Scalar).sqrt());
        assert_eq!(ws.u[0], 0.0);
        assert_eq!(ws.v[0], 0.0);
    }

    #[test]
    fn project_cone_clamps_tau_to_nonnegative() {
        let problem = trivial_problem();
        let mut ws: Workspace<Scalar> = Workspace {
            n: 1,
            m: 1,
            u: vec![0.0; 3],
            v: vec![0.0, 0.0, 5.0],
            ut: vec![0.0, 0.0, -10.0],
            u_prev: vec![0.0; 3],
            h: vec![0.0; 2],
            g: vec![0.0; 2],
            gth: 0.0,
            pr: vec![0.0],
            dr: vec![0.0],
            d: vec![1.0],
            e: vec![1.0],
            sigma_b: 1.0,
            sigma_c: 1.0,
            sigma: 1.0,
            nm_b: 1.0,
            nm_c: 1.0,
            method: None,
        };
        let mut cones = ProductConeProjector::new();
        ConeProjector::<Scalar>::init(&mut cones, &problem.cones).unwrap();
        project_cone(&mut ws, &problem, &mut cones, 1.0, 0);
        assert!(ws.u[ws.ell() - 1] >= 0.0);
    }

    #[test]
    fn g_h_gth_are_fixed_after_setup() {
        let problem = trivial_problem();
        let options = SolveOptions::default();
        let solver = ScsSolver::new(options.clone());
        let mut kkt = SaddleKktSolver::<Scalar>::new();
        kkt.setup(&problem.a, options.rho_x).unwrap();

        let scales = EquilibrationScales::identity(problem.ncons(), problem.nvars());
        let mut ws = solver
            .build_workspace(&problem, &mut kkt, &scales, 1.0, 1.0)
            .unwrap();

        let h_before = ws.h.clone();
        let g_before = ws.g.clone();
        let gth_before = ws.gth;

        let mut cones = ProductConeProjector::new();
        ConeProjector::<Scalar>::init(&mut cones, &problem.cones).unwrap();
        load_cold_start(&mut ws);
        for iter in 0..5 {
            iterate_once(
                &mut ws,
                &problem,
                &mut kkt,
                &mut cones,
                options.alpha,
                options.rho_x,
                iter,
            )
            .unwrap();
        }

        assert_eq!(ws.h, h_before);
        assert_eq!(ws.g, g_before);
        assert_eq!(ws.gth, gth_before);
    }
}
