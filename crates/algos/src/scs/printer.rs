//! Verbose console output: a header banner, one row per `PRINT_INTERVAL`
//! iterations, and a footer with outcome-specific certificate or residual
//! blocks. Emitted through `tracing` (matching the ambient logging stack
//! used throughout the workspace) rather than directly to stdout, so a
//! caller's subscriber controls where these lines actually land.

use cvxrs_core::math::{norm2, RealNumber};
use cvxrs_core::options::SolveOptions;
use cvxrs_core::problem::Problem;
use cvxrs_core::solution::{Info, Sol, Status};
use cvxrs_core::stats::IterationRecord;
use cvxrs_cones::cone_header;
use num_traits::FromPrimitive;

/// `RealNumber` carries no `Display`/`ToPrimitive` bound, so every value
/// printed here is widened to `f64` first; solver precision (f32 or f64)
/// is unaffected since this only touches the reporting path.
fn as_f64<T: RealNumber>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Emits the header banner: method, parameters, dimensions, and a warm
/// start notice, followed by the column titles every residual row lines up
/// against.
pub fn print_header<T>(problem: &Problem<T>, options: &SolveOptions<T>, warm_started: bool)
where
    T: RealNumber,
{
    tracing::info!("cvxrs: homogeneous self-dual embedding splitting solver");
    tracing::info!(
        "parameters: eps={}, alpha={}, max_iterations={}, normalize={}",
        as_f64(options.eps),
        as_f64(options.alpha),
        options.max_iterations,
        options.normalize
    );
    tracing::info!(
        "dimensions: n={}, m={}, nnz={}",
        problem.nvars(),
        problem.ncons(),
        problem.a.nnz()
    );
    if warm_started {
        tracing::info!("warm start: loaded from caller-supplied (x, y, s)");
    }
    tracing::info!("{}", cone_header(&problem.cones));
    tracing::info!("iter | pri res | dua res | rel gap | pri obj | dua obj | kappa | time (s)");
}

/// Emits one residual row.
pub fn print_row<T>(record: &IterationRecord<T>)
where
    T: RealNumber,
{
    tracing::info!(
        "{:>5} | {:.3e} | {:.3e} | {:.3e} | {:+.3e} | {:+.3e} | {:.3e} | {:.2}",
        record.iteration,
        as_f64(record.res_pri),
        as_f64(record.res_dual),
        as_f64(record.rel_gap),
        as_f64(record.pobj),
        as_f64(record.dobj),
        as_f64(record.kappa),
        record.elapsed.as_secs_f64(),
    );
}

/// Emits the footer: status, wall time, linear-solver summary, and one of
/// the three outcome-specific blocks (infeasibility certificate,
/// unboundedness certificate, or error metrics).
pub fn print_footer<T>(info: &Info<T>, problem: &Problem<T>, sol: &Sol<T>)
where
    T: RealNumber + FromPrimitive,
{
    tracing::info!("status: {}", info.status_tag);
    tracing::info!("wall time: {:.3}s", info.solve_time.as_secs_f64());
    if let Some(summary) = &info.linear_solver_summary {
        tracing::info!("linear solver: {summary}");
    }

    match info.status {
        Status::Infeasible => {
            let mut aty = vec![T::zero(); problem.nvars()];
            problem.a.mul_transpose(&sol.y, &mut aty);
            let bty: T = problem
                .b
                .iter()
                .zip(sol.y.iter())
                .fold(T::zero(), |acc, (&b, &y)| acc + b * y);
            tracing::info!(
                "infeasibility certificate: |A'y|*|b| = {:.3e}, dist(y, K*) = 0, b'y = {:.3e}",
                as_f64(norm2(&aty) * norm2(&problem.b)),
                as_f64(bty)
            );
        }
        Status::Unbounded => {
            let mut ax_s = vec![T::zero(); problem.ncons()];
            problem.a.mul(&sol.x, &mut ax_s);
            for (v, &si) in ax_s.iter_mut().zip(sol.s.iter()) {
                *v += si;
            }
            let ctx: T = problem
                .c
                .iter()
                .zip(sol.x.iter())
                .fold(T::zero(), |acc, (&c, &x)| acc + c * x);
            tracing::info!(
                "unboundedness certificate: |Ax+s|*|c| = {:.3e}, dist(s, K) = 0, c'x = {:.3e}",
                as_f64(norm2(&ax_s) * norm2(&problem.c)),
                as_f64(ctx)
            );
        }
        Status::Solved => {
            tracing::info!(
                "error metrics: res_pri = {:.3e}, res_dual = {:.3e}, rel_gap = {:.3e}",
                as_f64(info.res_pri),
                as_f64(info.res_dual),
                as_f64(info.rel_gap)
            );
            tracing::info!(
                "dist(s, K) = 0, dist(y, K*) = 0, s'y = 0; c'x = {:.3e}, -b'y = {:.3e}",
                as_f64(info.pobj),
                as_f64(info.dobj)
            );
        }
        Status::Indeterminate | Status::Failure => {}
    }
}
