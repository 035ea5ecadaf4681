use crate::scs::oracle::Verdict;
use cvxrs_core::math::{dot, norm2, RealNumber};
use cvxrs_core::problem::Problem;
use cvxrs_core::scales::EquilibrationScales;
use cvxrs_core::solution::{Sol, Status};
use cvxrs_core::traits::Equilibrator;
use cvxrs_core::workspace::Workspace;
use num_traits::FromPrimitive;

/// The numeric `Info` fields the extractor populates; `iter`, `solve_time`,
/// and `linear_solver_summary` are filled in by the engine once extraction
/// returns, since they are not derivable from the terminal iterate alone.
pub struct Metrics<T: RealNumber> {
    pub status: Status,
    pub pobj: T,
    pub dobj: T,
    pub rel_gap: T,
    pub res_pri: T,
    pub res_dual: T,
}

/// Converts the terminal `(u, v)` into `(x, y, s)` and residual/objective
/// diagnostics, per the solution-extraction contract: divide by tau on
/// success, rescale by the appropriate certificate factor on unboundedness
/// or infeasibility, and NaN-fill whatever was not recovered. All
/// post-rescale metrics are computed against `original` — the pristine,
/// pre-equilibration problem — so unnormalization reduces to unscaling the
/// `(x, y, s)` triple alone; the `A` matrix never needs an inverse-scaling
/// pass because the engine recomputes from scratch on every solve (the
/// design choice the solution-extractor note explicitly allows).
pub fn extract<T, E>(
    ws: &Workspace<T>,
    original: &Problem<T>,
    scales: &EquilibrationScales<T>,
    equilibrator: &E,
    early_verdict: Option<Verdict>,
    undet_tol: T,
) -> (Sol<T>, Metrics<T>)
where
    T: RealNumber + FromPrimitive,
    E: Equilibrator<T>,
{
    let n = ws.n;
    let m = ws.m;
    let ell = ws.ell();
    let tau = ws.u[ell - 1];
    let kappa = ws.v[ell - 1].abs();

    let mut x = ws.u[0..n].to_vec();
    let mut y = ws.u[n..n + m].to_vec();
    let mut s = ws.v[n..n + m].to_vec();

    let outcome = match early_verdict {
        Some(Verdict::Solved) => Status::Solved,
        Some(Verdict::Unbounded) => Status::Unbounded,
        Some(Verdict::Infeasible) => Status::Infeasible,
        Some(Verdict::Continue) | None => {
            if tau > undet_tol && tau > kappa {
                Status::Solved
            } else {
                let ell_f = T::from_usize(ell).unwrap();
                if norm2(&ws.u) < undet_tol * ell_f.sqrt() {
                    Status::Indeterminate
                } else {
                    // h = (c; b), cached once at setup and never mutated, so
                    // the scaled c, b needed for this sign comparison are
                    // simply its two halves.
                    let ctx = dot(&ws.h[0..n], &x);
                    let bty = dot(&ws.h[n..n + m], &y);
                    if bty < ctx {
                        Status::Infeasible
                    } else {
                        Status::Unbounded
                    }
                }
            }
        }
    };

    match outcome {
        Status::Solved if tau > T::zero() => {
            for v in x.iter_mut() {
                *v = *v / tau;
            }
            for v in y.iter_mut() {
                *v = *v / tau;
            }
            for v in s.iter_mut() {
                *v = *v / tau;
            }
        }
        Status::Unbounded => y = vec![T::nan(); m],
        Status::Infeasible => {
            x = vec![T::nan(); n];
            s = vec![T::nan(); m];
        }
        Status::Indeterminate | Status::Solved => {
            x = vec![T::nan(); n];
            y = vec![T::nan(); m];
            s = vec![T::nan(); m];
        }
        Status::Failure => unreachable!("failure is handled before extraction"),
    }

    let mut sol = Sol { x, y, s };
    equilibrator.unnormalize_sol_bc(
        scales,
        &mut sol,
        &mut original.b.clone(),
        &mut original.c.clone(),
    );

    // Certificate outcomes additionally rescale the recovered half so the
    // reported objective is exactly -1, per the extractor contract; the
    // residual for that outcome is recomputed against the rescaled vector.
    if outcome == Status::Unbounded {
        let ctx = dot(&original.c, &sol.x);
        if ctx < T::zero() {
            let factor = -T::one() / ctx;
            for v in sol.x.iter_mut() {
                *v = *v * factor;
            }
            for v in sol.s.iter_mut() {
                *v = *v * factor;
            }
        }
    }
    if outcome == Status::Infeasible {
        let bty = dot(&original.b, &sol.y);
        if bty < T::zero() {
            let factor = -T::one() / bty;
            for v in sol.y.iter_mut() {
                *v = *v * factor;
            }
        }
    }

    let metrics = match outcome {
        Status::Solved => {
            let mut ax_s = vec![T::zero(); m];
            original.a.mul(&sol.x, &mut ax_s);
            for (v, &si) in ax_s.iter_mut().zip(sol.s.iter()) {
                *v += si;
            }
            let mut aty_c = vec![T::zero(); n];
            original.a.mul_transpose(&sol.y, &mut aty_c);
            for (v, &ci) in aty_c.iter_mut().zip(original.c.iter()) {
                *v += ci;
            }

            let pobj = dot(&original.c, &sol.x);
            let dobj = -dot(&original.b, &sol.y);
            let one = T::one();
            let rel_gap = (pobj + dobj).abs() / (one + pobj.abs() + dobj.abs());
            let mut residual = ax_s;
            for (v, &bi) in residual.iter_mut().zip(original.b.iter()) {
                *v -= bi;
            }
            let res_pri = norm2(&residual) / (one + norm2(&original.b));
            let res_dual = norm2(&aty_c) / (one + norm2(&original.c));
            Metrics {
                status: Status::Solved,
                pobj,
                dobj,
                rel_gap,
                res_pri,
                res_dual,
            }
        }
        Status::Unbounded => {
            let mut ax_s = vec![T::zero(); m];
            original.a.mul(&sol.x, &mut ax_s);
            for (v, &si) in ax_s.iter_mut().zip(sol.s.iter()) {
                *v += si;
            }
            let res_pri = norm2(&original.c) * norm2(&ax_s);
            Metrics {
                status: Status::Unbounded,
                pobj: -T::one(),
                dobj: T::nan(),
                rel_gap: T::nan(),
                res_pri,
                res_dual: T::nan(),
            }
        }
        Status::Infeasible => {
            let mut aty = vec![T::zero(); n];
            original.a.mul_transpose(&sol.y, &mut aty);
            let res_dual = norm2(&original.b) * norm2(&aty);
            Metrics {
                status: Status::Infeasible,
                pobj: T::nan(),
                dobj: -T::one(),
                rel_gap: T::nan(),
                res_pri: T::nan(),
                res_dual,
            }
        }
        Status::Indeterminate => Metrics {
            status: Status::Indeterminate,
            pobj: T::nan(),
            dobj: T::nan(),
            rel_gap: T::nan(),
            res_pri: T::nan(),
            res_dual: T::nan(),
        },
        Status::Failure => unreachable!("failure is handled before extraction"),
    };

    (sol, metrics)
}
