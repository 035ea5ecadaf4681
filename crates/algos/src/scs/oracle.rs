use cvxrs_core::math::{dot, norm2, RealNumber};
use cvxrs_core::problem::Problem;
use cvxrs_core::workspace::Workspace;
use num_traits::FromPrimitive;

/// The termination oracle's verdict, consulted every `CONVERGED_INTERVAL`
/// iterations. `Continue` means the iteration should proceed; every other
/// variant short-circuits the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Solved,
    Unbounded,
    Infeasible,
    Continue,
}

/// The residual snapshot taken at a sampling iteration, reused both for the
/// classification below and for the verbose printer's residual row.
#[derive(Debug, Clone, Copy)]
pub struct Sample<T: RealNumber> {
    pub tau: T,
    pub kappa: T,
    pub pobj: T,
    pub dobj: T,
    pub res_unb: T,
    pub res_inf: T,
    pub res_pri: T,
    pub res_dual: T,
    pub rel_gap: T,
    pub nm_b: T,
    pub nm_c: T,
}

fn weighted_norm<T: RealNumber>(values: &[T], weights: &[T], denom: T) -> T {
    let scaled: Vec<T> = values
        .iter()
        .zip(weights.iter())
        .map(|(&v, &w)| v * w / denom)
        .collect();
    norm2(&scaled)
}

/// Samples residuals at the current iterate using the "fast" primal
/// residual identity from the iteration engine (avoiding an extra `A*x`)
/// and an explicit `A'y` recompute for the dual residual.
pub fn sample<T>(ws: &Workspace<T>, problem: &Problem<T>, alpha: T) -> Sample<T>
where
    T: RealNumber + FromPrimitive,
{
    let n = ws.n;
    let m = ws.m;
    let ell = ws.ell();
    let tau = ws.u[ell - 1];
    let kappa = ws.v[ell - 1].abs();

    let two = T::from_f64(2.0).unwrap();
    let one = T::one();
    let mut r_p = vec![T::zero(); m];
    for i in 0..m {
        r_p[i] = ws.u[n + i]
            + (alpha - two) * ws.u_prev[n + i]
            + (one - alpha) * ws.ut[n + i]
            + ws.ut[ell - 1] * problem.b[i];
    }

    let divisor_normalize = ws.sigma_b * ws.sigma;
    let res_unb = weighted_norm(&r_p, &ws.d, divisor_normalize);

    let mut b_tau = vec![T::zero(); m];
    for i in 0..m {
        b_tau[i] = r_p[i] - problem.b[i] * tau;
    }
    let res_pri_raw = weighted_norm(&b_tau, &ws.d, divisor_normalize);

    let mut aty = vec![T::zero(); n];
    problem.a.mul_transpose(&ws.u[n..n + m], &mut aty);

    let divisor_c = ws.sigma_c * ws.sigma;
    let res_inf = weighted_norm(&aty, &ws.e, divisor_c);

    let mut dr = vec![T::zero(); n];
    for i in 0..n {
        dr[i] = aty[i] + problem.c[i] * tau;
    }
    let res_dual_raw = weighted_norm(&dr, &ws.e, divisor_c);

    let objective_divisor = ws.sigma * ws.sigma_b * ws.sigma_c;
    let pobj = dot(&problem.c, &ws.u[0..n]) / objective_divisor;
    let dobj = dot(&problem.b, &ws.u[n..n + m]) / objective_divisor;

    let rel_gap = (pobj + dobj).abs() / (tau + pobj.abs() + dobj.abs());
    let res_pri = res_pri_raw / ((one + ws.nm_b) * tau.max(T::from_f64(1e-300).unwrap()));
    let res_dual = res_dual_raw / ((one + ws.nm_c) * tau.max(T::from_f64(1e-300).unwrap()));

    Sample {
        tau,
        kappa,
        pobj,
        dobj,
        res_unb,
        res_inf,
        res_pri,
        res_dual,
        rel_gap,
        nm_b: ws.nm_b,
        nm_c: ws.nm_c,
    }
}

/// Classifies a residual sample in the priority order the oracle contract
/// requires: unboundedness first, then infeasibility, then optimality, else
/// keep iterating. A point satisfying both (1) and (2) simultaneously — a
/// pathological, practically unreachable case — is reported UNBOUNDED.
pub fn classify<T: RealNumber>(sample: &Sample<T>, eps: T) -> Verdict {
    if sample.pobj < T::zero() && sample.nm_b * sample.res_unb / (-sample.pobj) < eps {
        return Verdict::Unbounded;
    }
    if sample.dobj < T::zero() && sample.nm_c * sample.res_inf / (-sample.dobj) < eps {
        return Verdict::Infeasible;
    }
    if sample.tau > sample.kappa
        && sample
            .res_pri
            .max(sample.res_dual)
            .max(sample.rel_gap)
            < eps
    {
        return Verdict::Solved;
    }
    Verdict::Continue
}
