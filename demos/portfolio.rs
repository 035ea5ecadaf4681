use anyhow::Result;
use cvxrs_api::{Method, ProblemBuilder, Solver};
use cvxrs_core::math::Scalar;
use cvxrs_core::options::SolveOptions;
use cvxrs_core::problem::{Cone, CscMatrix};

/// Mean-variance portfolio selection as a second-order cone program: with
/// `x` the asset weights and `t` an auxiliary risk variable, minimize
/// `-mu'x + gamma*t` subject to `sum(x) = 1`, `x >= 0`, and
/// `(t, sigma_1 x_1, ..., sigma_n x_n)` in the second-order cone — the
/// standard epigraph form of `t >= ||diag(sigma)x||_2`, a convex surrogate
/// for portfolio variance under a diagonal covariance model.
fn main() -> Result<()> {
    let mu = vec![0.12, 0.10, 0.07, 0.03];
    let sigma = vec![0.22, 0.14, 0.10, 0.07];
    let gamma = 2.0;
    let n = mu.len();

    let mut c = mu.iter().map(|&m| -m).collect::<Vec<_>>();
    c.push(gamma);

    let a = portfolio_constraints(n, &sigma);
    let mut b = vec![1.0];
    b.extend(std::iter::repeat(0.0).take(n + 1 + (n + 1)));

    let cones = vec![
        Cone::Zero(1),
        Cone::NonNegative(n + 1),
        Cone::SecondOrder(n + 1),
    ];

    let problem = ProblemBuilder::new().a(a).b(b).c(c).cones(cones).build()?;

    let mut solver = Solver::<Scalar>::new()
        .method(Method::Scs)
        .options(SolveOptions::default());
    let (sol, info) = solver.solve(problem)?;

    println!("status: {}", info.status_tag);
    println!("weights: {:?}", &sol.x[..n]);
    println!("risk budget t: {:.6}", sol.x[n]);
    println!("objective: {:.6}", info.pobj);
    Ok(())
}

/// Variables are `(x_1, ..., x_n, t)`. Rows, in order:
/// - budget: `sum(x) = 1` (Zero cone, 1 row)
/// - nonnegativity: `-x_i + s = 0` for each `x_i`, and `-t + s = 0` (NonNegative, n+1 rows)
/// - risk cone: `-t + s_0 = 0`, `-sigma_i x_i + s_i = 0` (SecondOrder, n+1 rows)
fn portfolio_constraints(n: usize, sigma: &[Scalar]) -> CscMatrix<Scalar> {
    let nvars = n + 1;
    let mut indptr = Vec::with_capacity(nvars + 1);
    let mut indices = Vec::new();
    let mut data = Vec::new();
    indptr.push(0);

    let nonneg_offset = 1;
    let soc_offset = 1 + nvars;

    for col in 0..n {
        indices.push(0);
        data.push(1.0);
        indices.push(nonneg_offset + col);
        data.push(-1.0);
        indices.push(soc_offset + 1 + col);
        data.push(-sigma[col]);
        indptr.push(indices.len());
    }
    // t column: budget row untouched, nonnegativity row, SOC head row.
    indices.push(nonneg_offset + n);
    data.push(-1.0);
    indices.push(soc_offset);
    data.push(-1.0);
    indptr.push(indices.len());

    CscMatrix {
        nrows: 1 + nvars + nvars,
        ncols: nvars,
        indptr,
        indices,
        data,
    }
}
