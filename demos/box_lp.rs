use anyhow::Result;
use cvxrs_api::{Method, ProblemBuilder, Solver};
use cvxrs_core::math::Scalar;
use cvxrs_core::options::SolveOptions;
use cvxrs_core::problem::{Cone, CscMatrix};

/// A box-constrained LP: minimize `c'x` subject to `lo <= x <= hi`, encoded
/// as two stacked nonnegative-orthant blocks (`x - lo >= 0`, `hi - x >= 0`).
fn main() -> Result<()> {
    let c = vec![-2.0, -5.0, -3.0];
    let lower = vec![0.0, -1.0, 0.0];
    let upper = vec![1.0, 2.0, 4.0];
    let n = c.len();

    let a = box_constraints(n);
    let mut b = lower.iter().map(|&lo| -lo).collect::<Vec<_>>();
    b.extend(upper.iter().copied());

    let problem = ProblemBuilder::new()
        .a(a)
        .b(b)
        .c(c)
        .cone(Cone::NonNegative(2 * n))
        .build()?;

    let mut solver = Solver::<Scalar>::new()
        .method(Method::Scs)
        .options(SolveOptions::default());
    let (sol, info) = solver.solve(problem)?;

    println!("status: {}", info.status_tag);
    println!("x: {:?}", sol.x);
    println!("objective: {:.6}", info.pobj);
    Ok(())
}

/// Stacks `-I` over `I`, so `Ax + s = b` reads `s = x - lo` on the top block
/// and `s = hi - x` on the bottom block.
fn box_constraints(n: usize) -> CscMatrix<Scalar> {
    let mut indptr = Vec::with_capacity(n + 1);
    let mut indices = Vec::with_capacity(2 * n);
    let mut data = Vec::with_capacity(2 * n);
    indptr.push(0);
    for col in 0..n {
        indices.push(col);
        data.push(-1.0);
        indices.push(n + col);
        data.push(1.0);
        indptr.push(indices.len());
    }
    CscMatrix {
        nrows: 2 * n,
        ncols: n,
        indptr,
        indices,
        data,
    }
}
