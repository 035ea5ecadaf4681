use anyhow::Result;
use cvxrs_api::{Method, ProblemBuilder, Solver};
use cvxrs_core::math::Scalar;
use cvxrs_core::options::SolveOptions;
use cvxrs_core::problem::{Cone, CscMatrix};

/// A minimum-cost transportation problem (3 sources, 3 sinks, 9 arcs):
/// minimize arc cost subject to supply/demand balance (`Zero` cone) and
/// nonnegative flows (`NonNegative` cone).
fn main() -> Result<()> {
    let cost = vec![2.0, 3.0, 1.5, 2.5, 4.0, 3.5, 3.0, 2.0, 1.0];
    let n = cost.len();
    let supply_demand = vec![80.0, 65.0, 75.0, 70.0, 60.0, 90.0];

    let a = flow_constraints(n);
    let mut b = supply_demand.clone();
    b.extend(std::iter::repeat(0.0).take(n));

    let problem = ProblemBuilder::new()
        .a(a)
        .b(b)
        .c(cost)
        .cone(Cone::Zero(supply_demand.len()))
        .cone(Cone::NonNegative(n))
        .build()?;

    let mut solver = Solver::<Scalar>::new()
        .method(Method::Scs)
        .options(SolveOptions::default());
    let (sol, info) = solver.solve(problem)?;

    println!("status: {}", info.status_tag);
    println!("flows: {:?}", sol.x);
    println!("objective: {:.6}", info.pobj);
    Ok(())
}

/// Stacks the 6-row supply/demand balance block (`Zero` cone, `s = 0`) over
/// a 9-row `-I` block enforcing `x >= 0` (`NonNegative` cone).
fn flow_constraints(n: usize) -> CscMatrix<Scalar> {
    let mut indptr = vec![0];
    let mut indices = Vec::new();
    let mut data = Vec::new();
    for source in 0..3 {
        for sink in 0..3 {
            indices.push(source);
            data.push(1.0);
            indices.push(3 + sink);
            data.push(1.0);
            indices.push(6 + source * 3 + sink);
            data.push(-1.0);
            indptr.push(indices.len());
        }
    }
    CscMatrix {
        nrows: 6 + n,
        ncols: n,
        indptr,
        indices,
        data,
    }
}
