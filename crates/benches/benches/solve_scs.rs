use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use cvxrs_api::{Method, ProblemBuilder, Solver};
use cvxrs_benches::random_lp;
use cvxrs_core::math::Scalar;
use cvxrs_core::options::SolveOptions;
use rand::{rngs::SmallRng, SeedableRng};

fn build_problem(n: usize, m: usize, rng: &mut SmallRng) -> ProblemBuilder<Scalar> {
    let (a, b, c, cones) = random_lp(n, m, rng);
    ProblemBuilder::new().a(a).b(b).c(c).cones(cones)
}

fn solve_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scs_cone_solve");
    let mut rng = SmallRng::seed_from_u64(42);
    group.bench_function("n=50_m=75", |b| {
        b.iter_batched(
            || build_problem(50, 75, &mut rng).build().unwrap(),
            |problem| {
                let mut solver = Solver::<Scalar>::new()
                    .method(Method::Scs)
                    .options(SolveOptions::default());
                let _ = solver.solve(problem).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, solve_benchmark);
criterion_main!(benches);
