use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rusty_spectral::prelude::*;

fn bench_matrix_exp(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_exp");
    let mut rng = rand::thread_rng();
    for &n in &[32, 64, 128] {
        let mat: Array2<f64> = f64::random_gaussian((n, n), &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(n), &mat, |b, mat| {
            b.iter(|| black_box(mat.expm().unwrap()));
        });
    }
    group.finish();
}

fn bench_heat_semigroup(c: &mut Criterion) {
    let mut group = c.benchmark_group("heat_semigroup");
    let interval = Interval::unit();
    let op = Operator::new(interval, Expr::u().diff(2)).with_boundary_conditions(BoundaryConditions::Dirichlet);
    for &discretization in &[Discretization::Collocation, Discretization::Ultraspherical] {
        let prefs = Preferences::default().with_discretization(discretization);
        let u0 = Chebfun::<f64>::construct(|x| (-20.0 * (x + 0.3).powi(2)).exp(), interval, &prefs).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", discretization)),
            &prefs,
            |b, prefs| {
                b.iter(|| black_box(expm(&op, &[0.01, 0.1], &u0, prefs).unwrap()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_matrix_exp, bench_heat_semigroup);
criterion_main!(benches);
