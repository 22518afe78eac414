use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rusty_spectral::prelude::*;

fn bench_chebfun2_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("chebfun2_construct");
    for &tol in &[1E-6, 1E-10, 1E-13] {
        let prefs = Preferences::default().with_tolerance(tol);
        group.bench_with_input(BenchmarkId::from_parameter(tol), &prefs, |b, prefs| {
            b.iter(|| {
                let f = Chebfun2::<f64>::construct(
                    |x, y| 1.0 / (1.0 + 10.0 * (x * x + y * y)),
                    Rectangle::default(),
                    prefs,
                )
                .unwrap();
                black_box(f.length());
            });
        });
    }
    group.finish();
}

fn bench_chebfun3_construct(c: &mut Criterion) {
    let prefs = Preferences::default();
    c.bench_function("chebfun3_construct", |b| {
        b.iter(|| {
            let f = Chebfun3::<f64>::construct(|x, y, z| (x + y * z).cos(), Cuboid::default(), &prefs).unwrap();
            black_box(f.length());
        });
    });
}

criterion_group!(benches, bench_chebfun2_construct, bench_chebfun3_construct);
criterion_main!(benches);
