//! Criterion benchmarks for the H↔V converters.
//!
//! Random polytopes are a cube `[-1,1]^d` cut by extra half-spaces; sizes
//! sweep the number of cuts to capture scaling of the enumeration hull.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::DVector;
use polyregion::api::{halfspace_intersection, vertex_hull};
use polyregion::Halfspace;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_system(dim: usize, cuts: usize, seed: u64) -> Vec<Halfspace> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut hs = Vec::with_capacity(2 * dim + cuts);
    for axis in 0..dim {
        for sign in [-1.0, 1.0] {
            let mut n = DVector::zeros(dim);
            n[axis] = sign;
            hs.push(Halfspace::new(n, -1.0));
        }
    }
    // Keep the origin inside: every cut has a negative constant.
    for _ in 0..cuts {
        let mut n = DVector::from_fn(dim, |_, _| rng.gen_range(-1.0..1.0));
        while n.norm() < 1e-6 {
            n = DVector::from_fn(dim, |_, _| rng.gen_range(-1.0..1.0));
        }
        n /= n.norm();
        hs.push(Halfspace::new(n, -rng.gen_range(0.6..1.8)));
    }
    hs
}

fn bench_h_to_v(c: &mut Criterion) {
    let mut group = c.benchmark_group("h_to_v");
    for &dim in &[2usize, 3] {
        for &cuts in &[0usize, 4, 8, 16] {
            group.bench_with_input(
                BenchmarkId::new(format!("d{dim}"), cuts),
                &cuts,
                |b, &m| {
                    b.iter_batched(
                        || random_system(dim, m, 17 + m as u64),
                        |hs| {
                            let _ = black_box(halfspace_intersection(&hs, dim, 1e-7, 0.0));
                        },
                        BatchSize::SmallInput,
                    )
                },
            );
        }
    }
    group.finish();
}

fn bench_v_to_h(c: &mut Criterion) {
    let mut group = c.benchmark_group("v_to_h");
    for &count in &[8usize, 16, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &n| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(31 + n as u64);
                    (0..n)
                        .map(|_| DVector::from_fn(3, |_, _| rng.gen_range(-1.0..1.0)))
                        .collect::<Vec<_>>()
                },
                |pts| {
                    let _ = black_box(vertex_hull(&pts, 3, true, 0.0));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_h_to_v, bench_v_to_h);
criterion_main!(benches);
