//! Criterion benchmarks for region volume and complement.
//!
//! Both are exponential in the number of members; sizes stay small.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::DVector;
use polyregion::{ConvexPolytope, Halfspace, PolytopeCfg, SpaceRegion};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_boxes(members: usize, seed: u64) -> SpaceRegion {
    let mut rng = StdRng::seed_from_u64(seed);
    let cfg = PolytopeCfg::default();
    let polytopes = (0..members)
        .map(|_| {
            let lo = DVector::from_fn(2, |_, _| rng.gen_range(-1.0..0.5));
            let hs: Vec<Halfspace> = (0..2)
                .flat_map(|k| {
                    let side = rng.gen_range(0.5..1.5);
                    let mut n = DVector::zeros(2);
                    n[k] = 1.0;
                    [
                        Halfspace::new(-n.clone(), lo[k]),
                        Halfspace::new(n, -(lo[k] + side)),
                    ]
                })
                .collect();
            ConvexPolytope::from_halfspaces(&hs, 2, &cfg)
        })
        .collect();
    SpaceRegion::new(2, polytopes)
}

fn bench_region(c: &mut Criterion) {
    let cfg = PolytopeCfg::default();
    let mut group = c.benchmark_group("region");
    for &members in &[1usize, 2, 4, 6] {
        group.bench_with_input(BenchmarkId::new("volume", members), &members, |b, &n| {
            b.iter_batched(
                || random_boxes(n, 5 + n as u64),
                |r| {
                    let _ = black_box(r.volume(&cfg));
                },
                BatchSize::SmallInput,
            )
        });
    }
    for &members in &[1usize, 2, 3] {
        group.bench_with_input(BenchmarkId::new("complement", members), &members, |b, &n| {
            b.iter_batched(
                || random_boxes(n, 9 + n as u64),
                |r| {
                    let _ = black_box(r.complement(&cfg));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_region);
criterion_main!(benches);
