use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use straight_skeleton::SkeletonBuilder;

fn generate_star(rng: &mut StdRng, n: usize) -> Vec<Coord<f64>> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (n as f64);
            let radius = rng.gen_range(50.0..100.0);
            Coord {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
            }
        })
        .collect()
}

fn bench_star(c: &mut Criterion) {
    let mut group = c.benchmark_group("skeleton");
    group.sample_size(10);

    for size in [16, 64, 256].iter() {
        group.bench_with_input(BenchmarkId::new("star", size), size, |b, &size| {
            let mut rng = StdRng::seed_from_u64(size as u64);
            let points = generate_star(&mut rng, size);
            let builder = SkeletonBuilder::new();
            b.iter(|| builder.build(&points, &[]).unwrap());
        });
    }
    group.finish();
}

fn bench_multi_polygon(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let polygons: Vec<Polygon<f64>> = (0..32)
        .map(|_| {
            let mut ring = LineString::new(generate_star(&mut rng, 32));
            ring.close();
            Polygon::new(ring, vec![])
        })
        .collect();
    let multi_polygon = MultiPolygon::new(polygons);
    let builder = SkeletonBuilder::new();

    c.bench_function("multi_polygon_32x32", |b| {
        b.iter(|| builder.build_multi_polygon(&multi_polygon).unwrap())
    });
}

criterion_group!(benches, bench_star, bench_multi_polygon);
criterion_main!(benches);
