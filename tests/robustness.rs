use geo::Area;
use geo_types::{Coord, LineString, Polygon};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use straight_skeleton::{SkeletonBuilder, SkeletonError};

/// Star-shaped polygon around the origin with `n` vertices at random radii.
fn random_star(rng: &mut StdRng, n: usize, scale: f64) -> Vec<Coord<f64>> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (n as f64);
            let radius = rng.gen_range(0.5..1.0) * scale;
            Coord {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
            }
        })
        .collect()
}

fn regular_polygon(n: usize, radius: f64) -> Vec<Coord<f64>> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (n as f64);
            Coord {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
            }
        })
        .collect()
}

fn ring_area(points: &[Coord<f64>]) -> f64 {
    let mut ls = LineString::new(points.to_vec());
    ls.close();
    Polygon::new(ls, vec![]).unsigned_area()
}

#[test]
fn test_random_convex_polygons() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let n = rng.gen_range(3..12);
        let mut angles: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..2.0 * PI)).collect();
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        angles.dedup_by(|a, b| (*a - *b).abs() < 0.2);
        if angles.len() < 3 {
            continue;
        }
        let points: Vec<Coord<f64>> = angles
            .iter()
            .map(|a| Coord { x: 5.0 * a.cos(), y: 5.0 * a.sin() })
            .collect();

        let skeleton = SkeletonBuilder::new().build(&points, &[]).unwrap();
        assert_eq!(skeleton.edges.len(), points.len());
        let area = skeleton.to_multi_polygon().unsigned_area();
        assert!((area - ring_area(&points)).abs() < 1e-6 * ring_area(&points));
    }
}

#[test]
fn test_random_star_polygons_tile_their_area() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in 5..=30 {
        for seed in 0..12 {
            let points = random_star(&mut rng, n, 10.0);
            let skeleton = match SkeletonBuilder::new().build(&points, &[]) {
                Ok(skeleton) => skeleton,
                Err(SkeletonError::InvalidGeometry(msg)) => panic!("rejected valid input: {}", msg),
                Err(e) => panic!("star n = {} #{} failed: {}\n{:?}", n, seed, e, points),
            };

            assert_eq!(skeleton.edges.len(), points.len());
            for face in &skeleton.edges {
                assert!(face.polygon.contains(&face.edge.start));
                assert!(face.polygon.contains(&face.edge.end));
            }

            let expected = ring_area(&points);
            let area = skeleton.to_multi_polygon().unsigned_area();
            assert!(
                (area - expected).abs() < 1e-6 * expected,
                "star n = {} #{}: faces cover {} of {}\n{:?}",
                n,
                seed,
                area,
                expected,
                points
            );
        }
    }
}

#[test]
fn test_regular_polygons_collapse_to_center() {
    for n in [3, 5, 6, 8, 12] {
        let points = regular_polygon(n, 2.0);
        let skeleton = SkeletonBuilder::new().build(&points, &[]).unwrap();

        assert_eq!(skeleton.edges.len(), n);
        assert!(skeleton.edges.iter().all(|f| f.polygon.len() == 3), "n = {}", n);

        let apothem = 2.0 * (PI / n as f64).cos();
        let max_height = skeleton.distances.values().copied().fold(0.0, f64::max);
        assert!((max_height - apothem).abs() < 1e-4, "n = {}", n);
    }
}

#[test]
fn test_tiny_and_huge_coordinates() {
    let base = [(0.0, 0.0), (3.0, 0.0), (3.0, 2.0), (1.5, 1.0), (0.0, 2.0)];
    for (scale, offset) in [(1e-6, 0.0), (1.0, 1e3), (1e4, -5e5)] {
        let points: Vec<Coord<f64>> = base
            .iter()
            .map(|&(x, y)| Coord { x: x * scale + offset, y: y * scale + offset })
            .collect();
        let skeleton = SkeletonBuilder::new().build(&points, &[]).unwrap();
        assert_eq!(skeleton.edges.len(), 5, "scale {} offset {}", scale, offset);
    }
}
