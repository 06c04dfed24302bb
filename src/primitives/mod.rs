pub mod line;
pub mod vector;

pub use line::{ImplicitLine, Ray};
pub use vector::{Vector2d, VectorOps};

use geo::{Area, Intersects};
use geo_types::{LineString, Point, Polygon};

/// Cross products below this magnitude treat two ray directions as parallel.
const PARALLEL_TOLERANCE: f64 = 1e-8;

/// Direction of the angle bisector between two edge directions.
///
/// The result points to the left of both edges (into a counter-clockwise
/// polygon) and is not normalized.
pub fn bisector_direction(norm1: Vector2d, norm2: Vector2d) -> Vector2d {
    let e1v = norm1.orthogonal_left();
    let e2v = norm2.orthogonal_left();

    if norm1.dot(norm2) > 0.0 {
        return e1v + e2v;
    }

    let ret = norm2 - norm1;
    if e1v.dot(norm2) < 0.0 {
        return -ret;
    }
    ret
}

/// Projection of `vector` onto the direction of `axis`.
pub fn orthogonal_projection(axis: Vector2d, vector: Vector2d) -> Vector2d {
    let n = axis.normalized();
    Vector2d {
        x: vector.x * n.x * n.x + vector.y * n.x * n.y,
        y: vector.x * n.x * n.y + vector.y * n.y * n.y,
    }
}

/// First intersection point of two rays, including collinear overlaps.
pub fn intersect_rays(r1: &Ray, r2: &Ray) -> Option<Vector2d> {
    let s1p0 = r1.origin;
    let s1p1 = r1.origin + r1.direction;
    let s2p0 = r2.origin;

    let u = r1.direction;
    let v = r2.direction;
    let w = s1p0 - s2p0;
    let d = u.perp(v);

    if d.abs() < PARALLEL_TOLERANCE {
        // Parallel, only collinear rays can still meet
        if u.perp(w) != 0.0 || v.perp(w) != 0.0 {
            return None;
        }

        let du = u.dot(u);
        let dv = v.dot(v);

        if du == 0.0 && dv == 0.0 {
            return if s1p0 == s2p0 { Some(s1p0) } else { None };
        }
        if du == 0.0 {
            return in_collinear_ray(s1p0, s2p0, v).then_some(s1p0);
        }
        if dv == 0.0 {
            return in_collinear_ray(s2p0, s1p0, u).then_some(s2p0);
        }

        let w2 = s1p1 - s2p0;
        let (mut t0, mut t1) = if v.x != 0.0 {
            (w.x / v.x, w2.x / v.x)
        } else {
            (w.y / v.y, w2.y / v.y)
        };

        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t1 < 0.0 {
            return None;
        }
        let t0 = t0.max(0.0);
        return Some(s2p0 + v * t0);
    }

    let s_i = v.perp(w) / d;
    if s_i < 0.0 {
        return None;
    }

    let t_i = u.perp(w) / d;
    if t_i < 0.0 {
        return None;
    }

    Some(s1p0 + u * s_i)
}

fn in_collinear_ray(p: Vector2d, ray_start: Vector2d, ray_direction: Vector2d) -> bool {
    ray_direction.dot(p - ray_start) >= 0.0
}

/// Shoelace area of an implicitly closed ring, positive for counter-clockwise.
pub fn signed_area(ring: &[Vector2d]) -> f64 {
    // Polygon::new closes the exterior ring for us.
    Polygon::new(LineString::from(ring.to_vec()), vec![]).signed_area()
}

pub fn is_clockwise(ring: &[Vector2d]) -> bool {
    signed_area(ring) < 0.0
}

/// Tests `point` against an implicitly closed ring. Points on the ring
/// itself count as inside.
pub fn is_point_inside_polygon(point: Vector2d, ring: &[Vector2d]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    Polygon::new(LineString::from(ring.to_vec()), vec![]).intersects(&Point::from(point))
}
