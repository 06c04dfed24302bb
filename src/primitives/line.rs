use super::vector::{Vector2d, VectorOps};
use geo_types::Coord;

/// Line in implicit form `a*x + b*y + c = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImplicitLine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ImplicitLine {
    pub fn through(p1: Vector2d, p2: Vector2d) -> Self {
        Self {
            a: p1.y - p2.y,
            b: p2.x - p1.x,
            c: p1.x * p2.y - p2.x * p1.y,
        }
    }

    pub fn from_coefficients(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Intersection point, or `None` when the determinant is exactly zero.
    pub fn intersect(&self, other: &ImplicitLine) -> Option<Vector2d> {
        let wab = self.a * other.b - other.a * self.b;
        let wbc = self.b * other.c - other.b * self.c;
        let wca = self.c * other.a - other.c * self.a;

        if wab == 0.0 {
            return None;
        }
        Some(Coord { x: wbc / wab, y: wca / wab })
    }

    pub fn contains(&self, point: Vector2d) -> bool {
        (point.x * self.a + point.y * self.b + self.c).abs() < f64::EPSILON
    }
}

/// Parametric ray `origin + t * direction`, `t >= 0`.
///
/// The direction is not required to be unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vector2d,
    pub direction: Vector2d,
}

impl Ray {
    pub fn new(origin: Vector2d, direction: Vector2d) -> Self {
        Self { origin, direction }
    }

    pub fn to_implicit(&self) -> ImplicitLine {
        let a = self.direction.y;
        let b = -self.direction.x;
        let c = -(a * self.origin.x + b * self.origin.y);
        ImplicitLine::from_coefficients(a, b, c)
    }

    /// Point where the ray meets `line`, rejecting parallel lines and hits
    /// that are not at least `epsilon` ahead of the origin.
    pub fn collide(&self, line: &ImplicitLine, epsilon: f64) -> Option<Vector2d> {
        let hit = self.to_implicit().intersect(line)?;
        if self.direction.dot(hit - self.origin) < epsilon {
            return None;
        }
        Some(hit)
    }

    pub fn is_on_left_side(&self, point: Vector2d, epsilon: f64) -> bool {
        let offset = point - self.origin;
        self.direction.orthogonal_right().dot(offset) < epsilon
    }

    pub fn is_on_right_side(&self, point: Vector2d, epsilon: f64) -> bool {
        let offset = point - self.origin;
        self.direction.orthogonal_right().dot(offset) > -epsilon
    }

    /// Flip the ray to point the opposite way.
    pub fn negate(&mut self) {
        self.direction = -self.direction;
    }
}
