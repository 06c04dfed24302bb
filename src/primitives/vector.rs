use geo_types::Coord;

/// Points and directions share one representation.
pub type Vector2d = Coord<f64>;

/// Vector algebra on top of `geo_types::Coord`.
///
/// Equality stays exact (`Coord: PartialEq`); callers apply their own epsilon.
pub trait VectorOps: Sized {
    fn dot(self, other: Self) -> f64;

    /// z-component of the 3D cross product.
    fn perp(self, other: Self) -> f64;

    fn length(self) -> f64;

    fn distance_to(self, other: Self) -> f64;

    fn distance_squared(self, other: Self) -> f64;

    /// Unit vector in the same direction. A zero vector yields NaN components.
    fn normalized(self) -> Self;

    /// Rotated 90 degrees counter-clockwise.
    fn orthogonal_left(self) -> Self;

    /// Rotated 90 degrees clockwise.
    fn orthogonal_right(self) -> Self;
}

impl VectorOps for Coord<f64> {
    #[inline]
    fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    fn perp(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[inline]
    fn distance_to(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    #[inline]
    fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    fn normalized(self) -> Self {
        let inv = 1.0 / self.length();
        Coord { x: self.x * inv, y: self.y * inv }
    }

    #[inline]
    fn orthogonal_left(self) -> Self {
        Coord { x: -self.y, y: self.x }
    }

    #[inline]
    fn orthogonal_right(self) -> Self {
        Coord { x: self.y, y: -self.x }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orthogonals() {
        let v = Coord { x: 1.0, y: 0.0 };
        assert_eq!(v.orthogonal_left(), Coord { x: 0.0, y: 1.0 });
        assert_eq!(v.orthogonal_right(), Coord { x: 0.0, y: -1.0 });
    }

    #[test]
    fn test_normalized_and_distances() {
        let v = Coord { x: 3.0, y: 4.0 }.normalized();
        assert_relative_eq!(v.length(), 1.0);
        assert_relative_eq!(v.x, 0.6);

        let a = Coord { x: 1.0, y: 1.0 };
        let b = Coord { x: 4.0, y: 5.0 };
        assert_relative_eq!(a.distance_squared(b), 25.0);
        assert_relative_eq!(a.distance_to(b), 5.0);
    }

    #[test]
    fn test_perp_sign() {
        let x = Coord { x: 1.0, y: 0.0 };
        let y = Coord { x: 0.0, y: 1.0 };
        assert!(x.perp(y) > 0.0);
        assert!(y.perp(x) < 0.0);
    }
}
