//! Live state of the shrinking polygon: edges, vertices, face chains and LAVs.

pub mod face;
pub mod lav;

pub use face::{connect_queues, FaceQueues};

use crate::collections::{CircularRings, NodeId, PathNodeId};
use crate::primitives::{ImplicitLine, Ray, Vector2d, VectorOps};
use geo_types::Coord;

/// Handle of an [`Edge`] in the edge arena.
pub type EdgeId = NodeId;

/// Handle of a [`Vertex`] in the vertex arena.
pub type VertexId = NodeId;

pub type Edges = CircularRings<Edge>;
pub type Vertices = CircularRings<Vertex>;

/// An input boundary edge. Immutable once its ring has been initialised.
#[derive(Debug, Clone)]
pub struct Edge {
    pub begin: Vector2d,
    pub end: Vector2d,
    /// Unit direction from `begin` to `end`.
    pub norm: Vector2d,
    pub line: ImplicitLine,
    pub bisector_previous: Ray,
    pub bisector_next: Ray,
}

impl Edge {
    pub fn new(begin: Vector2d, end: Vector2d) -> Self {
        let unset = Ray::new(begin, Coord { x: 0.0, y: 0.0 });
        Self {
            begin,
            end,
            norm: (end - begin).normalized(),
            line: ImplicitLine::through(begin, end),
            bisector_previous: unset,
            bisector_next: unset,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub point: Vector2d,
    /// Height at which the vertex appeared, rounded.
    pub distance: f64,
    pub bisector: Ray,
    /// Input edges whose bisector the vertex travels on.
    pub previous_edge: EdgeId,
    pub next_edge: EdgeId,
    pub left_face: Option<PathNodeId>,
    pub right_face: Option<PathNodeId>,
    pub is_processed: bool,
}

impl Vertex {
    pub fn new(
        point: Vector2d,
        distance: f64,
        bisector: Ray,
        previous_edge: EdgeId,
        next_edge: EdgeId,
        digits: u32,
    ) -> Self {
        Self {
            point,
            distance: round_to(distance, digits),
            bisector,
            previous_edge,
            next_edge,
            left_face: None,
            right_face: None,
            is_processed: false,
        }
    }
}

pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_edge_norm_and_line() {
        let e = Edge::new(Coord { x: 1.0, y: 1.0 }, Coord { x: 4.0, y: 5.0 });
        assert_relative_eq!(e.norm.x, 0.6);
        assert_relative_eq!(e.norm.y, 0.8);
        assert!(e.line.contains(Coord { x: 1.0, y: 1.0 }));
        assert!(e.line.contains(Coord { x: 4.0, y: 5.0 }));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456789, 5), 0.12346);
        assert_eq!(round_to(2.0, 5), 2.0);
        assert_eq!(round_to(0.5, 0), 1.0);
    }
}
