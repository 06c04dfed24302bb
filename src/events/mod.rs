//! Predicted wavefront topology changes.

pub mod chains;

pub use chains::{Chain, ChainType, EdgeChain};

use crate::primitives::Vector2d;
use crate::wavefront::{EdgeId, VertexId, Vertices};
use std::cmp::Ordering;

/// The edge between two neighbouring vertices shrinks to zero length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeEvent {
    pub point: Vector2d,
    pub distance: f64,
    pub previous_vertex: VertexId,
    pub next_vertex: VertexId,
}

/// A reflex vertex reaches the interior of an opposite edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitEvent {
    pub point: Vector2d,
    pub distance: f64,
    pub parent: VertexId,
    pub opposite_edge: EdgeId,
}

/// A split that lands exactly on an existing wavefront vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSplitEvent {
    pub point: Vector2d,
    pub distance: f64,
    pub parent: VertexId,
}

#[derive(Debug, Clone)]
pub enum Event {
    Edge(EdgeEvent),
    Split(SplitEvent),
    VertexSplit(VertexSplitEvent),
    /// An open run of edge events converging on one point.
    MultiEdge {
        point: Vector2d,
        distance: f64,
        chain: EdgeChain,
    },
    /// Several chains meeting at one point, at least one of them a split.
    MultiSplit {
        point: Vector2d,
        distance: f64,
        chains: Vec<Chain>,
    },
    /// A whole LAV collapsing into a single point.
    Pick {
        point: Vector2d,
        distance: f64,
        chain: EdgeChain,
    },
}

impl Event {
    pub fn point(&self) -> Vector2d {
        match self {
            Event::Edge(e) => e.point,
            Event::Split(e) => e.point,
            Event::VertexSplit(e) => e.point,
            Event::MultiEdge { point, .. }
            | Event::MultiSplit { point, .. }
            | Event::Pick { point, .. } => *point,
        }
    }

    pub fn distance(&self) -> f64 {
        match self {
            Event::Edge(e) => e.distance,
            Event::Split(e) => e.distance,
            Event::VertexSplit(e) => e.distance,
            Event::MultiEdge { distance, .. }
            | Event::MultiSplit { distance, .. }
            | Event::Pick { distance, .. } => *distance,
        }
    }

    /// Parent vertex of a split-type event.
    pub fn parent(&self) -> Option<VertexId> {
        match self {
            Event::Split(e) => Some(e.parent),
            Event::VertexSplit(e) => Some(e.parent),
            _ => None,
        }
    }

    /// True once any vertex the event depends on has been processed.
    /// Aggregate events are built and consumed within one level and never
    /// become obsolete.
    pub fn is_obsolete(&self, vertices: &Vertices) -> bool {
        match self {
            Event::Edge(e) => {
                vertices[e.previous_vertex].is_processed || vertices[e.next_vertex].is_processed
            }
            Event::Split(e) => vertices[e.parent].is_processed,
            Event::VertexSplit(e) => vertices[e.parent].is_processed,
            Event::MultiEdge { .. } | Event::MultiSplit { .. } | Event::Pick { .. } => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Edge(_) => "edge",
            Event::Split(_) => "split",
            Event::VertexSplit(_) => "vertex-split",
            Event::MultiEdge { .. } => "multi-edge",
            Event::MultiSplit { .. } => "multi-split",
            Event::Pick { .. } => "pick",
        }
    }
}

/// Orders events by increasing height.
pub fn compare_by_distance(left: &Event, right: &Event) -> Ordering {
    left.distance()
        .partial_cmp(&right.distance())
        .unwrap_or(Ordering::Equal)
}

/// A possible split of a vertex against one opposite edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    pub point: Vector2d,
    pub distance: f64,
    /// Set for a generic split.
    pub opposite_edge: Option<EdgeId>,
    /// Set when the candidate lands on an endpoint of the edge.
    pub opposite_point: Option<Vector2d>,
}

impl SplitCandidate {
    pub fn is_vertex_split(&self) -> bool {
        self.opposite_point.is_some()
    }
}

/// Sorts candidates by distance, vertex splits first among equals.
pub fn sort_split_candidates(candidates: &mut [SplitCandidate]) {
    candidates.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.is_vertex_split().cmp(&a.is_vertex_split()))
    });
}
