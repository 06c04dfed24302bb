use super::*;
use crate::collections::CircularRings;
use crate::error::SkeletonError;
use crate::events::{SplitEvent, VertexSplitEvent};
use crate::primitives::Ray;
use crate::wavefront::{EdgeId, Vertex};
use geo_types::Coord;

const EPS: f64 = 1e-9;

fn c(x: f64, y: f64) -> Vector2d {
    Coord { x, y }
}

/// A LAV of `n` vertices, each with its own pair of edge handles.
fn setup(n: usize) -> (Vertices, Vec<VertexId>, Vec<EdgeId>) {
    let mut edges: CircularRings<()> = CircularRings::new();
    let edge_ids: Vec<EdgeId> = (0..n).map(|_| edges.insert(())).collect();

    let mut vertices = Vertices::new();
    let ring = vertices.new_ring();
    let ids = (0..n)
        .map(|i| {
            let p = c(i as f64, 0.0);
            let v = vertices.insert(Vertex::new(
                p,
                0.0,
                Ray::new(p, p),
                edge_ids[i],
                edge_ids[(i + 1) % n],
                5,
            ));
            vertices.add_last(ring, v).unwrap();
            v
        })
        .collect();
    (vertices, ids, edge_ids)
}

fn edge(point: Vector2d, a: VertexId, b: VertexId) -> Event {
    Event::Edge(EdgeEvent {
        point,
        distance: 1.0,
        previous_vertex: a,
        next_vertex: b,
    })
}

fn split(point: Vector2d, parent: VertexId, opposite_edge: EdgeId) -> Event {
    Event::Split(SplitEvent {
        point,
        distance: 1.0,
        parent,
        opposite_edge,
    })
}

fn vertex_split(point: Vector2d, parent: VertexId) -> Event {
    Event::VertexSplit(VertexSplitEvent {
        point,
        distance: 1.0,
        parent,
    })
}

#[test]
fn test_edge_events_stitched_in_ring_order() {
    let (vertices, v, e) = setup(5);
    let p = c(1.0, 1.0);
    let cluster = vec![edge(p, v[1], v[2]), edge(p, v[2], v[3]), edge(p, v[0], v[1])];

    let chains = create_chains(&cluster);
    assert_eq!(chains.len(), 1);
    let Chain::Edge(chain) = &chains[0] else {
        panic!("expected an edge chain");
    };
    assert_eq!(chain.events.len(), 3);
    assert_eq!(chain.previous_vertex(), v[0]);
    assert_eq!(chain.next_vertex(), v[3]);
    assert_eq!(chains[0].chain_type(), ChainType::Edge);
    assert_eq!(chains[0].previous_edge(&vertices), e[0]);
    assert_eq!(chains[0].next_edge(&vertices), e[4]);
    assert!(chains[0].current_vertex().is_none());
}

#[test]
fn test_closed_edge_chain() {
    let (_, v, _) = setup(3);
    let p = c(1.0, 1.0);
    let cluster = vec![edge(p, v[0], v[1]), edge(p, v[1], v[2]), edge(p, v[2], v[0])];

    let chains = create_chains(&cluster);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].chain_type(), ChainType::ClosedEdge);
}

#[test]
fn test_splits_owned_by_edge_chain_are_dropped() {
    let (_, v, e) = setup(6);
    let p = c(1.0, 1.0);
    let cluster = vec![
        edge(p, v[0], v[1]),
        split(p, v[1], e[4]),
        split(p, v[3], e[5]),
        vertex_split(p, v[3]),
        vertex_split(p, v[4]),
        vertex_split(p, v[4]),
    ];

    let chains = create_chains(&cluster);
    assert_eq!(chains.len(), 3);
    assert!(matches!(chains[0], Chain::Edge(_)));
    assert!(matches!(
        chains[1],
        Chain::Split { parent, opposite_edge: Some(_) } if parent == v[3]
    ));
    assert!(matches!(
        chains[2],
        Chain::Split { parent, opposite_edge: None } if parent == v[4]
    ));
}

#[test]
fn test_split_chain_follows_ring_neighbours() {
    let (mut vertices, v, e) = setup(4);
    let chain = Chain::Split {
        parent: v[1],
        opposite_edge: Some(e[3]),
    };
    assert_eq!(chain.previous_vertex(&vertices), v[0]);
    assert_eq!(chain.next_vertex(&vertices), v[2]);
    assert_eq!(chain.previous_edge(&vertices), e[1]);
    assert_eq!(chain.next_edge(&vertices), e[2]);
    assert_eq!(chain.current_vertex(), Some(v[1]));

    vertices.remove(v[2]).unwrap();
    assert_eq!(chain.next_vertex(&vertices), v[3]);
}

#[test]
fn test_group_square_collapse_into_pick() {
    let (_, v, _) = setup(4);
    let center = c(0.5, 0.5);
    let level = vec![
        edge(center, v[0], v[1]),
        vertex_split(center, v[0]),
        edge(center, v[2], v[3]),
        edge(center, v[1], v[2]),
        vertex_split(center, v[2]),
        edge(center, v[3], v[0]),
    ];

    let grouped = group_level_events(level, EPS).unwrap();
    assert_eq!(grouped.len(), 1);
    let Event::Pick { chain, point, .. } = &grouped[0] else {
        panic!("expected a pick event, got {}", grouped[0].kind());
    };
    assert_eq!(chain.events.len(), 4);
    assert_eq!(*point, center);
}

#[test]
fn test_group_separates_distant_events() {
    let (_, v, _) = setup(6);
    let level = vec![
        edge(c(1.5, 0.5), v[0], v[1]),
        edge(c(0.5, 0.5), v[3], v[4]),
        vertex_split(c(1.5, 0.5), v[1]),
        // Near the first center, no shared vertex.
        vertex_split(c(1.5, 0.5 + EPS / 10.0), v[5]),
    ];

    let grouped = group_level_events(level, EPS).unwrap();
    assert_eq!(grouped.len(), 2);
    let Event::MultiSplit { chains, .. } = &grouped[0] else {
        panic!("expected a multi-split, got {}", grouped[0].kind());
    };
    assert_eq!(chains.len(), 2);
    assert!(matches!(grouped[1], Event::MultiEdge { .. }));
}

#[test]
fn test_single_split_becomes_multi_split() {
    let (_, v, e) = setup(4);
    let events = create_level_events(c(0.0, 1.0), 1.0, &[split(c(0.0, 1.0), v[2], e[0])]).unwrap();
    assert_eq!(events.len(), 1);
    let Event::MultiSplit { chains, distance, .. } = &events[0] else {
        panic!("expected a multi-split");
    };
    assert_eq!(chains.len(), 1);
    assert_eq!(*distance, 1.0);
}

#[test]
fn test_closed_chain_picks_before_other_chains() {
    let (_, v, e) = setup(5);
    let p = c(1.0, 1.0);
    let cluster = vec![
        split(p, v[3], e[0]),
        edge(p, v[0], v[1]),
        edge(p, v[1], v[2]),
        edge(p, v[2], v[0]),
    ];

    let events = create_level_events(p, 1.0, &cluster).unwrap();
    assert_eq!(events.len(), 2);
    let Event::Pick { chain, .. } = &events[0] else {
        panic!("expected a pick first, got {}", events[0].kind());
    };
    assert_eq!(chain.events.len(), 3);
    let Event::MultiSplit { chains, .. } = &events[1] else {
        panic!("expected a multi-split, got {}", events[1].kind());
    };
    assert!(matches!(chains[..], [Chain::Split { parent, .. }] if parent == v[3]));
}

#[test]
fn test_repeated_events_collapse() {
    let (_, v, e) = setup(6);
    let p = c(1.0, 1.0);
    let cluster = vec![
        edge(p, v[0], v[1]),
        edge(p, v[1], v[2]),
        edge(p, v[0], v[1]),
        split(p, v[4], e[1]),
        split(p, v[4], e[1]),
    ];

    let chains = create_chains(&cluster);
    assert_eq!(chains.len(), 2);
    let Chain::Edge(chain) = &chains[0] else {
        panic!("expected an edge chain");
    };
    assert_eq!(chain.events.len(), 2);
    assert!(!chain.is_closed());
    assert!(matches!(chains[1], Chain::Split { parent, .. } if parent == v[4]));
}

#[test]
fn test_two_closed_chains_are_rejected() {
    let (_, v, _) = setup(6);
    let p = c(1.0, 1.0);
    let cluster = vec![
        edge(p, v[0], v[1]),
        edge(p, v[1], v[2]),
        edge(p, v[2], v[0]),
        edge(p, v[3], v[4]),
        edge(p, v[4], v[5]),
        edge(p, v[5], v[3]),
    ];
    assert!(matches!(
        create_level_events(p, 1.0, &cluster),
        Err(SkeletonError::TopologyError(_))
    ));
}
