//! Classification of coincident events into chains, and level grouping.

use super::{EdgeEvent, Event};
use crate::error::{topology, Result};
use crate::primitives::{Vector2d, VectorOps};
use crate::wavefront::{EdgeId, VertexId, Vertices};
use smallvec::SmallVec;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainType {
    Edge,
    ClosedEdge,
    Split,
}

/// Contiguous run of edge events, ordered along the LAV.
#[derive(Debug, Clone)]
pub struct EdgeChain {
    pub events: SmallVec<[EdgeEvent; 4]>,
    closed: bool,
}

impl EdgeChain {
    /// `events` must be non-empty and already stitched in ring order.
    pub fn new(events: SmallVec<[EdgeEvent; 4]>) -> Self {
        let closed = match (events.first(), events.last()) {
            (Some(first), Some(last)) => first.previous_vertex == last.next_vertex,
            _ => false,
        };
        Self { events, closed }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn previous_vertex(&self) -> VertexId {
        self.events[0].previous_vertex
    }

    pub fn next_vertex(&self) -> VertexId {
        self.events[self.events.len() - 1].next_vertex
    }

    pub fn previous_edge(&self, vertices: &Vertices) -> EdgeId {
        vertices[self.previous_vertex()].previous_edge
    }

    pub fn next_edge(&self, vertices: &Vertices) -> EdgeId {
        vertices[self.next_vertex()].next_edge
    }

    pub fn touches(&self, vertex: VertexId) -> bool {
        self.events
            .iter()
            .any(|e| e.previous_vertex == vertex || e.next_vertex == vertex)
    }
}

#[derive(Debug, Clone)]
pub enum Chain {
    Edge(EdgeChain),
    /// An opposite edge with no event of its own, between two LAV vertices.
    SingleEdge {
        opposite_edge: EdgeId,
        previous_vertex: VertexId,
        next_vertex: VertexId,
    },
    /// One split; `opposite_edge` is `None` for a vertex split.
    Split {
        parent: VertexId,
        opposite_edge: Option<EdgeId>,
    },
}

impl Chain {
    pub fn previous_edge(&self, vertices: &Vertices) -> EdgeId {
        match self {
            Chain::Edge(chain) => chain.previous_edge(vertices),
            Chain::SingleEdge { opposite_edge, .. } => *opposite_edge,
            Chain::Split { parent, .. } => vertices[*parent].previous_edge,
        }
    }

    pub fn next_edge(&self, vertices: &Vertices) -> EdgeId {
        match self {
            Chain::Edge(chain) => chain.next_edge(vertices),
            Chain::SingleEdge { opposite_edge, .. } => *opposite_edge,
            Chain::Split { parent, .. } => vertices[*parent].next_edge,
        }
    }

    /// For splits this is the parent's current ring neighbour.
    pub fn previous_vertex(&self, vertices: &Vertices) -> VertexId {
        match self {
            Chain::Edge(chain) => chain.previous_vertex(),
            Chain::SingleEdge { previous_vertex, .. } => *previous_vertex,
            Chain::Split { parent, .. } => vertices.previous(*parent),
        }
    }

    pub fn next_vertex(&self, vertices: &Vertices) -> VertexId {
        match self {
            Chain::Edge(chain) => chain.next_vertex(),
            Chain::SingleEdge { next_vertex, .. } => *next_vertex,
            Chain::Split { parent, .. } => vertices.next(*parent),
        }
    }

    pub fn current_vertex(&self) -> Option<VertexId> {
        match self {
            Chain::Split { parent, .. } => Some(*parent),
            _ => None,
        }
    }

    pub fn chain_type(&self) -> ChainType {
        match self {
            Chain::Edge(chain) if chain.is_closed() => ChainType::ClosedEdge,
            Chain::Edge(_) => ChainType::Edge,
            Chain::SingleEdge { .. } | Chain::Split { .. } => ChainType::Split,
        }
    }

    pub fn is_single_edge(&self) -> bool {
        matches!(self, Chain::SingleEdge { .. })
    }
}

/// Splits one cluster of coincident events into chains.
///
/// Edge events are stitched greedily into maximal runs. A split whose parent
/// already belongs to an edge run is dropped. Vertex splits only count for
/// parents without a generic split. Repeated events for the same vertices
/// collapse into one.
pub fn create_chains(cluster: &[Event]) -> Vec<Chain> {
    let mut edge_cluster: Vec<EdgeEvent> = Vec::new();
    let mut split_cluster: Vec<Chain> = Vec::new();
    let mut parents: HashSet<VertexId> = HashSet::new();
    let mut splits_seen: HashSet<(VertexId, EdgeId)> = HashSet::new();

    for event in cluster {
        match event {
            Event::Edge(e) => {
                let repeated = edge_cluster
                    .iter()
                    .any(|x| x.previous_vertex == e.previous_vertex && x.next_vertex == e.next_vertex);
                if !repeated {
                    edge_cluster.push(*e);
                }
            }
            Event::Split(e) => {
                parents.insert(e.parent);
                if splits_seen.insert((e.parent, e.opposite_edge)) {
                    split_cluster.push(Chain::Split {
                        parent: e.parent,
                        opposite_edge: Some(e.opposite_edge),
                    });
                }
            }
            _ => {}
        }
    }

    for event in cluster {
        if let Event::VertexSplit(e) = event {
            if parents.insert(e.parent) {
                split_cluster.push(Chain::Split {
                    parent: e.parent,
                    opposite_edge: None,
                });
            }
        }
    }

    let mut edge_chains = Vec::new();
    while !edge_cluster.is_empty() {
        edge_chains.push(EdgeChain::new(create_edge_chain(&mut edge_cluster)));
    }

    let splits: Vec<Chain> = split_cluster
        .into_iter()
        .filter(|split| match split {
            Chain::Split { parent, .. } => !edge_chains.iter().any(|chain| chain.touches(*parent)),
            _ => true,
        })
        .collect();

    edge_chains
        .into_iter()
        .map(Chain::Edge)
        .chain(splits)
        .collect()
}

fn create_edge_chain(edge_cluster: &mut Vec<EdgeEvent>) -> SmallVec<[EdgeEvent; 4]> {
    let mut edge_list: SmallVec<[EdgeEvent; 4]> = SmallVec::new();
    edge_list.push(edge_cluster.remove(0));

    'stitch: loop {
        let begin = edge_list[0].previous_vertex;
        let end = edge_list[edge_list.len() - 1].next_vertex;

        for i in 0..edge_cluster.len() {
            let edge = edge_cluster[i];
            if edge.previous_vertex == end {
                edge_cluster.remove(i);
                edge_list.push(edge);
                continue 'stitch;
            }
            if edge.next_vertex == begin {
                edge_cluster.remove(i);
                edge_list.insert(0, edge);
                continue 'stitch;
            }
        }
        break;
    }
    edge_list
}

/// Groups one level of events and turns every group into a single aggregate
/// event.
///
/// Two events share a group when they reference a common vertex or when
/// their points lie within `epsilon` of the group's first event.
pub fn group_level_events(mut level: Vec<Event>, epsilon: f64) -> Result<Vec<Event>> {
    let mut grouped = Vec::new();
    let mut parent_group: HashSet<VertexId> = HashSet::new();

    while !level.is_empty() {
        parent_group.clear();

        let event = level.remove(0);
        let center = event.point();
        let distance = event.distance();
        add_event_to_group(&mut parent_group, &event);

        let mut cluster = vec![event];
        let mut j = 0;
        while j < level.len() {
            let test = &level[j];
            if is_event_in_group(&parent_group, test) || center.distance_to(test.point()) < epsilon {
                let item = level.remove(j);
                add_event_to_group(&mut parent_group, &item);
                cluster.push(item);
            } else {
                j += 1;
            }
        }

        grouped.extend(create_level_events(center, distance, &cluster)?);
    }
    Ok(grouped)
}

fn is_event_in_group(parent_group: &HashSet<VertexId>, event: &Event) -> bool {
    match event {
        Event::Split(e) => parent_group.contains(&e.parent),
        Event::VertexSplit(e) => parent_group.contains(&e.parent),
        Event::Edge(e) => {
            parent_group.contains(&e.previous_vertex) || parent_group.contains(&e.next_vertex)
        }
        _ => false,
    }
}

fn add_event_to_group(parent_group: &mut HashSet<VertexId>, event: &Event) {
    match event {
        Event::Split(e) => {
            parent_group.insert(e.parent);
        }
        Event::VertexSplit(e) => {
            parent_group.insert(e.parent);
        }
        Event::Edge(e) => {
            parent_group.insert(e.previous_vertex);
            parent_group.insert(e.next_vertex);
        }
        _ => {}
    }
}

/// Builds the aggregate events for one group.
///
/// A closed chain is a whole LAV vanishing, so no other chain can share its
/// vertices. It becomes a pick applied before whatever else meets at the
/// point. Two closed chains in one group are rejected.
pub fn create_level_events(center: Vector2d, distance: f64, cluster: &[Event]) -> Result<Vec<Event>> {
    let (closed, mut chains): (Vec<Chain>, Vec<Chain>) = create_chains(cluster)
        .into_iter()
        .partition(|c| c.chain_type() == ChainType::ClosedEdge);

    if closed.len() > 1 {
        return topology("more than one closed chain of events at one point");
    }

    let mut events: Vec<Event> = closed
        .into_iter()
        .filter_map(|chain| match chain {
            Chain::Edge(chain) => Some(Event::Pick {
                point: center,
                distance,
                chain,
            }),
            _ => None,
        })
        .collect();

    match chains.len() {
        0 => {}
        1 => match chains.pop() {
            Some(Chain::Edge(chain)) => events.push(Event::MultiEdge {
                point: center,
                distance,
                chain,
            }),
            Some(split) => events.push(Event::MultiSplit {
                point: center,
                distance,
                chains: vec![split],
            }),
            None => {}
        },
        _ => events.push(Event::MultiSplit {
            point: center,
            distance,
            chains,
        }),
    }
    Ok(events)
}

#[cfg(test)]
#[path = "chains_tests.rs"]
mod tests;
