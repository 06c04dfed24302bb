//! Helpers over the rings of active vertices (LAVs).

use super::{VertexId, Vertices};
use crate::error::{topology, Result};

pub fn is_same_lav(vertices: &Vertices, v1: VertexId, v2: VertexId) -> bool {
    match (vertices.ring_of(v1), vertices.ring_of(v2)) {
        (Some(r1), Some(r2)) => r1 == r2,
        _ => false,
    }
}

/// Detaches a vertex from its LAV. Vertices outside any LAV are ignored.
pub fn remove_from_lav(vertices: &mut Vertices, vertex: VertexId) -> Result<()> {
    if vertices.ring_of(vertex).is_none() {
        return Ok(());
    }
    vertices.remove(vertex)
}

/// Removes the run `start..=end` (walking forward) from their shared LAV and
/// returns it in ring order.
pub fn cut_lav_part(vertices: &mut Vertices, start: VertexId, end: VertexId) -> Result<Vec<VertexId>> {
    let Some(ring) = vertices.ring_of(start) else {
        return topology("start vertex is not in a LAV");
    };
    let size = vertices.size(ring);
    let mut part = Vec::new();
    let mut next = start;

    for _ in 0..size {
        let current = next;
        next = vertices.next(current);
        vertices.remove(current)?;
        part.push(current);

        if current == end {
            return Ok(part);
        }
    }

    topology("end vertex cannot be found in the start vertex LAV")
}

/// Moves every vertex of `merged`'s LAV in front of `base`, starting with the
/// successor of `merged` and finishing with `merged` itself.
pub fn merge_before_base_vertex(vertices: &mut Vertices, base: VertexId, merged: VertexId) -> Result<()> {
    let Some(ring) = vertices.ring_of(merged) else {
        return topology("merged vertex is not in a LAV");
    };
    let size = vertices.size(ring);

    for _ in 0..size {
        let next_merged = vertices.next(merged);
        vertices.remove(next_merged)?;
        vertices.add_previous(base, next_merged)?;
    }
    Ok(())
}
