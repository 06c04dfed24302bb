use crate::error::{topology, Result};
use std::ops::{Index, IndexMut};

/// Handle of a node stored in a [`CircularRings`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Handle of one ring inside a [`CircularRings`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RingId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl RingId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct RingNode<T> {
    value: T,
    ring: Option<RingId>,
    next: NodeId,
    previous: NodeId,
}

#[derive(Debug, Clone, Default)]
struct RingHeader {
    first: Option<NodeId>,
    size: usize,
}

/// Arena of circular doubly-linked rings.
///
/// Nodes are never reclaimed. A node removed from its ring stays addressable
/// and can later be linked into any ring again. Detached nodes link to
/// themselves.
#[derive(Debug, Clone)]
pub struct CircularRings<T> {
    nodes: Vec<RingNode<T>>,
    rings: Vec<RingHeader>,
}

impl<T> Default for CircularRings<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CircularRings<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            rings: Vec::new(),
        }
    }

    /// Stores a detached node.
    pub fn insert(&mut self, value: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(RingNode {
            value,
            ring: None,
            next: id,
            previous: id,
        });
        id
    }

    pub fn new_ring(&mut self) -> RingId {
        let id = RingId(self.rings.len());
        self.rings.push(RingHeader::default());
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    pub fn size(&self, ring: RingId) -> usize {
        self.rings[ring.0].size
    }

    pub fn first(&self, ring: RingId) -> Option<NodeId> {
        self.rings[ring.0].first
    }

    pub fn ring_of(&self, node: NodeId) -> Option<RingId> {
        self.nodes[node.0].ring
    }

    pub fn next(&self, node: NodeId) -> NodeId {
        self.nodes[node.0].next
    }

    pub fn previous(&self, node: NodeId) -> NodeId {
        self.nodes[node.0].previous
    }

    /// Links the detached `new_node` right after `node`.
    pub fn add_next(&mut self, node: NodeId, new_node: NodeId) -> Result<()> {
        self.check_detached(new_node)?;
        let Some(ring) = self.nodes[node.0].ring else {
            return topology("cannot link next to a node outside any ring");
        };
        let next = self.nodes[node.0].next;
        self.link(ring, node, new_node, next);
        Ok(())
    }

    /// Links the detached `new_node` right before `node`.
    pub fn add_previous(&mut self, node: NodeId, new_node: NodeId) -> Result<()> {
        self.check_detached(new_node)?;
        let Some(ring) = self.nodes[node.0].ring else {
            return topology("cannot link previous to a node outside any ring");
        };
        let previous = self.nodes[node.0].previous;
        self.link(ring, previous, new_node, node);
        Ok(())
    }

    /// Appends before the first node, or seeds an empty ring.
    pub fn add_last(&mut self, ring: RingId, new_node: NodeId) -> Result<()> {
        match self.rings[ring.0].first {
            Some(first) => self.add_previous(first, new_node),
            None => {
                self.check_detached(new_node)?;
                let node = &mut self.nodes[new_node.0];
                node.ring = Some(ring);
                node.next = new_node;
                node.previous = new_node;
                let header = &mut self.rings[ring.0];
                header.first = Some(new_node);
                header.size = 1;
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        let Some(ring) = self.nodes[node.0].ring else {
            return topology("cannot remove a node that is not in a ring");
        };
        let header = &mut self.rings[ring.0];
        if header.size == 0 {
            return topology("cannot remove from an empty ring");
        }

        let next = self.nodes[node.0].next;
        let previous = self.nodes[node.0].previous;
        if header.size == 1 {
            header.first = None;
        } else {
            if header.first == Some(node) {
                header.first = Some(next);
            }
            self.nodes[previous.0].next = next;
            self.nodes[next.0].previous = previous;
        }
        header.size -= 1;

        let n = &mut self.nodes[node.0];
        n.ring = None;
        n.next = node;
        n.previous = node;
        Ok(())
    }

    /// Walks `size` steps starting at the ring's first node.
    pub fn iter(&self, ring: RingId) -> RingIter<'_, T> {
        let header = &self.rings[ring.0];
        RingIter {
            rings: self,
            current: header.first,
            remaining: header.size,
        }
    }

    pub fn members(&self, ring: RingId) -> Vec<NodeId> {
        self.iter(ring).collect()
    }

    fn check_detached(&self, node: NodeId) -> Result<()> {
        if self.nodes[node.0].ring.is_some() {
            return topology("node is already assigned to a ring");
        }
        Ok(())
    }

    fn link(&mut self, ring: RingId, previous: NodeId, new_node: NodeId, next: NodeId) {
        {
            let n = &mut self.nodes[new_node.0];
            n.ring = Some(ring);
            n.previous = previous;
            n.next = next;
        }
        self.nodes[previous.0].next = new_node;
        self.nodes[next.0].previous = new_node;
        self.rings[ring.0].size += 1;
    }
}

impl<T> Index<NodeId> for CircularRings<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        &self.nodes[id.0].value
    }
}

impl<T> IndexMut<NodeId> for CircularRings<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.0].value
    }
}

pub struct RingIter<'a, T> {
    rings: &'a CircularRings<T>,
    current: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for RingIter<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.current?;
        self.remaining -= 1;
        self.current = Some(self.rings.next(current));
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
