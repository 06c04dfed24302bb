use crate::error::{topology, Result};

/// Handle of a node stored in a [`PathQueues`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathNodeId(usize);

/// Handle of one open chain inside a [`PathQueues`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(usize);

#[derive(Debug, Clone)]
struct PathNode<T> {
    value: T,
    queue: Option<QueueId>,
    next: Option<PathNodeId>,
    previous: Option<PathNodeId>,
}

#[derive(Debug, Clone)]
struct QueueHeader<M> {
    first: Option<PathNodeId>,
    size: usize,
    closed: bool,
    meta: M,
}

/// Arena of open (non-circular) doubly-linked chains.
///
/// Chains only grow at their ends. A closed chain rejects further pushes.
/// Each chain carries a piece of metadata `M`.
#[derive(Debug, Clone)]
pub struct PathQueues<T, M> {
    nodes: Vec<PathNode<T>>,
    queues: Vec<QueueHeader<M>>,
}

impl<T, M> Default for PathQueues<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, M> PathQueues<T, M> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            queues: Vec::new(),
        }
    }

    pub fn new_queue(&mut self, meta: M) -> QueueId {
        let id = QueueId(self.queues.len());
        self.queues.push(QueueHeader {
            first: None,
            size: 0,
            closed: false,
            meta,
        });
        id
    }

    /// Stores a node that belongs to no chain yet.
    pub fn insert(&mut self, value: T) -> PathNodeId {
        let id = PathNodeId(self.nodes.len());
        self.nodes.push(PathNode {
            value,
            queue: None,
            next: None,
            previous: None,
        });
        id
    }

    pub fn value(&self, node: PathNodeId) -> &T {
        &self.nodes[node.0].value
    }

    pub fn queue_of(&self, node: PathNodeId) -> Option<QueueId> {
        self.nodes[node.0].queue
    }

    pub fn meta(&self, queue: QueueId) -> &M {
        &self.queues[queue.0].meta
    }

    pub fn size(&self, queue: QueueId) -> usize {
        self.queues[queue.0].size
    }

    pub fn is_closed(&self, queue: QueueId) -> bool {
        self.queues[queue.0].closed
    }

    pub fn close(&mut self, queue: QueueId) {
        self.queues[queue.0].closed = true;
    }

    pub fn is_end(&self, node: PathNodeId) -> bool {
        let n = &self.nodes[node.0];
        n.next.is_none() || n.previous.is_none()
    }

    /// `node` itself when it is an end, otherwise the head reached by
    /// following `previous` links.
    pub fn find_end(&self, node: PathNodeId) -> PathNodeId {
        if self.is_end(node) {
            return node;
        }
        self.head_of(node)
    }

    /// Seeds an empty chain with its first node.
    pub fn add_first(&mut self, queue: QueueId, node: PathNodeId) -> Result<()> {
        if self.nodes[node.0].queue.is_some() {
            return topology("face node is already assigned to a chain");
        }
        let header = &mut self.queues[queue.0];
        if header.first.is_some() {
            return topology("chain already has a first node");
        }
        header.first = Some(node);
        header.size = 1;

        let n = &mut self.nodes[node.0];
        n.queue = Some(queue);
        n.next = None;
        n.previous = None;
        Ok(())
    }

    /// Attaches `new_node` at the open end where `node` sits.
    pub fn add_push(&mut self, node: PathNodeId, new_node: PathNodeId) -> Result<()> {
        let Some(queue) = self.nodes[node.0].queue else {
            return topology("cannot push onto a node outside any chain");
        };
        if self.queues[queue.0].closed {
            return topology("cannot push onto a closed chain");
        }
        if self.nodes[new_node.0].queue.is_some() {
            return topology("face node is already assigned to a chain");
        }
        if !self.is_end(node) {
            return topology("chain can only grow at an end node");
        }

        self.queues[queue.0].size += 1;
        if self.nodes[node.0].next.is_none() {
            self.nodes[node.0].next = Some(new_node);
            let n = &mut self.nodes[new_node.0];
            n.queue = Some(queue);
            n.previous = Some(node);
            n.next = None;
        } else {
            self.nodes[node.0].previous = Some(new_node);
            let n = &mut self.nodes[new_node.0];
            n.queue = Some(queue);
            n.previous = None;
            n.next = Some(node);
        }
        Ok(())
    }

    /// Detaches an end node, returning the neighbour that becomes the new end.
    pub fn pop(&mut self, node: PathNodeId) -> Result<Option<PathNodeId>> {
        let Some(queue) = self.nodes[node.0].queue else {
            return topology("cannot pop a node outside any chain");
        };
        if self.queues[queue.0].size == 0 {
            return topology("cannot pop from an empty chain");
        }
        if !self.is_end(node) {
            return topology("can only pop from the end of a chain");
        }

        let next = self.nodes[node.0].next;
        let previous = self.nodes[node.0].previous;
        let mut neighbour = None;

        if self.queues[queue.0].size == 1 {
            self.queues[queue.0].first = None;
        } else {
            if self.queues[queue.0].first == Some(node) {
                self.queues[queue.0].first = next.or(previous);
            }
            if let Some(next) = next {
                self.nodes[next.0].previous = None;
                neighbour = Some(next);
            } else if let Some(previous) = previous {
                self.nodes[previous.0].next = None;
                neighbour = Some(previous);
            }
        }
        self.queues[queue.0].size -= 1;

        let n = &mut self.nodes[node.0];
        n.queue = None;
        n.next = None;
        n.previous = None;
        Ok(neighbour)
    }

    /// Moves every node of `donor`'s chain onto the end at `node`, one pop at
    /// a time, so the donor's order continues the receiver's.
    ///
    /// Returns the new end node, or `None` when both already share a chain.
    pub fn add_queue(
        &mut self,
        node: PathNodeId,
        donor: PathNodeId,
    ) -> Result<Option<PathNodeId>> {
        if self.nodes[node.0].queue == self.nodes[donor.0].queue {
            return Ok(None);
        }

        let mut tail = node;
        let mut current = Some(donor);
        while let Some(moving) = current {
            let next = self.pop(moving)?;
            self.add_push(tail, moving)?;
            tail = moving;
            current = next;
        }
        Ok(Some(tail))
    }

    /// Nodes of the chain from the head end to the tail end.
    pub fn iter(&self, queue: QueueId) -> PathIter<'_, T, M> {
        let header = &self.queues[queue.0];
        PathIter {
            queues: self,
            current: header.first.map(|first| self.head_of(first)),
            remaining: header.size,
        }
    }

    fn head_of(&self, node: PathNodeId) -> PathNodeId {
        let mut current = node;
        while let Some(previous) = self.nodes[current.0].previous {
            current = previous;
        }
        current
    }
}

pub struct PathIter<'a, T, M> {
    queues: &'a PathQueues<T, M>,
    current: Option<PathNodeId>,
    remaining: usize,
}

impl<'a, T, M> Iterator for PathIter<'a, T, M> {
    type Item = PathNodeId;

    fn next(&mut self) -> Option<PathNodeId> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.current?;
        self.remaining -= 1;
        self.current = self.queues.nodes[current.0].next;
        Some(current)
    }
}
