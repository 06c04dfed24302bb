//! Arena-backed containers used by the wavefront simulation.

pub mod circular;
pub mod path_queue;
pub mod priority_queue;

pub use circular::{CircularRings, NodeId, RingId};
pub use path_queue::{PathNodeId, PathQueues, QueueId};
pub use priority_queue::PriorityQueue;
