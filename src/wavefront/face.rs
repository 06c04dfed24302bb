use super::{EdgeId, VertexId};
use crate::collections::{PathNodeId, PathQueues};
use crate::error::{topology, Result};

/// Face chains under construction. Each chain is bound to the input edge it
/// belongs to, or `None` while it is still unconnected.
pub type FaceQueues = PathQueues<VertexId, Option<EdgeId>>;

/// Joins the chains holding `first` and `second`.
///
/// Two ends of the same edge-bound chain close it. Otherwise the unconnected
/// chain is moved onto the edge-bound one and closed.
pub fn connect_queues(faces: &mut FaceQueues, first: PathNodeId, second: PathNodeId) -> Result<()> {
    let (Some(q1), Some(q2)) = (faces.queue_of(first), faces.queue_of(second)) else {
        return topology("face node is not part of any chain");
    };

    if q1 == q2 {
        if !faces.is_end(first) || !faces.is_end(second) {
            return topology("cannot connect a chain to itself away from its ends");
        }
        if faces.meta(q1).is_none() {
            return topology("cannot close a chain not bound to an edge");
        }
        faces.close(q1);
        return Ok(());
    }

    let bound1 = faces.meta(q1).is_some();
    let bound2 = faces.meta(q2).is_some();
    if bound1 && bound2 {
        return topology("cannot connect two chains that are both bound to edges");
    }

    if bound1 {
        faces.add_queue(first, second)?;
        faces.close(q2);
    } else {
        faces.add_queue(second, first)?;
        faces.close(q1);
    }
    Ok(())
}
