use crate::collections::{PathNodeId, PriorityQueue, QueueId, RingId};
use crate::error::{topology, Result, SkeletonError};
use crate::events::chains::group_level_events;
use crate::events::{
    compare_by_distance, sort_split_candidates, Chain, EdgeChain, EdgeEvent, Event,
    SplitCandidate, SplitEvent, VertexSplitEvent,
};
use crate::primitives::{
    bisector_direction, intersect_rays, is_clockwise, is_point_inside_polygon,
    orthogonal_projection, Ray, Vector2d, VectorOps,
};
use crate::skeleton::{EdgeResult, PointKey, Skeleton};
use crate::utils::parallel;
use crate::wavefront::{
    connect_queues, lav, Edge, EdgeId, Edges, FaceQueues, Vertex, VertexId, Vertices,
};
use geo::BoundingRect;
use geo_types::{Coord, Line, LineString, MultiPoint, MultiPolygon, Polygon};
use log::{debug, trace};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const DEFAULT_RELATIVE_EPSILON: f64 = 1e-11;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;
pub const DEFAULT_DISTANCE_DIGITS: u32 = 5;

/// Below this dot product of the two edge directions a multi-split vertex
/// bisector is checked against its neighbours.
const ANTIPARALLEL_DOT: f64 = -0.97;

const ZERO: Vector2d = Coord { x: 0.0, y: 0.0 };

/// Computes straight skeletons.
///
/// ```
/// use geo_types::coord;
/// use straight_skeleton::SkeletonBuilder;
///
/// let square = vec![
///     coord! { x: 0.0, y: 0.0 },
///     coord! { x: 1.0, y: 0.0 },
///     coord! { x: 1.0, y: 1.0 },
///     coord! { x: 0.0, y: 1.0 },
/// ];
/// let skeleton = SkeletonBuilder::new().build(&square, &[]).unwrap();
/// assert_eq!(skeleton.edges.len(), 4);
/// assert!(skeleton.edges.iter().all(|face| face.polygon.len() == 3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonBuilder {
    /// Scaled by the larger bounding-box side of the input to obtain the
    /// tolerance used by every geometric test.
    pub relative_epsilon: f64,
    /// Cap on processed event levels.
    pub max_iterations: usize,
    /// Decimal digits kept in vertex heights.
    pub distance_digits: u32,
}

impl Default for SkeletonBuilder {
    fn default() -> Self {
        Self {
            relative_epsilon: DEFAULT_RELATIVE_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            distance_digits: DEFAULT_DISTANCE_DIGITS,
        }
    }
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relative_epsilon(mut self, relative_epsilon: f64) -> Self {
        self.relative_epsilon = relative_epsilon;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_distance_digits(mut self, distance_digits: u32) -> Self {
        self.distance_digits = distance_digits;
        self
    }

    /// Builds the skeleton of `outer` with optional `holes`.
    ///
    /// Rings are implicitly closed: the first point must not be repeated at
    /// the end. The outer ring is made counter-clockwise and holes clockwise.
    pub fn build(&self, outer: &[Coord<f64>], holes: &[Vec<Coord<f64>>]) -> Result<Skeleton> {
        let skeleton = self.simulate(outer, holes)?.into_skeleton();
        debug!("Skeleton finished with {} faces", skeleton.edges.len());
        Ok(skeleton)
    }

    /// Runs the wavefront to completion without collecting the faces.
    fn simulate(&self, outer: &[Coord<f64>], holes: &[Vec<Coord<f64>>]) -> Result<Simulation<'_>> {
        validate_outer(outer)?;
        for hole in holes {
            validate_ring(hole, "hole")?;
        }

        let epsilon = self.dynamic_epsilon(outer, holes);
        debug!(
            "Building skeleton: {} outer points, {} holes, epsilon {:e}",
            outer.len(),
            holes.len(),
            epsilon
        );

        let mut outer = outer.to_vec();
        if is_clockwise(&outer) {
            outer.reverse();
        }

        let mut sim = Simulation::new(self, epsilon);
        sim.init_slav(&outer)?;
        for hole in holes {
            let mut hole = hole.clone();
            if !is_clockwise(&hole) {
                hole.reverse();
            }
            sim.init_slav(&hole)?;
        }
        sim.init_events()?;

        let levels = sim.run()?;
        debug!("Wavefront collapsed after {} levels: {:?}", levels, sim.counts);
        Ok(sim)
    }

    /// Builds the skeleton of a `geo` polygon, dropping the closing point of
    /// each ring.
    pub fn build_polygon(&self, polygon: &Polygon<f64>) -> Result<Skeleton> {
        let outer = open_ring(polygon.exterior());
        let holes: Vec<Vec<Coord<f64>>> = polygon.interiors().iter().map(open_ring).collect();
        self.build(&outer, &holes)
    }

    /// Builds every polygon independently and merges the results in input
    /// order. Polygons with an empty exterior are skipped.
    pub fn build_multi_polygon(&self, multi_polygon: &MultiPolygon<f64>) -> Result<Skeleton> {
        let polygons: Vec<&Polygon<f64>> = multi_polygon
            .0
            .iter()
            .filter(|p| !p.exterior().0.is_empty())
            .collect();

        let results = parallel::map(&polygons, |polygon| self.build_polygon(polygon));

        let mut skeleton = Skeleton::default();
        for result in results {
            skeleton.merge(result?);
        }
        Ok(skeleton)
    }

    fn dynamic_epsilon(&self, outer: &[Coord<f64>], holes: &[Vec<Coord<f64>>]) -> f64 {
        let points: MultiPoint<f64> = outer
            .iter()
            .chain(holes.iter().flatten())
            .map(|c| geo_types::Point::from(*c))
            .collect();

        let span = points
            .bounding_rect()
            .map(|rect| rect.width().max(rect.height()))
            .unwrap_or(0.0);
        let base = if span > 0.0 { span } else { 1.0 };
        base * self.relative_epsilon
    }
}

fn open_ring(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut points = ring.0.clone();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn validate_outer(outer: &[Coord<f64>]) -> Result<()> {
    if outer.is_empty() {
        return Err(SkeletonError::InvalidGeometry("outer ring is empty".into()));
    }
    if outer.len() > 1 && outer[0] == outer[outer.len() - 1] {
        return Err(SkeletonError::InvalidGeometry(
            "outer ring cannot start and end with the same point".into(),
        ));
    }
    validate_ring(outer, "outer ring")
}

fn validate_ring(ring: &[Coord<f64>], name: &str) -> Result<()> {
    if ring.len() < 3 {
        return Err(SkeletonError::InvalidGeometry(format!(
            "{} needs at least 3 points, got {}",
            name,
            ring.len()
        )));
    }
    let n = ring.len();
    for i in 0..n {
        if ring[i] == ring[(i + 1) % n] {
            return Err(SkeletonError::InvalidGeometry(format!(
                "{} has a zero-length edge at point {}",
                name, i
            )));
        }
    }
    Ok(())
}

type EventQueue = PriorityQueue<Event, fn(&Event, &Event) -> Ordering>;

/// Tally of the topology changes applied during one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EventCounts {
    multi_edge: usize,
    pick: usize,
    multi_split: usize,
    /// Splits left with nothing to cut at their point.
    lone_splits: usize,
    /// Most LAVs alive at the end of any level.
    peak_lavs: usize,
}

/// Mutable state of one build.
struct Simulation<'a> {
    config: &'a SkeletonBuilder,
    epsilon: f64,
    edges: Edges,
    /// Every input edge, in ring order.
    edge_ids: Vec<EdgeId>,
    vertices: Vertices,
    faces: FaceQueues,
    /// Seed face chains, one per input edge. Only these are emitted.
    face_order: Vec<QueueId>,
    lavs: Vec<RingId>,
    queue: EventQueue,
    /// Edge events recomputed at the current height, replayed as the next level.
    carried: Vec<Event>,
    counts: EventCounts,
}

impl<'a> Simulation<'a> {
    fn new(config: &'a SkeletonBuilder, epsilon: f64) -> Self {
        Self {
            config,
            epsilon,
            edges: Edges::new(),
            edge_ids: Vec::new(),
            vertices: Vertices::new(),
            faces: FaceQueues::new(),
            face_order: Vec::new(),
            lavs: Vec::new(),
            queue: PriorityQueue::with_capacity(3, compare_by_distance as fn(&Event, &Event) -> Ordering),
            carried: Vec::new(),
            counts: EventCounts::default(),
        }
    }

    /// Creates the edge ring, the LAV and the seed face chains of one input ring.
    fn init_slav(&mut self, points: &[Coord<f64>]) -> Result<()> {
        let edge_ring = self.edges.new_ring();
        let n = points.len();
        for i in 0..n {
            let edge = self.edges.insert(Edge::new(points[i], points[(i + 1) % n]));
            self.edges.add_last(edge_ring, edge)?;
        }

        let ring_edges = self.edges.members(edge_ring);
        for &edge in &ring_edges {
            let next = self.edges.next(edge);
            let bisector = self.calc_bisector(self.edges[edge].end, edge, next);
            self.edges[edge].bisector_next = bisector;
            self.edges[next].bisector_previous = bisector;
            self.edge_ids.push(edge);
        }

        let lav = self.vertices.new_ring();
        self.lavs.push(lav);
        for &edge in &ring_edges {
            let next = self.edges.next(edge);
            let point = self.edges[edge].end;
            let bisector = self.edges[edge].bisector_next;
            let vertex = self.new_vertex(point, 0.0, bisector, edge, next);
            self.vertices.add_last(lav, vertex)?;
        }

        for vertex in self.vertices.members(lav) {
            let next = self.vertices.next(vertex);

            let right = self.faces.insert(vertex);
            let queue = self.faces.new_queue(Some(self.vertices[vertex].next_edge));
            self.faces.add_first(queue, right)?;
            self.face_order.push(queue);
            self.vertices[vertex].right_face = Some(right);

            let left = self.faces.insert(next);
            self.faces.add_push(right, left)?;
            self.vertices[next].left_face = Some(left);
        }
        Ok(())
    }

    fn init_events(&mut self) -> Result<()> {
        let lavs = self.lavs.clone();
        for &lav in &lavs {
            for vertex in self.vertices.members(lav) {
                self.compute_split_events(vertex, None)?;
            }
        }
        for &lav in &lavs {
            for vertex in self.vertices.members(lav) {
                let next = self.vertices.next(vertex);
                self.compute_edge_events(vertex, next);
            }
        }
        Ok(())
    }

    /// Processes levels until the queue drains. Returns the number of levels.
    fn run(&mut self) -> Result<usize> {
        let mut count = 0;
        self.counts.peak_lavs = self.lavs.len();
        loop {
            let Some(level_height) = self.queue.peek().map(|e| e.distance()) else {
                break;
            };
            count += 1;
            if count > self.config.max_iterations {
                return Err(SkeletonError::IterationLimit {
                    iterations: self.config.max_iterations,
                });
            }

            let level = self.load_level_events();
            let level_size = level.len();
            let grouped = group_level_events(level, self.epsilon)?;
            trace!(
                "Level {} at height {}: {} events in {} groups",
                count,
                level_height,
                level_size,
                grouped.len()
            );

            for event in grouped {
                if event.is_obsolete(&self.vertices) {
                    continue;
                }
                let kind = event.kind();
                trace!("Applying {} event at {:?}", kind, event.point());
                match event {
                    Event::MultiSplit {
                        point,
                        distance,
                        chains,
                    } => self.multi_split_event(point, distance, chains)?,
                    Event::Pick {
                        point,
                        distance,
                        chain,
                    } => self.pick_event(point, distance, &chain)?,
                    Event::MultiEdge {
                        point,
                        distance,
                        chain,
                    } => self.multi_edge_event(point, distance, &chain)?,
                    Event::Edge(_) | Event::Split(_) | Event::VertexSplit(_) => {
                        return topology(format!(
                            "ungrouped {} event reached the level dispatcher",
                            kind
                        ));
                    }
                }
            }

            self.process_two_node_lavs()?;
            self.remove_events_under_height(level_height);
            for event in std::mem::take(&mut self.carried) {
                self.queue.add(event);
            }
            self.remove_empty_lavs();
            self.counts.peak_lavs = self.counts.peak_lavs.max(self.lavs.len());
        }
        Ok(count)
    }

    /// Pops every live event within epsilon of the first live one.
    fn load_level_events(&mut self) -> Vec<Event> {
        let mut level = Vec::new();
        let start = loop {
            match self.queue.next() {
                None => return level,
                Some(event) if event.is_obsolete(&self.vertices) => continue,
                Some(event) => break event,
            }
        };

        let start_height = start.distance();
        level.push(start);

        while let Some(event) = self.queue.peek() {
            if (event.distance() - start_height).abs() >= self.epsilon {
                break;
            }
            if let Some(event) = self.queue.next() {
                if !event.is_obsolete(&self.vertices) {
                    level.push(event);
                }
            }
        }
        level
    }

    fn process_two_node_lavs(&mut self) -> Result<()> {
        for lav in self.lavs.clone() {
            if self.vertices.size(lav) != 2 {
                continue;
            }
            let Some(first) = self.vertices.first(lav) else {
                continue;
            };
            let last = self.vertices.next(first);

            let (first_left, first_right) = (self.left_face(first)?, self.right_face(first)?);
            let (last_left, last_right) = (self.left_face(last)?, self.right_face(last)?);
            connect_queues(&mut self.faces, first_left, last_right)?;
            connect_queues(&mut self.faces, first_right, last_left)?;

            self.vertices[first].is_processed = true;
            self.vertices[last].is_processed = true;
            lav::remove_from_lav(&mut self.vertices, first)?;
            lav::remove_from_lav(&mut self.vertices, last)?;
        }
        Ok(())
    }

    fn remove_events_under_height(&mut self, level_height: f64) {
        while let Some(event) = self.queue.peek() {
            if event.distance() > level_height + self.epsilon {
                break;
            }
            self.queue.next();
        }
    }

    fn remove_empty_lavs(&mut self) {
        let vertices = &self.vertices;
        self.lavs.retain(|&lav| vertices.size(lav) > 0);
    }

    fn multi_edge_event(&mut self, center: Vector2d, distance: f64, chain: &EdgeChain) -> Result<()> {
        let previous = chain.previous_vertex();
        let next = chain.next_vertex();

        if self.vertices.next(next) == previous {
            // Only the closing edge of the LAV is left outside the chain and
            // it shrinks to the same point.
            let mut events = chain.events.clone();
            events.push(EdgeEvent {
                point: center,
                distance,
                previous_vertex: next,
                next_vertex: previous,
            });
            return self.pick_event(center, distance, &EdgeChain::new(events));
        }

        self.counts.multi_edge += 1;
        self.vertices[previous].is_processed = true;
        self.vertices[next].is_processed = true;

        let previous_edge = self.vertices[previous].previous_edge;
        let next_edge = self.vertices[next].next_edge;
        let bisector = self.calc_bisector(center, previous_edge, next_edge);
        let vertex = self.new_vertex(center, distance, bisector, previous_edge, next_edge);

        self.add_face_left(vertex, previous)?;
        self.add_face_right(vertex, next)?;
        self.vertices.add_previous(previous, vertex)?;

        self.add_multi_back_faces(&chain.events, vertex)?;
        self.compute_events(vertex)
    }

    fn pick_event(&mut self, center: Vector2d, distance: f64, chain: &EdgeChain) -> Result<()> {
        self.counts.pick += 1;
        let vertex = self.center_vertex(center, distance, chain);
        self.add_multi_back_faces(&chain.events, vertex)
    }

    /// A processed vertex with no bisector, closing the faces of a chain.
    fn center_vertex(&mut self, center: Vector2d, distance: f64, chain: &EdgeChain) -> VertexId {
        let previous_edge = chain.previous_edge(&self.vertices);
        let next_edge = chain.next_edge(&self.vertices);
        let vertex = self.new_vertex(center, distance, Ray::new(center, ZERO), previous_edge, next_edge);
        self.vertices[vertex].is_processed = true;
        vertex
    }

    /// Retires every vertex of the chain and closes the face between each
    /// collapsed pair at `center`.
    fn add_multi_back_faces(&mut self, events: &[EdgeEvent], center: VertexId) -> Result<()> {
        for event in events {
            let left = event.previous_vertex;
            self.vertices[left].is_processed = true;
            lav::remove_from_lav(&mut self.vertices, left)?;

            let right = event.next_vertex;
            self.vertices[right].is_processed = true;
            lav::remove_from_lav(&mut self.vertices, right)?;

            self.add_face_back(center, left, right)?;
        }
        Ok(())
    }

    fn multi_split_event(&mut self, center: Vector2d, distance: f64, mut chains: Vec<Chain>) -> Result<()> {
        let mut parents: SmallVec<[VertexId; 4]> = SmallVec::new();
        for chain in &chains {
            if let Some(parent) = chain.current_vertex() {
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
        }

        self.create_opposite_edge_chains(&mut chains, center)?;

        // A split needs a second chain to cut against. Alone, its vertex
        // reached a point whose wavefront has already moved on.
        if matches!(chains.as_slice(), [] | [Chain::Split { .. }]) {
            trace!("Split at {:?} has nothing to cut, recomputing {} vertices", center, parents.len());
            self.counts.lone_splits += 1;
            for parent in parents {
                self.requeue_vertex_events(parent, distance)?;
            }
            return Ok(());
        }
        self.counts.multi_split += 1;

        {
            let vertices = &self.vertices;
            let edges = &self.edges;
            let angle = |chain: &Chain| {
                let p = edges[chain.previous_edge(vertices)].begin;
                (p.y - center.y).atan2(p.x - center.x)
            };
            chains.sort_by(|a, b| angle(a).partial_cmp(&angle(b)).unwrap_or(Ordering::Equal));
        }

        let mut last_face: Option<PathNodeId> = None;
        let n = chains.len();
        for i in 0..n {
            let begin = &chains[i];
            let end = &chains[(i + 1) % n];

            let begin_next_edge = begin.next_edge(&self.vertices);
            let end_previous_edge = end.previous_edge(&self.vertices);
            let bisector = self.calc_bisector(center, end_previous_edge, begin_next_edge);
            let new_vertex = self.new_vertex(center, distance, bisector, end_previous_edge, begin_next_edge);

            let begin_next_vertex = self.outer_next_vertex(begin);
            let end_previous_vertex = self.outer_previous_vertex(end);

            self.correct_bisector_direction(
                new_vertex,
                begin_next_vertex,
                end_previous_vertex,
                begin_next_edge,
                end_previous_edge,
            )?;

            if lav::is_same_lav(&self.vertices, begin_next_vertex, end_previous_vertex) {
                let part = lav::cut_lav_part(&mut self.vertices, begin_next_vertex, end_previous_vertex)?;
                let ring = self.vertices.new_ring();
                self.lavs.push(ring);
                self.vertices.add_last(ring, new_vertex)?;
                for vertex in part {
                    self.vertices.add_last(ring, vertex)?;
                }
            } else {
                lav::merge_before_base_vertex(&mut self.vertices, begin_next_vertex, end_previous_vertex)?;
                self.vertices.add_next(end_previous_vertex, new_vertex)?;
            }

            self.compute_events(new_vertex)?;
            last_face = self.add_split_faces(last_face, begin, end, new_vertex)?;
        }

        for chain in &chains {
            match chain {
                Chain::Split { parent, .. } => {
                    lav::remove_from_lav(&mut self.vertices, *parent)?;
                    self.vertices[*parent].is_processed = true;
                }
                Chain::Edge(edge_chain) => {
                    let vertex = self.center_vertex(center, distance, edge_chain);
                    self.add_multi_back_faces(&edge_chain.events, vertex)?;
                }
                Chain::SingleEdge { .. } => {}
            }
        }
        Ok(())
    }

    /// First live vertex after the chain along its LAV.
    fn outer_next_vertex(&self, chain: &Chain) -> VertexId {
        match chain {
            Chain::Edge(edge_chain) => self.vertices.next(edge_chain.next_vertex()),
            other => other.next_vertex(&self.vertices),
        }
    }

    /// Last live vertex before the chain along its LAV.
    fn outer_previous_vertex(&self, chain: &Chain) -> VertexId {
        match chain {
            Chain::Edge(edge_chain) => self.vertices.previous(edge_chain.previous_vertex()),
            other => other.previous_vertex(&self.vertices),
        }
    }

    fn correct_bisector_direction(
        &mut self,
        vertex: VertexId,
        begin_next_vertex: VertexId,
        end_previous_vertex: VertexId,
        begin_edge: EdgeId,
        end_edge: EdgeId,
    ) -> Result<()> {
        if self.vertices[begin_next_vertex].previous_edge != begin_edge
            || self.vertices[end_previous_vertex].next_edge != end_edge
        {
            return topology("split chain edges do not match their neighbouring vertices");
        }

        if self.edges[begin_edge].norm.dot(self.edges[end_edge].norm) < ANTIPARALLEL_DOT {
            let origin = self.vertices[vertex].bisector.origin;
            let n1 = (origin - self.vertices[end_previous_vertex].point).normalized();
            let n2 = (self.vertices[begin_next_vertex].point - origin).normalized();
            let prediction = bisector_direction(n1, n2);

            if self.vertices[vertex].bisector.direction.dot(prediction) < 0.0 {
                self.vertices[vertex].bisector.negate();
            }
        }
        Ok(())
    }

    /// Attaches the faces of a multi-split vertex. A single-edge chain has no
    /// vertex to hang its face on, so a fresh unconnected chain is opened for
    /// it and handed over to the next single-edge side through `last_face`.
    fn add_split_faces(
        &mut self,
        mut last_face: Option<PathNodeId>,
        begin: &Chain,
        end: &Chain,
        vertex: VertexId,
    ) -> Result<Option<PathNodeId>> {
        match begin {
            Chain::SingleEdge { .. } => match last_face.take() {
                None => {
                    let node = self.create_opposite_edge_vertex(vertex)?;
                    self.vertices[vertex].right_face = Some(node);
                    last_face = Some(node);
                }
                Some(node) => {
                    if self.vertices[vertex].right_face.is_some() {
                        return topology("split vertex already has a right face");
                    }
                    self.vertices[vertex].right_face = Some(node);
                }
            },
            Chain::Edge(edge_chain) => self.add_face_right(vertex, edge_chain.next_vertex())?,
            Chain::Split { parent, .. } => self.add_face_right(vertex, *parent)?,
        }

        match end {
            Chain::SingleEdge { .. } => match last_face.take() {
                None => {
                    let node = self.create_opposite_edge_vertex(vertex)?;
                    self.vertices[vertex].left_face = Some(node);
                    last_face = Some(node);
                }
                Some(node) => {
                    if self.vertices[vertex].left_face.is_some() {
                        return topology("split vertex already has a left face");
                    }
                    self.vertices[vertex].left_face = Some(node);
                }
            },
            Chain::Edge(edge_chain) => self.add_face_left(vertex, edge_chain.previous_vertex())?,
            Chain::Split { parent, .. } => self.add_face_left(vertex, *parent)?,
        }
        Ok(last_face)
    }

    /// Copy of `vertex` seeding a new unconnected face chain.
    fn create_opposite_edge_vertex(&mut self, vertex: VertexId) -> Result<PathNodeId> {
        let copy = Vertex {
            left_face: None,
            right_face: None,
            is_processed: false,
            ..self.vertices[vertex].clone()
        };
        let copy = self.vertices.insert(copy);

        let node = self.faces.insert(copy);
        self.vertices[copy].left_face = Some(node);
        self.vertices[copy].right_face = Some(node);

        let queue = self.faces.new_queue(None);
        self.faces.add_first(queue, node)?;
        Ok(node)
    }

    /// Adds a single-edge chain for every distinct opposite edge of the split
    /// chains. Splits whose opposite edge has left the wavefront are dropped.
    fn create_opposite_edge_chains(&self, chains: &mut Vec<Chain>, center: Vector2d) -> Result<()> {
        let mut seen: Vec<EdgeId> = Vec::new();
        let mut opposite_chains = Vec::new();
        let mut kept = Vec::with_capacity(chains.len());

        for chain in chains.drain(..) {
            if let Chain::Split {
                opposite_edge: Some(edge),
                ..
            } = &chain
            {
                let edge = *edge;
                if !seen.contains(&edge) {
                    seen.push(edge);
                    match self.find_opposite_edge_lav(edge, center)? {
                        Some(next_vertex) => opposite_chains.push(Chain::SingleEdge {
                            opposite_edge: edge,
                            previous_vertex: self.vertices.previous(next_vertex),
                            next_vertex,
                        }),
                        None => continue,
                    }
                }
            }
            kept.push(chain);
        }

        kept.extend(opposite_chains);
        *chains = kept;
        Ok(())
    }

    /// Vertex right after `edge` in the LAV that holds the split point.
    fn find_opposite_edge_lav(&self, edge: EdgeId, center: Vector2d) -> Result<Option<VertexId>> {
        let edge_lavs: Vec<VertexId> = self
            .lavs
            .iter()
            .filter_map(|&lav| {
                self.vertices
                    .iter(lav)
                    .find(|&v| self.vertices[v].previous_edge == edge)
            })
            .collect();

        match edge_lavs.len() {
            0 => return Ok(None),
            1 => return Ok(Some(edge_lavs[0])),
            _ => {}
        }

        let opposite = &self.edges[edge];
        let center_dot = opposite.norm.dot(center - opposite.begin);

        for &end in &edge_lavs {
            let begin = self.vertices.previous(end);
            let begin_dot = opposite.norm.dot(self.vertices[begin].point - opposite.begin);
            let end_dot = opposite.norm.dot(self.vertices[end].point - opposite.begin);

            if (begin_dot < center_dot && center_dot < end_dot)
                || (begin_dot > center_dot && center_dot > end_dot)
            {
                return Ok(Some(end));
            }
        }

        for &end in &edge_lavs {
            let Some(ring) = self.vertices.ring_of(end) else {
                continue;
            };
            let mut points = Vec::with_capacity(self.vertices.size(ring));
            let mut next = end;
            for _ in 0..self.vertices.size(ring) {
                points.push(self.vertices[next].point);
                next = self.vertices.next(next);
            }
            if is_point_inside_polygon(center, &points) {
                return Ok(Some(end));
            }
        }

        topology("could not find the LAV of an opposite edge")
    }

    /// Recomputes the events of a vertex that stays in the wavefront after its
    /// split fell through. Edge events up to `height` around the vertex are
    /// carried into the next level; split events up to it are dropped.
    fn requeue_vertex_events(&mut self, vertex: VertexId, height: f64) -> Result<()> {
        let Some(ring) = self.vertices.ring_of(vertex) else {
            return Ok(());
        };
        if self.vertices[vertex].is_processed || self.vertices.size(ring) < 3 {
            return Ok(());
        }

        let floor = height + self.epsilon;
        let previous = self.vertices.previous(vertex);
        let next = self.vertices.next(vertex);
        let pairs = [
            (self.vertices.previous(previous), previous),
            (previous, vertex),
            (vertex, next),
            (next, self.vertices.next(next)),
        ];

        let point = self.vertices[vertex].point;
        let mut bound: Option<f64> = None;
        let mut seen: SmallVec<[(VertexId, VertexId); 4]> = SmallVec::new();
        for (a, b) in pairs {
            if seen.contains(&(a, b)) {
                continue;
            }
            seen.push((a, b));

            let Some(intersect) = self.compute_intersection_bisectors(a, b) else {
                continue;
            };
            if a == vertex || b == vertex {
                let d = point.distance_squared(intersect);
                bound = Some(bound.map_or(d, |x: f64| x.min(d)));
            }
            let event = self.create_edge_event(intersect, a, b);
            if event.distance() <= floor {
                self.carried.push(event);
            } else {
                self.queue.add(event);
            }
        }

        for event in self.split_events(vertex, bound)? {
            if event.distance() > floor {
                self.queue.add(event);
            }
        }
        Ok(())
    }

    fn compute_events(&mut self, vertex: VertexId) -> Result<()> {
        let bound = self.compute_closer_edge_event(vertex);
        self.compute_split_events(vertex, bound)
    }

    /// Queues the nearer of the two neighbour edge events (both when tied)
    /// and returns its squared distance, or `None` when neither exists.
    fn compute_closer_edge_event(&mut self, vertex: VertexId) -> Option<f64> {
        let next = self.vertices.next(vertex);
        let previous = self.vertices.previous(vertex);
        let point = self.vertices[vertex].point;

        let point1 = self.compute_intersection_bisectors(vertex, next);
        let point2 = self.compute_intersection_bisectors(previous, vertex);
        if point1.is_none() && point2.is_none() {
            return None;
        }

        let distance1 = point1.map_or(f64::MAX, |p| point.distance_squared(p));
        let distance2 = point2.map_or(f64::MAX, |p| point.distance_squared(p));

        if let Some(p) = point1 {
            if (distance1 - self.epsilon).abs() < distance2 {
                let event = self.create_edge_event(p, vertex, next);
                self.queue.add(event);
            }
        }
        if let Some(p) = point2 {
            if (distance2 - self.epsilon).abs() < distance1 {
                let event = self.create_edge_event(p, previous, vertex);
                self.queue.add(event);
            }
        }

        Some(distance1.min(distance2))
    }

    fn compute_edge_events(&mut self, previous: VertexId, next: VertexId) {
        if let Some(point) = self.compute_intersection_bisectors(previous, next) {
            let event = self.create_edge_event(point, previous, next);
            self.queue.add(event);
        }
    }

    fn create_edge_event(&self, point: Vector2d, previous: VertexId, next: VertexId) -> Event {
        let edge = &self.edges[self.vertices[previous].next_edge];
        Event::Edge(EdgeEvent {
            point,
            distance: calc_distance(point, edge),
            previous_vertex: previous,
            next_vertex: next,
        })
    }

    fn compute_split_events(&mut self, vertex: VertexId, bound: Option<f64>) -> Result<()> {
        for event in self.split_events(vertex, bound)? {
            self.queue.add(event);
        }
        Ok(())
    }

    /// Split candidates of `vertex`, skipping those farther than `bound`
    /// (squared) when one is given.
    fn split_events(&self, vertex: VertexId, bound: Option<f64>) -> Result<Vec<Event>> {
        let source = self.vertices[vertex].point;
        let mut events = Vec::new();

        for candidate in self.calc_opposite_edges(vertex)? {
            if let Some(bound) = bound {
                if source.distance_squared(candidate.point) > bound + self.epsilon {
                    continue;
                }
            }

            let event = match (candidate.opposite_point, candidate.opposite_edge) {
                (None, Some(opposite_edge)) => Event::Split(SplitEvent {
                    point: candidate.point,
                    distance: candidate.distance,
                    parent: vertex,
                    opposite_edge,
                }),
                _ => Event::VertexSplit(VertexSplitEvent {
                    point: candidate.point,
                    distance: candidate.distance,
                    parent: vertex,
                }),
            };
            events.push(event);
        }
        Ok(events)
    }

    fn calc_opposite_edges(&self, vertex: VertexId) -> Result<Vec<SplitCandidate>> {
        let v = &self.vertices[vertex];
        let mut candidates = Vec::new();

        for &edge in &self.edge_ids {
            if edge == v.previous_edge || edge == v.next_edge {
                continue;
            }
            // Edge line entirely behind the bisector.
            if v.bisector.collide(&self.edges[edge].line, self.epsilon).is_none() {
                continue;
            }
            if let Some(candidate) = self.calc_candidate_point_for_split(vertex, edge)? {
                candidates.push(candidate);
            }
        }

        sort_split_candidates(&mut candidates);
        Ok(candidates)
    }

    fn calc_candidate_point_for_split(&self, vertex: VertexId, edge: EdgeId) -> Result<Option<SplitCandidate>> {
        let Some(vertex_edge) = self.chose_less_parallel_vertex_edge(vertex, edge) else {
            return Ok(None);
        };
        let own = &self.edges[vertex_edge];
        let opposite = &self.edges[edge];
        let eps = self.epsilon;

        let edges_bisector = bisector_direction(own.norm, opposite.norm);
        let Some(edges_collide) = own.line.intersect(&opposite.line) else {
            return topology("incident edge is parallel to the opposite edge");
        };
        let bisector_line = Ray::new(edges_collide, edges_bisector).to_implicit();

        let Some(point) = self.vertices[vertex].bisector.collide(&bisector_line, eps) else {
            return Ok(None);
        };

        if opposite.bisector_previous.is_on_right_side(point, eps)
            && opposite.bisector_next.is_on_left_side(point, eps)
        {
            let distance = calc_distance(point, opposite);

            if opposite.bisector_previous.is_on_left_side(point, eps) {
                return Ok(Some(SplitCandidate {
                    point,
                    distance,
                    opposite_edge: None,
                    opposite_point: Some(opposite.begin),
                }));
            }
            // On the far bisector the vertex meets the end of the edge.
            if opposite.bisector_next.is_on_right_side(point, eps) {
                return Ok(Some(SplitCandidate {
                    point,
                    distance,
                    opposite_edge: None,
                    opposite_point: Some(opposite.end),
                }));
            }

            return Ok(Some(SplitCandidate {
                point,
                distance,
                opposite_edge: Some(edge),
                opposite_point: None,
            }));
        }
        Ok(None)
    }

    /// The incident edge of `vertex` less parallel to `edge`, or `None` when
    /// both are parallel to it.
    fn chose_less_parallel_vertex_edge(&self, vertex: VertexId, edge: EdgeId) -> Option<EdgeId> {
        let v = &self.vertices[vertex];
        let norm = self.edges[edge].norm;
        let a_dot = norm.dot(self.edges[v.previous_edge].norm).abs();
        let b_dot = norm.dot(self.edges[v.next_edge].norm).abs();

        if a_dot + b_dot >= 2.0 - self.epsilon {
            return None;
        }
        Some(if a_dot > b_dot { v.next_edge } else { v.previous_edge })
    }

    fn compute_intersection_bisectors(&self, previous: VertexId, next: VertexId) -> Option<Vector2d> {
        let p = &self.vertices[previous];
        let n = &self.vertices[next];
        let intersect = intersect_rays(&p.bisector, &n.bisector)?;

        if p.point == intersect || n.point == intersect {
            return None;
        }
        Some(intersect)
    }

    fn add_face_back(&mut self, vertex: VertexId, va: VertexId, vb: VertexId) -> Result<()> {
        let node = self.faces.insert(vertex);
        let va_right = self.right_face(va)?;
        self.faces.add_push(va_right, node)?;
        let vb_left = self.left_face(vb)?;
        connect_queues(&mut self.faces, node, vb_left)
    }

    fn add_face_right(&mut self, vertex: VertexId, vb: VertexId) -> Result<()> {
        let node = self.faces.insert(vertex);
        let vb_right = self.right_face(vb)?;
        self.faces.add_push(vb_right, node)?;
        self.vertices[vertex].right_face = Some(node);
        Ok(())
    }

    fn add_face_left(&mut self, vertex: VertexId, va: VertexId) -> Result<()> {
        let node = self.faces.insert(vertex);
        let va_left = self.left_face(va)?;
        self.faces.add_push(va_left, node)?;
        self.vertices[vertex].left_face = Some(node);
        Ok(())
    }

    fn left_face(&self, vertex: VertexId) -> Result<PathNodeId> {
        match self.vertices[vertex].left_face {
            Some(node) => Ok(node),
            None => topology("vertex has no left face"),
        }
    }

    fn right_face(&self, vertex: VertexId) -> Result<PathNodeId> {
        match self.vertices[vertex].right_face {
            Some(node) => Ok(node),
            None => topology("vertex has no right face"),
        }
    }

    fn calc_bisector(&self, point: Vector2d, previous_edge: EdgeId, next_edge: EdgeId) -> Ray {
        let direction = bisector_direction(self.edges[previous_edge].norm, self.edges[next_edge].norm);
        Ray::new(point, direction)
    }

    fn new_vertex(
        &mut self,
        point: Vector2d,
        distance: f64,
        bisector: Ray,
        previous_edge: EdgeId,
        next_edge: EdgeId,
    ) -> VertexId {
        let digits = self.config.distance_digits;
        self.vertices.insert(Vertex::new(point, distance, bisector, previous_edge, next_edge, digits))
    }

    /// Walks every seed face chain into the result.
    fn into_skeleton(self) -> Skeleton {
        let mut edges = Vec::with_capacity(self.face_order.len());
        let mut distances = HashMap::new();

        for &queue in &self.face_order {
            if self.faces.size(queue) == 0 {
                continue;
            }
            let Some(edge) = *self.faces.meta(queue) else {
                continue;
            };

            let mut polygon = Vec::with_capacity(self.faces.size(queue));
            for node in self.faces.iter(queue) {
                let vertex = &self.vertices[*self.faces.value(node)];
                polygon.push(vertex.point);
                distances
                    .entry(PointKey::from(vertex.point))
                    .or_insert(vertex.distance);
            }

            let edge = &self.edges[edge];
            edges.push(EdgeResult {
                edge: Line::new(edge.begin, edge.end),
                polygon,
            });
        }
        Skeleton::new(edges, distances)
    }
}

/// Distance from `point` to the supporting line of `edge`.
fn calc_distance(point: Vector2d, edge: &Edge) -> f64 {
    let direction = edge.end - edge.begin;
    let vector = point - edge.begin;
    let projected = orthogonal_projection(direction, vector);
    vector.distance_to(projected)
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
