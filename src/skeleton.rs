use geo_types::{Coord, Line, LineString, MultiLineString, MultiPolygon, Polygon};
use std::collections::HashMap;

/// Exact bit pattern of a skeleton point. Faces meeting at one node share
/// a single height entry under this key.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct PointKey(u64, u64);

impl From<Coord<f64>> for PointKey {
    fn from(c: Coord<f64>) -> Self {
        // Adding 0.0 folds -0.0 into 0.0.
        PointKey((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
    }
}

/// The face swept by one input edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeResult {
    pub edge: Line<f64>,
    /// Open ring: the first point is not repeated at the end.
    pub polygon: Vec<Coord<f64>>,
}

/// Straight skeleton of one or more polygons.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub edges: Vec<EdgeResult>,
    pub distances: HashMap<PointKey, f64>,
}

impl Skeleton {
    pub fn new(edges: Vec<EdgeResult>, distances: HashMap<PointKey, f64>) -> Self {
        Self { edges, distances }
    }

    /// Height at which `point` appeared in the wavefront, if it is a skeleton point.
    pub fn distance(&self, point: Coord<f64>) -> Option<f64> {
        self.distances.get(&PointKey::from(point)).copied()
    }

    /// Appends `other`'s faces. Heights already known are kept.
    pub fn merge(&mut self, other: Skeleton) {
        self.edges.extend(other.edges);
        for (key, distance) in other.distances {
            self.distances.entry(key).or_insert(distance);
        }
    }

    pub fn to_multi_line_string(&self) -> MultiLineString<f64> {
        MultiLineString::new(
            self.edges
                .iter()
                .map(|face| LineString::from(face.polygon.clone()))
                .collect(),
        )
    }

    /// Every face as a polygon with a closed exterior ring.
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(
            self.edges
                .iter()
                .map(|face| {
                    let mut ring = face.polygon.clone();
                    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
                        if first != last {
                            ring.push(first);
                        }
                    }
                    Polygon::new(LineString::new(ring), vec![])
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn triangle_face() -> Skeleton {
        let face = EdgeResult {
            edge: Line::new(c(0.0, 0.0), c(1.0, 0.0)),
            polygon: vec![c(0.5, 0.5), c(0.0, 0.0), c(1.0, 0.0)],
        };
        let mut distances = HashMap::new();
        distances.insert(PointKey::from(c(0.5, 0.5)), 0.5);
        distances.insert(PointKey::from(c(0.0, 0.0)), 0.0);
        distances.insert(PointKey::from(c(1.0, 0.0)), 0.0);
        Skeleton::new(vec![face], distances)
    }

    #[test]
    fn test_point_key_is_exact() {
        assert_eq!(PointKey::from(c(-0.0, 1.0)), PointKey::from(c(0.0, 1.0)));
        assert_ne!(PointKey::from(c(0.1 + 0.2, 1.0)), PointKey::from(c(0.3, 1.0)));
    }

    #[test]
    fn test_distance_lookup() {
        let skeleton = triangle_face();
        assert_eq!(skeleton.distance(c(0.5, 0.5)), Some(0.5));
        assert_eq!(skeleton.distance(c(-0.0, 0.0)), Some(0.0));
        assert_eq!(skeleton.distance(c(3.0, 3.0)), None);
    }

    #[test]
    fn test_to_multi_polygon_closes_rings() {
        let mp = triangle_face().to_multi_polygon();
        assert_eq!(mp.0.len(), 1);
        let ring = &mp.0[0].exterior().0;
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], ring[3]);
    }

    #[test]
    fn test_to_multi_line_string_keeps_open_rings() {
        let mls = triangle_face().to_multi_line_string();
        assert_eq!(mls.0.len(), 1);
        assert_eq!(mls.0[0].0.len(), 3);
    }

    #[test]
    fn test_merge_keeps_first_height() {
        let mut a = triangle_face();
        let mut b = triangle_face();
        b.distances.insert(PointKey::from(c(0.5, 0.5)), 9.0);
        b.distances.insert(PointKey::from(c(7.0, 7.0)), 1.0);

        a.merge(b);
        assert_eq!(a.edges.len(), 2);
        assert_eq!(a.distance(c(0.5, 0.5)), Some(0.5));
        assert_eq!(a.distance(c(7.0, 7.0)), Some(1.0));
    }
}
