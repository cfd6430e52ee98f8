use crate::algo::LayoutOptions;
use crate::algo::placement;
use crate::error::{Error, Result};
use crate::geom::segment::segments_intersect;
use crate::geom::{BoundingBox, Vector2D};
use crate::graph::{Edge, Topology, VertexId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One connected subgraph together with its placed vertex positions.
///
/// A component is only ever observed in the placed state: [`Component::place`] runs the
/// single-component placement before the value exists. Afterwards only rigid translations are
/// applied, and each one moves `center` along with the vertices.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    root: VertexId,
    positions: BTreeMap<VertexId, Vector2D>,
    edges: BTreeSet<Edge>,
    center: Vector2D,
    radius: f64,
}

impl Component {
    /// Places the connected vertex set `vertices` of `topology` around the origin.
    pub fn place(
        topology: &Topology,
        vertices: &[VertexId],
        options: &LayoutOptions,
    ) -> Result<Self> {
        if vertices.is_empty() {
            return Err(Error::EmptyComponent);
        }
        let placement = placement::place(topology, vertices, options)?;
        let edges = topology.edges_within(vertices)?;

        let mut component = Self {
            root: placement.root(),
            positions: placement.positions(),
            edges,
            center: Vector2D::ORIGIN,
            radius: 0.0,
        };
        component.radius = component.measure_radius();
        tracing::debug!(
            root = component.root,
            vertices = component.len(),
            edges = component.edges.len(),
            radius = component.radius,
            "placed component"
        );
        Ok(component)
    }

    /// The vertex the placement started from.
    pub fn root(&self) -> VertexId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `false` for every component built by [`Component::place`].
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.positions.len() == 1
    }

    pub fn min_vertex_id(&self) -> Option<VertexId> {
        self.positions.keys().next().copied()
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.positions.keys().copied()
    }

    pub fn positions(&self) -> &BTreeMap<VertexId, Vector2D> {
        &self.positions
    }

    pub fn position(&self, id: VertexId) -> Option<Vector2D> {
        self.positions.get(&id).copied()
    }

    pub fn edges(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    pub fn center(&self) -> Vector2D {
        self.center
    }

    /// Largest distance from `center` to any vertex.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Edge segments as position pairs, in canonical edge order.
    pub fn segments(&self) -> impl Iterator<Item = (Vector2D, Vector2D)> + '_ {
        self.edges.iter().filter_map(|e| {
            let a = self.positions.get(&e.a)?;
            let b = self.positions.get(&e.b)?;
            Some((*a, *b))
        })
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.positions.values().copied())
            .unwrap_or_else(|| BoundingBox::from_point(self.center))
    }

    /// Rigid translation of every vertex and the center.
    pub fn translate(&mut self, delta: Vector2D) {
        for p in self.positions.values_mut() {
            *p += delta;
        }
        self.center += delta;
        self.radius = self.measure_radius();
    }

    pub fn move_center_to(&mut self, target: Vector2D) {
        self.translate(target - self.center);
    }

    /// Whether any edge of `self` intersects any edge of `other` (touching included).
    pub fn overlaps(&self, other: &Component) -> bool {
        if self.edges.is_empty() || other.edges.is_empty() {
            return false;
        }
        if !self.bounding_box().intersects(&other.bounding_box()) {
            return false;
        }
        self.segments().any(|(a0, a1)| {
            other
                .segments()
                .any(|(b0, b1)| segments_intersect(a0, a1, b0, b1))
        })
    }

    fn measure_radius(&self) -> f64 {
        self.positions
            .values()
            .map(|p| p.distance_to(self.center))
            .fold(0.0, f64::max)
    }
}

/// Output of a layout run: every connected component with final positions.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutResult {
    pub components: Vec<Component>,
}

impl LayoutResult {
    pub fn vertex_count(&self) -> usize {
        self.components.iter().map(Component::len).sum()
    }

    pub fn component_of(&self, id: VertexId) -> Option<&Component> {
        self.components.iter().find(|c| c.contains(id))
    }

    pub fn position(&self, id: VertexId) -> Option<Vector2D> {
        self.component_of(id).and_then(|c| c.position(id))
    }

    /// Extent of all vertices, or `None` for an empty result.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.components
            .iter()
            .map(Component::bounding_box)
            .reduce(|a, b| a.union(&b))
    }

    /// Index pairs `(i, j)` with `i < j` whose components still have intersecting edges.
    ///
    /// The arrangement is a bounded heuristic, so callers that need an overlap-free result
    /// should check this.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (i, a) in self.components.iter().enumerate() {
            for (j, b) in self.components.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    out.push((i, j));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Component;
    use crate::algo::LayoutOptions;
    use crate::geom::Vector2D;
    use crate::graph::Topology;

    fn placed(edges: &[(i64, i64)]) -> Component {
        let t = Topology::from_edges(edges.iter().copied());
        let ids: Vec<i64> = t.vertex_ids().collect();
        Component::place(&t, &ids, &LayoutOptions::default()).expect("place")
    }

    #[test]
    fn empty_vertex_set_fails_fast() {
        let t = Topology::from_edges([(1, 2)]);
        let err = Component::place(&t, &[], &LayoutOptions::default()).unwrap_err();
        assert!(matches!(err, crate::Error::EmptyComponent));

        let single = Component::place(&t, &[1, 2], &LayoutOptions::default()).expect("place");
        assert!(!single.is_empty());
        assert_eq!(single.len(), 2);
    }

    #[test]
    fn radius_is_max_distance_from_center() {
        let mut c = placed(&[(1, 2), (1, 3), (3, 4)]);
        let expected = c.positions().values().map(|p| p.length()).fold(0.0, f64::max);
        assert!((c.radius() - expected).abs() < 1e-9);

        c.translate(Vector2D::new(300.0, -120.0));
        let expected = c
            .positions()
            .values()
            .map(|p| p.distance_to(c.center()))
            .fold(0.0, f64::max);
        assert!((c.radius() - expected).abs() < 1e-9);
        assert_eq!(c.center(), Vector2D::new(300.0, -120.0));
    }

    #[test]
    fn translate_round_trip_restores_positions() {
        let mut c = placed(&[(1, 2), (2, 3), (3, 1), (3, 4)]);
        let before = c.positions().clone();
        let d = Vector2D::new(1234.5, -987.25);
        c.translate(d);
        c.translate(-d);
        for (id, p) in c.positions() {
            let q = before[id];
            assert!((p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9, "{id}: {p:?} vs {q:?}");
        }
    }

    #[test]
    fn overlap_requires_crossing_edges() {
        let a = placed(&[(1, 2)]);
        let mut b = placed(&[(3, 4)]);
        // Same shape placed on top of each other.
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        b.translate(Vector2D::new(0.0, 1000.0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn singleton_never_overlaps() {
        let t = Topology::from_links(&[(7, Default::default())].into_iter().collect());
        let single = Component::place(&t, &[7], &LayoutOptions::default()).expect("place");
        let edge = placed(&[(1, 2)]);
        assert!(single.is_singleton());
        assert_eq!(single.radius(), 0.0);
        assert!(!single.overlaps(&edge));
        assert!(!edge.overlaps(&single));
    }
}
