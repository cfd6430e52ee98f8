use crate::error::{Error, Result};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub type VertexId = i64;

/// Caller-supplied adjacency: each key lists the ids it links to.
///
/// Symmetry is not required; ids that only ever appear as targets are still vertices.
pub type LinkMap = BTreeMap<VertexId, BTreeSet<VertexId>>;

/// Undirected edge stored with the lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    pub a: VertexId,
    pub b: VertexId,
}

impl Edge {
    pub fn new(u: VertexId, v: VertexId) -> Self {
        if u <= v {
            Self { a: u, b: v }
        } else {
            Self { a: v, b: u }
        }
    }
}

/// Immutable symmetric adjacency arena, keyed by vertex id.
///
/// Iteration over ids and neighbor sets is always in ascending id order, which is what makes
/// every downstream tie-break reproducible.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    adjacency: BTreeMap<VertexId, BTreeSet<VertexId>>,
    dropped_self_loops: usize,
}

impl Topology {
    pub fn from_links(links: &LinkMap) -> Self {
        let mut topology = Self::default();
        for (&v, targets) in links {
            topology.adjacency.entry(v).or_default();
            for &w in targets {
                topology.link(v, w);
            }
        }
        topology
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (VertexId, VertexId)>,
    {
        let mut topology = Self::default();
        for (v, w) in edges {
            topology.link(v, w);
        }
        topology
    }

    fn link(&mut self, v: VertexId, w: VertexId) {
        if v == w {
            // Self-loops carry no layout information and would skew the degree heuristics.
            self.adjacency.entry(v).or_default();
            self.dropped_self_loops += 1;
            return;
        }
        self.adjacency.entry(v).or_default().insert(w);
        self.adjacency.entry(w).or_default().insert(v);
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.adjacency.contains_key(&id)
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn neighbors(&self, id: VertexId) -> Result<&BTreeSet<VertexId>> {
        self.adjacency
            .get(&id)
            .ok_or(Error::UnknownVertex { id })
    }

    pub fn degree(&self, id: VertexId) -> Result<usize> {
        Ok(self.neighbors(id)?.len())
    }

    pub fn dropped_self_loops(&self) -> usize {
        self.dropped_self_loops
    }

    /// Canonical edges of the whole graph, each appearing once.
    pub fn edges(&self) -> BTreeSet<Edge> {
        let mut out = BTreeSet::new();
        for (&v, ns) in &self.adjacency {
            for &w in ns {
                out.insert(Edge::new(v, w));
            }
        }
        out
    }

    /// Canonical edges with both endpoints inside `vertices`.
    pub fn edges_within(&self, vertices: &[VertexId]) -> Result<BTreeSet<Edge>> {
        let members: FxHashSet<VertexId> = vertices.iter().copied().collect();
        let mut out = BTreeSet::new();
        for &v in vertices {
            for &w in self.neighbors(v)? {
                if members.contains(&w) {
                    out.insert(Edge::new(v, w));
                }
            }
        }
        Ok(out)
    }

    /// Vertex set of the connected component containing `start`, in ascending id order.
    pub fn reachable_from(&self, start: VertexId) -> Result<Vec<VertexId>> {
        let mut seen: FxHashSet<VertexId> = FxHashSet::default();
        let mut stack = vec![start];
        self.neighbors(start)?;
        seen.insert(start);
        while let Some(v) = stack.pop() {
            for &w in self.neighbors(v)? {
                if seen.insert(w) {
                    stack.push(w);
                }
            }
        }
        let mut out: Vec<VertexId> = seen.into_iter().collect();
        out.sort_unstable();
        Ok(out)
    }

    /// Partition of all vertices into maximal connected sets.
    ///
    /// Groups are keyed by their minimum id; the first group found for a key wins, so
    /// re-discovering a component from another of its members is a no-op. The result is
    /// ordered by that minimum id.
    pub fn components(&self) -> Result<Vec<Vec<VertexId>>> {
        let mut by_min_id: BTreeMap<VertexId, Vec<VertexId>> = BTreeMap::new();
        let mut assigned: FxHashSet<VertexId> = FxHashSet::default();
        for v in self.vertex_ids() {
            if assigned.contains(&v) {
                continue;
            }
            let group = self.reachable_from(v)?;
            let Some(&min_id) = group.first() else {
                continue;
            };
            assigned.extend(group.iter().copied());
            by_min_id.entry(min_id).or_insert(group);
        }
        Ok(by_min_id.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Edge, LinkMap, Topology};
    use std::collections::BTreeSet;

    fn links(pairs: &[(i64, &[i64])]) -> LinkMap {
        pairs
            .iter()
            .map(|(k, vs)| (*k, vs.iter().copied().collect::<BTreeSet<_>>()))
            .collect()
    }

    #[test]
    fn construction_adds_both_directions() {
        let t = Topology::from_links(&links(&[(1, &[2, 3])]));
        assert_eq!(t.len(), 3);
        assert!(t.neighbors(2).expect("2").contains(&1));
        assert!(t.neighbors(3).expect("3").contains(&1));
        assert_eq!(t.degree(1).expect("1"), 2);
    }

    #[test]
    fn duplicate_and_mirrored_links_collapse_into_one_edge() {
        let t = Topology::from_links(&links(&[(1, &[2]), (2, &[1])]));
        assert_eq!(t.edges().into_iter().collect::<Vec<_>>(), vec![Edge::new(1, 2)]);

        let t = Topology::from_edges([(2, 1), (1, 2), (2, 1)]);
        assert_eq!(t.edges().len(), 1);
        assert_eq!(Edge::new(9, 4), Edge { a: 4, b: 9 });
    }

    #[test]
    fn self_loops_are_dropped_but_the_vertex_is_kept() {
        let t = Topology::from_links(&links(&[(1, &[1, 2]), (5, &[5])]));
        assert_eq!(t.dropped_self_loops(), 2);
        assert!(t.contains(5));
        assert_eq!(t.degree(5).expect("5"), 0);
        assert_eq!(t.degree(1).expect("1"), 1);
    }

    #[test]
    fn unknown_vertex_is_an_error() {
        let t = Topology::from_edges([(1, 2)]);
        assert!(t.neighbors(7).is_err());
        assert!(t.reachable_from(7).is_err());
    }

    #[test]
    fn components_partition_vertices_by_min_id() {
        let t = Topology::from_links(&links(&[(5, &[3]), (1, &[2]), (4, &[]), (2, &[6])]));
        let comps = t.components().expect("components");
        assert_eq!(comps, vec![vec![1, 2, 6], vec![3, 5], vec![4]]);
    }

    #[test]
    fn edges_within_ignores_outside_vertices() {
        let t = Topology::from_edges([(1, 2), (2, 3), (7, 8)]);
        let e = t.edges_within(&[1, 2, 3]).expect("edges");
        assert_eq!(e.into_iter().collect::<Vec<_>>(), vec![Edge::new(1, 2), Edge::new(2, 3)]);
    }
}
