//! Single-component placement.
//!
//! Runs in two phases over an immutable [`Topology`]:
//!
//! 1. every vertex's neighbors are split into *cycle* neighbors (the edge closes a cycle) and
//!    *tree* neighbors, visiting vertices by descending neighbor count;
//! 2. a depth-first walk from the root assigns each vertex a position exactly once, moving it
//!    from unplaced to placed. Cycle neighbors are fanned out on alternating sides of the
//!    outward direction; tree neighbors follow on the side the fan ended on.

use super::LayoutOptions;
use crate::error::{Error, Result};
use crate::geom::{Vector2D, angle_delta};
use crate::graph::{Edge, Topology, VertexId};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborPartition {
    pub cycle: Vec<VertexId>,
    pub tree: Vec<VertexId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedVertex {
    pub position: Vector2D,
    /// Angle (degrees) at which the next child of this vertex will be placed.
    pub cursor: f64,
}

#[derive(Debug, Clone)]
pub struct Placement {
    root: VertexId,
    partitions: IndexMap<VertexId, NeighborPartition>,
    placed: IndexMap<VertexId, PlacedVertex>,
}

impl Placement {
    pub fn root(&self) -> VertexId {
        self.root
    }

    pub fn partition(&self, id: VertexId) -> Option<&NeighborPartition> {
        self.partitions.get(&id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&PlacedVertex> {
        self.placed.get(&id)
    }

    /// Vertices in the order they were placed; the root comes first.
    pub fn visit_order(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.placed.keys().copied()
    }

    pub fn positions(&self) -> BTreeMap<VertexId, Vector2D> {
        self.placed
            .iter()
            .map(|(&id, v)| (id, v.position))
            .collect()
    }
}

/// `vertices` sorted by neighbor count (descending), ties by ascending id.
pub fn by_descending_degree(topology: &Topology, vertices: &[VertexId]) -> Result<Vec<VertexId>> {
    let mut keyed = vertices
        .iter()
        .map(|&v| Ok((topology.degree(v)?, v)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    Ok(keyed.into_iter().map(|(_, v)| v).collect())
}

/// The vertex with the most neighbors; ties go to the lowest id.
pub fn select_root(topology: &Topology, vertices: &[VertexId]) -> Result<VertexId> {
    by_descending_degree(topology, vertices)?
        .first()
        .copied()
        .ok_or(Error::EmptyComponent)
}

/// Whether `from` reaches `target` along a simple path of at least two edges, i.e. without using
/// the direct `from`-`target` edge.
pub fn points_to(topology: &Topology, from: VertexId, target: VertexId) -> Result<bool> {
    let mut visited: FxHashSet<VertexId> = FxHashSet::default();
    visited.insert(from);

    let mut stack: Vec<VertexId> = topology
        .neighbors(from)?
        .iter()
        .copied()
        .filter(|&n| n != target)
        .collect();
    while let Some(v) = stack.pop() {
        if v == target {
            return Ok(true);
        }
        if !visited.insert(v) {
            continue;
        }
        for &w in topology.neighbors(v)? {
            if !visited.contains(&w) {
                stack.push(w);
            }
        }
    }
    Ok(false)
}

/// Edges whose removal disconnects their component, found with an iterative low-link walk.
///
/// In a simple graph an edge `v`-`c` is a bridge exactly when `points_to(c, v)` is `false`, so
/// this answers every per-edge search in one linear pass.
pub fn bridges(topology: &Topology, vertices: &[VertexId]) -> Result<FxHashSet<Edge>> {
    struct Frame {
        vertex: VertexId,
        parent: Option<VertexId>,
        neighbors: Vec<VertexId>,
        next: usize,
    }

    let mut discovered: FxHashMap<VertexId, usize> = FxHashMap::default();
    let mut low: FxHashMap<VertexId, usize> = FxHashMap::default();
    let mut out: FxHashSet<Edge> = FxHashSet::default();

    for &start in vertices {
        if discovered.contains_key(&start) {
            continue;
        }
        let index = discovered.len();
        discovered.insert(start, index);
        low.insert(start, index);
        let mut stack = vec![Frame {
            vertex: start,
            parent: None,
            neighbors: topology.neighbors(start)?.iter().copied().collect(),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let v = frame.vertex;
            if let Some(&w) = frame.neighbors.get(frame.next) {
                frame.next += 1;
                if Some(w) == frame.parent {
                    continue;
                }
                if let Some(&seen) = discovered.get(&w) {
                    let lowest = low[&v].min(seen);
                    low.insert(v, lowest);
                } else {
                    let index = discovered.len();
                    discovered.insert(w, index);
                    low.insert(w, index);
                    let neighbors = topology.neighbors(w)?.iter().copied().collect();
                    stack.push(Frame {
                        vertex: w,
                        parent: Some(v),
                        neighbors,
                        next: 0,
                    });
                }
                continue;
            }

            let parent = frame.parent;
            stack.pop();
            if let Some(p) = parent {
                let lowest = low[&p].min(low[&v]);
                low.insert(p, lowest);
                if low[&v] > discovered[&p] {
                    out.insert(Edge::new(p, v));
                }
            }
        }
    }
    Ok(out)
}

/// Splits each vertex's neighbors into cycle and tree neighbors (both in ascending id order).
pub fn classify_neighbors(
    topology: &Topology,
    vertices: &[VertexId],
) -> Result<IndexMap<VertexId, NeighborPartition>> {
    let bridges = bridges(topology, vertices)?;
    let mut out = IndexMap::with_capacity(vertices.len());
    for v in by_descending_degree(topology, vertices)? {
        let mut partition = NeighborPartition::default();
        for &c in topology.neighbors(v)? {
            if bridges.contains(&Edge::new(v, c)) {
                partition.tree.push(c);
            } else {
                partition.cycle.push(c);
            }
        }
        out.insert(v, partition);
    }
    Ok(out)
}

pub fn place(
    topology: &Topology,
    vertices: &[VertexId],
    options: &LayoutOptions,
) -> Result<Placement> {
    let root = select_root(topology, vertices)?;
    let partitions = classify_neighbors(topology, vertices)?;

    let mut placer = Placer {
        topology,
        options,
        partitions: &partitions,
        placed: IndexMap::with_capacity(vertices.len()),
    };
    placer.place_from(root)?;
    let placed = placer.placed;

    Ok(Placement {
        root,
        partitions,
        placed,
    })
}

struct Placer<'a> {
    topology: &'a Topology,
    options: &'a LayoutOptions,
    partitions: &'a IndexMap<VertexId, NeighborPartition>,
    placed: IndexMap<VertexId, PlacedVertex>,
}

impl Placer<'_> {
    fn angle_step(&self, degree: usize) -> f64 {
        if degree == 0 {
            return 0.0;
        }
        let step = 360.0 / degree as f64;
        if degree == 2 {
            step - self.options.two_neighbor_spread_degrees
        } else {
            step
        }
    }

    fn placed_vertex(&self, id: VertexId) -> Result<PlacedVertex> {
        self.placed
            .get(&id)
            .copied()
            .ok_or(Error::UnknownVertex { id })
    }

    fn advance_cursor(&mut self, id: VertexId, by: f64) -> Result<()> {
        let v = self
            .placed
            .get_mut(&id)
            .ok_or(Error::UnknownVertex { id })?;
        v.cursor += by;
        Ok(())
    }

    fn partition(&self, id: VertexId) -> Result<&NeighborPartition> {
        self.partitions
            .get(&id)
            .ok_or(Error::UnknownVertex { id })
    }

    /// A placed cycle neighbor of `v` sitting in the parent's outgoing direction. The parent
    /// counts too; the root's pinned angle of 0 makes it line up with a fresh cursor.
    fn cycle_neighbor_in_line(&self, v: VertexId, parent_cursor: f64) -> Result<bool> {
        let threshold = self.options.angle_snap_threshold_degrees;
        for &c in &self.partition(v)?.cycle {
            if let Some(placed) = self.placed.get(&c) {
                if angle_delta(placed.position.angle(), parent_cursor).abs() <= threshold {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Places `v` (at the origin when it has no parent) and returns the frame that fans out its
    /// children.
    fn enter(&mut self, v: VertexId, parent: Option<VertexId>) -> Result<Frame> {
        let degree = self.topology.degree(v)?;
        let step = self.angle_step(degree);

        let state = match parent {
            None => PlacedVertex {
                position: Vector2D::ORIGIN,
                cursor: 0.0,
            },
            Some(p) => {
                let parent_cursor = self.placed_vertex(p)?.cursor;
                let cursor = parent_cursor + 180.0 + step;
                if self.cycle_neighbor_in_line(v, parent_cursor)? {
                    self.advance_cursor(p, self.options.cycle_nudge_degrees)?;
                }
                let from = self.placed_vertex(p)?;
                let distance = self.options.base_distance * degree.saturating_sub(2).max(1) as f64;
                PlacedVertex {
                    position: from.position.move_polar(from.cursor, distance),
                    cursor,
                }
            }
        };
        self.placed.insert(v, state);

        Ok(Frame {
            vertex: v,
            step,
            partition: self.partition(v)?.clone(),
            next_cycle: 0,
            next_tree: 0,
            pending: None,
            fanned: 0,
            offset: 0.0,
        })
    }

    /// Depth-first placement from `root` on an explicit frame stack. A parent's cursor moves
    /// once the child's whole subtree is placed.
    fn place_from(&mut self, root: VertexId) -> Result<()> {
        let mut stack = vec![self.enter(root, None)?];
        while let Some(top) = stack.last_mut() {
            let parent = top.vertex;
            match top.next_child(&self.placed) {
                Some(child) => {
                    let frame = self.enter(child, Some(parent))?;
                    stack.push(frame);
                }
                None => {
                    stack.pop();
                    if let Some(up) = stack.last_mut() {
                        let by = up.child_done();
                        self.advance_cursor(up.vertex, by)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Cycle,
    Tree,
}

#[derive(Debug)]
struct Frame {
    vertex: VertexId,
    step: f64,
    partition: NeighborPartition,
    next_cycle: usize,
    next_tree: usize,
    /// Kind of the child currently being placed below this frame.
    pending: Option<Branch>,
    fanned: usize,
    offset: f64,
}

impl Frame {
    /// Next unplaced neighbor: cycle neighbors first, then tree neighbors.
    fn next_child(&mut self, placed: &IndexMap<VertexId, PlacedVertex>) -> Option<VertexId> {
        while let Some(&c) = self.partition.cycle.get(self.next_cycle) {
            self.next_cycle += 1;
            if !placed.contains_key(&c) {
                self.pending = Some(Branch::Cycle);
                return Some(c);
            }
        }
        while let Some(&c) = self.partition.tree.get(self.next_tree) {
            self.next_tree += 1;
            if !placed.contains_key(&c) {
                self.pending = Some(Branch::Tree);
                return Some(c);
            }
        }
        None
    }

    /// Cursor advance owed once the pending child is done.
    ///
    /// Cycle children zig-zag: offsets 0, +s, -s, +2s, -2s, ... around the starting cursor.
    /// Tree children keep drifting to whichever side the fan ended on.
    fn child_done(&mut self) -> f64 {
        match self.pending.take() {
            Some(Branch::Cycle) => {
                self.fanned += 1;
                let rank = self.fanned.div_ceil(2) as f64;
                let next = if self.fanned % 2 == 1 {
                    rank * self.step
                } else {
                    -rank * self.step
                };
                let by = next - self.offset;
                self.offset = next;
                by
            }
            Some(Branch::Tree) if self.offset < 0.0 => -self.step,
            Some(Branch::Tree) => self.step,
            None => 0.0,
        }
    }
}
