#![forbid(unsafe_code)]

//! Deterministic 2-D layout for undirected graphs with any number of connected components.
//!
//! Each component is placed on its own with a cycle-aware radial heuristic. The components are
//! then ringed around the origin by size and collapsed inward until their edges would start to
//! cross. The only randomness is a seeded jitter applied to isolated vertices.
//!
//! ```
//! use narwhal::{LayoutOptions, LinkMap};
//!
//! let mut links = LinkMap::new();
//! links.entry(1).or_default().extend([2, 3]);
//! links.entry(4).or_default().insert(5);
//!
//! let result = narwhal::layout(&links, &LayoutOptions::default()).unwrap();
//! assert_eq!(result.components.len(), 2);
//! assert_eq!(result.vertex_count(), 5);
//! ```

pub mod algo;
pub mod component;
pub mod error;
pub mod geom;
pub mod graph;

pub use algo::LayoutOptions;
pub use component::{Component, LayoutResult};
pub use error::{Error, Result};
pub use geom::{BoundingBox, Vector2D};
pub use graph::{Edge, LinkMap, Topology, VertexId};

/// Layout entry point for a link map.
pub fn layout(links: &LinkMap, options: &LayoutOptions) -> Result<LayoutResult> {
    algo::layout(&Topology::from_links(links), options)
}

/// Layout entry point for an already built topology.
pub fn layout_topology(topology: &Topology, options: &LayoutOptions) -> Result<LayoutResult> {
    algo::layout(topology, options)
}
