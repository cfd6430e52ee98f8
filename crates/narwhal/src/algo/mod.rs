pub mod arrange;
pub mod placement;
pub(crate) mod rng;

use crate::component::{Component, LayoutResult};
use crate::error::{Error, Result};
use crate::graph::Topology;

/// Tunable heuristics of the layout engine.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Parent-to-child distance unit. A child with `n > 3` neighbors is pushed `n - 2` units away.
    pub base_distance: f64,
    /// Length of one inward collapse step.
    pub step_length: f64,
    /// Collapse step budget per component. Exhausting it is not an error.
    pub max_iterations: usize,
    /// Components per hexagonal ring; members are spaced `360 / group_size` degrees apart.
    pub group_size: usize,
    /// A placed cycle neighbor this close (in degrees) to the parent's outgoing angle triggers
    /// the cycle nudge.
    pub angle_snap_threshold_degrees: f64,
    pub cycle_nudge_degrees: f64,
    /// Subtracted from the `180` degree angle step of vertices with exactly two neighbors.
    pub two_neighbor_spread_degrees: f64,
    /// Steps to retreat after a multi-vertex component runs into a settled one.
    pub collapse_backoff_steps: usize,
    /// Steps to retreat after a single vertex enters the settled bounding box.
    pub singleton_backoff_steps: usize,
    /// Per-axis jitter bound for single vertices, in step lengths.
    pub singleton_jitter_steps: f64,
    /// Seed for the single-vertex jitter. Same seed and input give the same output.
    pub random_seed: u64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            base_distance: 250.0,
            step_length: 50.0,
            max_iterations: 200,
            group_size: 6,
            angle_snap_threshold_degrees: 5.0,
            cycle_nudge_degrees: 45.0,
            two_neighbor_spread_degrees: 45.0,
            collapse_backoff_steps: 4,
            singleton_backoff_steps: 6,
            singleton_jitter_steps: 2.0,
            random_seed: 0,
        }
    }
}

impl LayoutOptions {
    pub fn validate(&self) -> Result<()> {
        positive("base_distance", self.base_distance)?;
        positive("step_length", self.step_length)?;
        if self.group_size == 0 {
            return Err(Error::InvalidOption {
                name: "group_size",
                reason: "must be at least 1".to_string(),
            });
        }
        non_negative("angle_snap_threshold_degrees", self.angle_snap_threshold_degrees)?;
        non_negative("cycle_nudge_degrees", self.cycle_nudge_degrees)?;
        non_negative("two_neighbor_spread_degrees", self.two_neighbor_spread_degrees)?;
        non_negative("singleton_jitter_steps", self.singleton_jitter_steps)?;
        Ok(())
    }
}

fn positive(name: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidOption {
            name,
            reason: format!("expected a finite positive number, got {v}"),
        })
    }
}

fn non_negative(name: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidOption {
            name,
            reason: format!("expected a finite non-negative number, got {v}"),
        })
    }
}

/// Places every connected component of `topology`, then arranges them around the origin.
pub fn layout(topology: &Topology, options: &LayoutOptions) -> Result<LayoutResult> {
    options.validate()?;

    let groups = topology.components()?;
    tracing::debug!(
        vertices = topology.len(),
        components = groups.len(),
        dropped_self_loops = topology.dropped_self_loops(),
        "starting layout"
    );

    let mut components = groups
        .iter()
        .map(|vertices| Component::place(topology, vertices, options))
        .collect::<Result<Vec<_>>>()?;
    arrange::arrange(&mut components, options);

    Ok(LayoutResult { components })
}
