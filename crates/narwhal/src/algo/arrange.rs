//! Multi-component arrangement.
//!
//! Components are first spread on concentric hexagonal rings sized by their radii, then pulled
//! toward the origin one at a time until they touch something already settled. Single vertices
//! have no edges to collide with, so they stop at the bounding box of the multi-vertex
//! components instead and get a small seeded jitter.

use super::LayoutOptions;
use super::rng::XorShift64Star;
use crate::component::Component;
use crate::geom::{BoundingBox, Vector2D};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollapseOutcome {
    pub steps: usize,
    /// `false` when the step budget ran out before anything blocked the component.
    pub blocked: bool,
}

/// Runs ring placement, collapse, recentering and single-vertex collapse in order.
///
/// A lone component is left untouched at the origin.
pub fn arrange(components: &mut [Component], options: &LayoutOptions) {
    if components.len() < 2 {
        return;
    }
    ring_placement(components, options);

    let multi = collapse_components(components, options);
    recenter(components, &multi);

    let settled = BoundingBox::from_points(
        multi
            .iter()
            .flat_map(|&i| components[i].positions().values().copied()),
    );
    collapse_singletons(components, settled, options);
}

/// Indices ordered by descending radius, ties by lowest vertex id.
fn by_descending_radius(components: &[Component]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..components.len()).collect();
    order.sort_by(|&a, &b| {
        components[b]
            .radius()
            .total_cmp(&components[a].radius())
            .then(components[a].min_vertex_id().cmp(&components[b].min_vertex_id()))
    });
    order
}

/// Indices ordered by ascending center distance from the origin, ties by lowest vertex id.
fn by_ascending_distance(components: &[Component], indices: &[usize]) -> Vec<usize> {
    let mut order = indices.to_vec();
    order.sort_by(|&a, &b| {
        components[a]
            .center()
            .length()
            .total_cmp(&components[b].center().length())
            .then(components[a].min_vertex_id().cmp(&components[b].min_vertex_id()))
    });
    order
}

/// Largest component at the origin; the rest in rings of `group_size`, each ring as far out as
/// the previous ring plus twice its own largest radius.
pub fn ring_placement(components: &mut [Component], options: &LayoutOptions) {
    let order = by_descending_radius(components);
    let Some((&largest, rest)) = order.split_first() else {
        return;
    };
    components[largest].move_center_to(Vector2D::ORIGIN);

    let spacing = 360.0 / options.group_size as f64;
    let mut running = components[largest].radius();
    for group in rest.chunks(options.group_size) {
        let group_radius = group
            .iter()
            .map(|&i| components[i].radius())
            .fold(0.0, f64::max);
        running += group_radius;
        for (k, &i) in group.iter().enumerate() {
            components[i].move_center_to(Vector2D::by_polar(k as f64 * spacing, running));
        }
        running += group_radius;
    }
}

/// Steps component `idx` toward the origin until `blocked` reports a collision or the budget
/// runs out. A blocked component retreats `backoff_steps` full steps.
///
/// The final step is shortened so the center lands exactly on the origin instead of
/// oscillating around it; a component centered on the origin cannot move any closer.
pub fn collapse_toward_origin<F>(
    components: &mut [Component],
    idx: usize,
    options: &LayoutOptions,
    backoff_steps: usize,
    mut blocked: F,
) -> CollapseOutcome
where
    F: FnMut(&[Component], usize) -> bool,
{
    for step in 1..=options.max_iterations {
        let center = components[idx].center();
        let distance = center.length();
        if distance == 0.0 {
            return CollapseOutcome {
                steps: step - 1,
                blocked: false,
            };
        }
        // Unit vector; computed without trigonometry so axis-aligned moves stay exact.
        let toward = Vector2D::new(-center.x / distance, -center.y / distance);
        components[idx].translate(toward * options.step_length.min(distance));
        if blocked(components, idx) {
            components[idx].translate(toward * (-options.step_length * backoff_steps as f64));
            return CollapseOutcome {
                steps: step,
                blocked: true,
            };
        }
    }
    CollapseOutcome {
        steps: options.max_iterations,
        blocked: false,
    }
}

/// Collapses multi-vertex components against each other; returns their indices in settling
/// order.
pub fn collapse_components(components: &mut [Component], options: &LayoutOptions) -> Vec<usize> {
    let multi: Vec<usize> = (0..components.len())
        .filter(|&i| !components[i].is_singleton())
        .collect();
    let order = by_ascending_distance(components, &multi);

    let mut settled: Vec<usize> = Vec::with_capacity(order.len());
    for &idx in &order {
        if settled.is_empty() {
            settled.push(idx);
            continue;
        }
        let outcome = collapse_toward_origin(
            components,
            idx,
            options,
            options.collapse_backoff_steps,
            |comps, i| settled.iter().any(|&s| comps[s].overlaps(&comps[i])),
        );
        log_outcome(&components[idx], outcome);
        settled.push(idx);
    }
    settled
}

/// Moves the given components so the center of their joint bounding box is the origin.
pub fn recenter(components: &mut [Component], indices: &[usize]) {
    let Some(bb) = BoundingBox::from_points(
        indices
            .iter()
            .flat_map(|&i| components[i].positions().values().copied()),
    ) else {
        return;
    };
    let shift = -bb.center();
    for &i in indices {
        components[i].translate(shift);
    }
}

/// Pulls single vertices in until they enter `settled`, then jitters every one of them.
///
/// Without any multi-vertex component there is nothing to stop against, so single vertices keep
/// their ring positions.
pub fn collapse_singletons(
    components: &mut [Component],
    settled: Option<BoundingBox>,
    options: &LayoutOptions,
) {
    let singles: Vec<usize> = (0..components.len())
        .filter(|&i| components[i].is_singleton())
        .collect();
    if singles.is_empty() {
        return;
    }
    let order = by_ascending_distance(components, &singles);

    if let Some(bb) = settled {
        for &idx in &order {
            let outcome = collapse_toward_origin(
                components,
                idx,
                options,
                options.singleton_backoff_steps,
                |comps, i| bb.contains(comps[i].center()),
            );
            log_outcome(&components[idx], outcome);
        }
    }

    let mut rng = XorShift64Star::new(options.random_seed);
    let bound = options.singleton_jitter_steps * options.step_length;
    for &idx in &order {
        let jitter = Vector2D::new(rng.next_f64_signed() * bound, rng.next_f64_signed() * bound);
        components[idx].translate(jitter);
    }
}

fn log_outcome(component: &Component, outcome: CollapseOutcome) {
    if outcome.blocked {
        tracing::trace!(
            root = component.root(),
            steps = outcome.steps,
            "component collapsed"
        );
    } else {
        tracing::debug!(
            root = component.root(),
            steps = outcome.steps,
            "collapse budget exhausted; placement may still overlap"
        );
    }
}
