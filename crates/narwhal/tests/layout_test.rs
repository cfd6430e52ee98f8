use narwhal::algo::placement::classify_neighbors;
use narwhal::{Edge, LayoutOptions, LinkMap, Topology, Vector2D, layout, layout_topology};
use std::collections::BTreeSet;

fn links(pairs: &[(i64, &[i64])]) -> LinkMap {
    pairs
        .iter()
        .map(|(k, vs)| (*k, vs.iter().copied().collect::<BTreeSet<_>>()))
        .collect()
}

fn edges_of(c: &narwhal::Component) -> Vec<(i64, i64)> {
    c.edges().iter().map(|e| (e.a, e.b)).collect()
}

#[test]
fn star_is_one_component_rooted_at_origin() {
    let result = layout(&links(&[(1, &[2, 3])]), &LayoutOptions::default()).expect("layout");
    assert_eq!(result.components.len(), 1);

    let c = &result.components[0];
    assert_eq!(c.len(), 3);
    assert_eq!(edges_of(c), vec![(1, 2), (1, 3)]);
    assert_eq!(c.root(), 1);
    assert_eq!(c.position(1), Some(Vector2D::ORIGIN));
    assert_eq!(c.center(), Vector2D::ORIGIN);
}

#[test]
fn two_disjoint_edges_end_up_side_by_side_without_overlap() {
    let result = layout(&links(&[(1, &[2]), (3, &[4])]), &LayoutOptions::default())
        .expect("layout");
    assert_eq!(result.components.len(), 2);
    for c in &result.components {
        assert_eq!(c.len(), 2);
        assert_eq!(c.edges().len(), 1);
    }
    assert!(result.overlapping_pairs().is_empty());

    let a = &result.components[0];
    let b = &result.components[1];
    assert!(!a.overlaps(b));
    // The second edge was pulled in and backed off four steps from the touching point.
    let gap = b.center().distance_to(a.center());
    assert!((gap - 450.0).abs() < 1e-6, "gap {gap}");
    // Recentered: the joint bounding box is centered on the origin.
    let bb = result.bounding_box().expect("non-empty");
    assert!(bb.center().length() < 1e-9, "{:?}", bb.center());
}

#[test]
fn triangle_closing_edge_is_a_cycle_edge() {
    let t = Topology::from_links(&links(&[(1, &[2]), (2, &[3]), (3, &[1])]));
    let ids: Vec<i64> = t.vertex_ids().collect();
    let parts = classify_neighbors(&t, &ids).expect("classify");
    assert!(parts[&3].cycle.contains(&1));

    let result = layout(&links(&[(1, &[2]), (2, &[3]), (3, &[1])]), &LayoutOptions::default())
        .expect("layout");
    assert_eq!(result.components.len(), 1);
    assert_eq!(result.components[0].root(), 1);
    assert_eq!(edges_of(&result.components[0]), vec![(1, 2), (1, 3), (2, 3)]);
}

#[test]
fn lone_vertex_stays_at_origin() {
    let result = layout(&links(&[(1, &[])]), &LayoutOptions::default()).expect("layout");
    assert_eq!(result.components.len(), 1);
    let c = &result.components[0];
    assert!(c.is_singleton());
    assert_eq!(c.radius(), 0.0);
    assert_eq!(c.center(), Vector2D::ORIGIN);
    assert!(c.edges().is_empty());
}

#[test]
fn lone_vertex_next_to_other_components_is_jittered() {
    let input = links(&[(1, &[]), (2, &[3])]);
    let opts = LayoutOptions::default();
    let result = layout(&input, &opts).expect("layout");
    let p = result.position(1).expect("vertex 1");

    // Ring at (250, 0); the edge is recentered to x in [-125, 125]; the vertex enters the box
    // after three steps (x = 100) and backs off six, to x = 400, before jitter.
    let bound = opts.singleton_jitter_steps * opts.step_length;
    let unjittered = Vector2D::new(400.0, 0.0);
    assert!((p.x - unjittered.x).abs() <= bound, "{p:?}");
    assert!((p.y - unjittered.y).abs() <= bound, "{p:?}");
    assert_ne!(p, unjittered);

    let again = layout(&input, &opts).expect("layout");
    assert_eq!(again.position(1), Some(p));

    let reseeded = layout(
        &input,
        &LayoutOptions {
            random_seed: 42,
            ..Default::default()
        },
    )
    .expect("layout");
    assert_ne!(reseeded.position(1), Some(p));
}

#[test]
fn targets_without_keys_and_duplicates_are_absorbed() {
    let result = layout(
        &links(&[(1, &[2, 9]), (2, &[1]), (9, &[1]), (5, &[5, 6])]),
        &LayoutOptions::default(),
    )
    .expect("layout");
    assert_eq!(result.vertex_count(), 5);
    assert!(result.position(6).is_some());

    let first = result.component_of(1).expect("component of 1");
    assert_eq!(edges_of(first), vec![(1, 2), (1, 9)]);
    let second = result.component_of(5).expect("component of 5");
    assert_eq!(second.edges().iter().copied().collect::<Vec<_>>(), vec![Edge::new(6, 5)]);
}

#[test]
fn empty_input_gives_empty_result() {
    let result = layout(&LinkMap::new(), &LayoutOptions::default()).expect("layout");
    assert!(result.components.is_empty());
    assert!(result.bounding_box().is_none());
}

#[test]
fn invalid_options_are_rejected_before_layout() {
    let err = layout(
        &links(&[(1, &[2])]),
        &LayoutOptions {
            step_length: -5.0,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("step_length"), "{err}");
}

#[test]
fn many_components_are_arranged_without_residual_overlap() {
    let mut input = LinkMap::new();
    // Eight small trees, two triangles and a few isolated vertices.
    for k in 0..8i64 {
        let root = 100 * k;
        input.entry(root).or_default().extend([root + 1, root + 2]);
        input.entry(root + 2).or_default().insert(root + 3);
    }
    for base in [1000i64, 2000] {
        input.entry(base).or_default().insert(base + 1);
        input.entry(base + 1).or_default().insert(base + 2);
        input.entry(base + 2).or_default().insert(base);
    }
    for lone in [5000i64, 5001, 5002] {
        input.entry(lone).or_default();
    }

    let result = layout(&input, &LayoutOptions::default()).expect("layout");
    assert_eq!(result.components.len(), 13);
    assert_eq!(result.vertex_count(), 8 * 4 + 2 * 3 + 3);
    assert!(
        result.overlapping_pairs().is_empty(),
        "{:?}",
        result.overlapping_pairs()
    );
}

#[test]
fn long_paths_and_rings_are_placed_without_deep_recursion() {
    let n = 50_000i64;
    let path = Topology::from_edges((0..n).map(|i| (i, i + 1)));
    let ring = Topology::from_edges((0..n).map(|i| (i, (i + 1) % n)));

    for (topology, vertices) in [(path, n as usize + 1), (ring, n as usize)] {
        let result = layout_topology(&topology, &LayoutOptions::default()).expect("layout");
        assert_eq!(result.components.len(), 1);
        let c = &result.components[0];
        assert_eq!(c.len(), vertices);
        assert_eq!(c.position(c.root()), Some(Vector2D::ORIGIN));
        assert!(c.positions().values().all(|p| p.is_finite()));
    }
}

#[test]
fn result_serializes_positions_and_edges() {
    let result = layout(&links(&[(1, &[2])]), &LayoutOptions::default()).expect("layout");
    let json = serde_json::to_value(&result).expect("json");
    let c = &json["components"][0];
    assert_eq!(c["root"], 1);
    assert_eq!(c["edges"][0]["a"], 1);
    assert_eq!(c["edges"][0]["b"], 2);
    assert_eq!(c["positions"]["1"]["x"], 0.0);
    assert_eq!(c["positions"]["2"]["x"], 250.0);
}
