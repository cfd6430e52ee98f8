//! Inclusive segment-intersection test.
//!
//! Touching endpoints and collinear overlaps count as intersections; only a clean separation
//! reports `false`.

use super::Vector2D;

/// Rotation of `p0 -> p1 -> p2`: `1` counter-clockwise, `-1` clockwise.
///
/// Collinear triples are disambiguated by position along the line: `0` is returned only when
/// `p2` lies on the closed segment `p0..p1`.
pub fn orientation(p0: Vector2D, p1: Vector2D, p2: Vector2D) -> i8 {
    let dx1 = p1.x - p0.x;
    let dy1 = p1.y - p0.y;
    let dx2 = p2.x - p0.x;
    let dy2 = p2.y - p0.y;

    let lhs = dx1 * dy2;
    let rhs = dy1 * dx2;
    if lhs > rhs {
        return 1;
    }
    if lhs < rhs {
        return -1;
    }
    // p2 behind p0.
    if dx1 * dx2 < 0.0 || dy1 * dy2 < 0.0 {
        return -1;
    }
    // p2 beyond p1.
    if dx1 * dx1 + dy1 * dy1 < dx2 * dx2 + dy2 * dy2 {
        return 1;
    }
    0
}

/// Whether the closed segments `a0..a1` and `b0..b1` share at least one point.
pub fn segments_intersect(a0: Vector2D, a1: Vector2D, b0: Vector2D, b1: Vector2D) -> bool {
    let ab0 = i16::from(orientation(a0, a1, b0));
    let ab1 = i16::from(orientation(a0, a1, b1));
    let ba0 = i16::from(orientation(b0, b1, a0));
    let ba1 = i16::from(orientation(b0, b1, a1));
    ab0 * ab1 <= 0 && ba0 * ba1 <= 0
}
