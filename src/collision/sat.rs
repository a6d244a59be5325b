//! Separating-axis test for 2D convex polygons with minimum-translation
//! vector extraction. Axis order is fixed (A's edges, then B's) so
//! tie-breaking between equal-overlap axes is reproducible.

use glam::Vec2;

use crate::{config::GEOMETRIC_EPSILON, core::polygon::ConvexPolygon};

/// Minimum translation vector for an overlapping polygon pair. Translating
/// the second polygon by `normal * depth` separates the pair.
#[derive(Debug, Clone, Copy)]
pub struct Mtv {
    /// Unit direction pointing from the first polygon toward the second.
    pub normal: Vec2,
    pub depth: f32,
}

/// Tests every edge-normal axis of both polygons; returns `None` on the
/// first axis with zero or negative overlap, otherwise the minimum-overlap
/// axis as the MTV.
pub fn polygon_polygon(a: &ConvexPolygon, b: &ConvexPolygon) -> Option<Mtv> {
    let mut min_overlap = f32::MAX;
    let mut min_axis = Vec2::ZERO;

    for axis in a.edge_normals().chain(b.edge_normals()) {
        let (min_a, max_a) = a.project(axis);
        let (min_b, max_b) = b.project(axis);

        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return None;
        }

        if overlap < min_overlap {
            min_overlap = overlap;
            min_axis = axis;
        }
    }

    if min_axis.length_squared() < GEOMETRIC_EPSILON {
        // All axes degenerate; report separation rather than inventing one.
        return None;
    }

    // Orient so the normal pushes B away from A.
    let delta = b.centroid() - a.centroid();
    let normal = if delta.dot(min_axis) < 0.0 {
        -min_axis
    } else {
        min_axis
    };

    Some(Mtv {
        normal,
        depth: min_overlap,
    })
}
