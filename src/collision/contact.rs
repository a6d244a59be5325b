//! Contact generation: turns an intersecting shape pair into a manifold
//! (unit normal from the first body to the second, non-negative depth,
//! 1-4 world-space contact points). Primitive pairs use closed-form math;
//! box-box pairs use SAT plus face clipping; everything else goes through
//! GJK/EPA.

use glam::Vec3;

use crate::{
    config::GEOMETRIC_EPSILON,
    core::shapes::{ConvexShape, PositionedShape, Support, Transform},
};

use super::gjk::{self, GjkResult};

const MAX_MANIFOLD_POINTS: usize = 4;
const CLIP_EPSILON: f32 = 1e-4;

/// Contact geometry for one overlapping pair.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    /// Unit normal pointing from the first body toward the second.
    pub normal: Vec3,
    pub depth: f32,
    /// World-space contact points; at least one for genuine overlap.
    pub points: Vec<Vec3>,
}

impl ContactManifold {
    fn single(normal: Vec3, depth: f32, point: Vec3) -> Self {
        Self {
            normal,
            depth,
            points: vec![point],
        }
    }

    /// Same contact seen from the other body.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
            points: self.points.clone(),
        }
    }
}

/// Computes the manifold for two positioned convex shapes, or `None` when
/// they are separated (or a degenerate case fails closed).
pub fn generate_manifold(
    shape_a: &ConvexShape,
    transform_a: &Transform,
    shape_b: &ConvexShape,
    transform_b: &Transform,
) -> Option<ContactManifold> {
    match (shape_a, shape_b) {
        (ConvexShape::Sphere { radius: ra }, ConvexShape::Sphere { radius: rb }) => {
            sphere_sphere_manifold(transform_a.position, *ra, transform_b.position, *rb)
        }
        (ConvexShape::Sphere { radius }, ConvexShape::Box { half_extents }) => {
            sphere_box_manifold(transform_a.position, *radius, *half_extents, transform_b)
                .map(|m| m.flipped())
        }
        (ConvexShape::Box { half_extents }, ConvexShape::Sphere { radius }) => {
            sphere_box_manifold(transform_b.position, *radius, *half_extents, transform_a)
        }
        (ConvexShape::Box { half_extents: ha }, ConvexShape::Box { half_extents: hb }) => {
            box_box_manifold(*ha, transform_a, *hb, transform_b)
        }
        _ => convex_convex_manifold(shape_a, transform_a, shape_b, transform_b),
    }
}

fn sphere_sphere_manifold(
    center_a: Vec3,
    radius_a: f32,
    center_b: Vec3,
    radius_b: f32,
) -> Option<ContactManifold> {
    let delta = center_b - center_a;
    let combined = radius_a + radius_b;
    let dist_sq = delta.length_squared();
    if dist_sq > combined * combined {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist < GEOMETRIC_EPSILON {
        // Concentric spheres have no meaningful axis; pick one.
        Vec3::X
    } else {
        delta / dist
    };
    let depth = combined - dist;
    let point = center_a + normal * (radius_a - depth * 0.5);
    Some(ContactManifold::single(normal, depth, point))
}

/// Normal points from the box toward the sphere.
fn sphere_box_manifold(
    sphere_center: Vec3,
    radius: f32,
    half_extents: Vec3,
    box_transform: &Transform,
) -> Option<ContactManifold> {
    let local_center =
        box_transform.rotation.conjugate() * (sphere_center - box_transform.position);
    let clamped = local_center.clamp(-half_extents, half_extents);
    let offset = local_center - clamped;
    let dist_sq = offset.length_squared();

    if dist_sq > GEOMETRIC_EPSILON {
        // Sphere center outside the box.
        let dist = dist_sq.sqrt();
        if dist > radius {
            return None;
        }
        let local_normal = offset / dist;
        let normal = box_transform.rotation * local_normal;
        let point = box_transform.position + box_transform.rotation * clamped;
        return Some(ContactManifold::single(normal, radius - dist, point));
    }

    // Center inside the box: push out through the nearest face.
    let face_depths = half_extents - local_center.abs();
    let (axis, face_depth) = if face_depths.x <= face_depths.y && face_depths.x <= face_depths.z {
        (0, face_depths.x)
    } else if face_depths.y <= face_depths.z {
        (1, face_depths.y)
    } else {
        (2, face_depths.z)
    };

    let mut local_normal = Vec3::ZERO;
    local_normal[axis] = 1.0f32.copysign(local_center[axis]);
    let mut surface = local_center;
    surface[axis] = half_extents[axis].copysign(local_center[axis]);

    let normal = box_transform.rotation * local_normal;
    let point = box_transform.position + box_transform.rotation * surface;
    Some(ContactManifold::single(normal, radius + face_depth, point))
}

/// SAT over the 15 candidate axes of two oriented boxes, then clipping the
/// incident face against the reference face for a multi-point manifold.
fn box_box_manifold(
    half_extents_a: Vec3,
    transform_a: &Transform,
    half_extents_b: Vec3,
    transform_b: &Transform,
) -> Option<ContactManifold> {
    let relative = transform_b.position - transform_a.position;

    let axes_a = [
        transform_a.rotation * Vec3::X,
        transform_a.rotation * Vec3::Y,
        transform_a.rotation * Vec3::Z,
    ];
    let axes_b = [
        transform_b.rotation * Vec3::X,
        transform_b.rotation * Vec3::Y,
        transform_b.rotation * Vec3::Z,
    ];

    let mut test_axes = Vec::with_capacity(15);
    test_axes.extend_from_slice(&axes_a);
    test_axes.extend_from_slice(&axes_b);
    for axis_a in &axes_a {
        for axis_b in &axes_b {
            let axis = axis_a.cross(*axis_b);
            if axis.length_squared() > GEOMETRIC_EPSILON {
                test_axes.push(axis.normalize());
            }
        }
    }

    let mut min_overlap = f32::MAX;
    let mut min_axis = Vec3::ZERO;

    for axis in test_axes {
        let extent_a = axes_a[0].dot(axis).abs() * half_extents_a.x
            + axes_a[1].dot(axis).abs() * half_extents_a.y
            + axes_a[2].dot(axis).abs() * half_extents_a.z;
        let extent_b = axes_b[0].dot(axis).abs() * half_extents_b.x
            + axes_b[1].dot(axis).abs() * half_extents_b.y
            + axes_b[2].dot(axis).abs() * half_extents_b.z;

        let projection = relative.dot(axis);
        let overlap = (extent_a + extent_b) - projection.abs();
        if overlap <= 0.0 {
            return None;
        }

        if overlap < min_overlap {
            min_overlap = overlap;
            min_axis = if projection < 0.0 { -axis } else { axis };
        }
    }

    let normal = min_axis.normalize_or_zero();
    if normal == Vec3::ZERO {
        return None;
    }

    let points = clip_box_faces(
        half_extents_a,
        transform_a,
        &axes_a,
        half_extents_b,
        transform_b,
        &axes_b,
        normal,
    );

    if points.is_empty() {
        // Edge-edge style contact where clipping degenerates: fall back to
        // a single supported point.
        let shape_a = ConvexShape::Box {
            half_extents: half_extents_a,
        };
        let support = PositionedShape {
            shape: &shape_a,
            transform: transform_a,
        }
        .support(normal);
        return Some(ContactManifold::single(
            normal,
            min_overlap,
            support - normal * (min_overlap * 0.5),
        ));
    }

    Some(ContactManifold {
        normal,
        depth: min_overlap,
        points,
    })
}

struct Plane {
    normal: Vec3,
    distance: f32,
}

impl Plane {
    fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalize_or_zero();
        Self {
            normal: n,
            distance: n.dot(point),
        }
    }

    fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// Face of an oriented box most aligned with `direction`: returns the four
/// corners plus the face plane data (center, outward normal, tangents and
/// their half extents).
struct BoxFace {
    corners: [Vec3; 4],
    center: Vec3,
    normal: Vec3,
    tangent_u: Vec3,
    tangent_v: Vec3,
    half_u: f32,
    half_v: f32,
}

fn box_face(
    half_extents: Vec3,
    transform: &Transform,
    axes: &[Vec3; 3],
    direction: Vec3,
) -> BoxFace {
    let dots = [
        axes[0].dot(direction),
        axes[1].dot(direction),
        axes[2].dot(direction),
    ];
    let mut face_axis = 0;
    for i in 1..3 {
        if dots[i].abs() > dots[face_axis].abs() {
            face_axis = i;
        }
    }
    let sign = 1.0f32.copysign(dots[face_axis]);
    let u = (face_axis + 1) % 3;
    let v = (face_axis + 2) % 3;

    let normal = axes[face_axis] * sign;
    let center = transform.position + normal * half_extents[face_axis];
    let tu = axes[u] * half_extents[u];
    let tv = axes[v] * half_extents[v];

    BoxFace {
        corners: [
            center + tu + tv,
            center - tu + tv,
            center - tu - tv,
            center + tu - tv,
        ],
        center,
        normal,
        tangent_u: axes[u],
        tangent_v: axes[v],
        half_u: half_extents[u],
        half_v: half_extents[v],
    }
}

fn clip_box_faces(
    half_extents_a: Vec3,
    transform_a: &Transform,
    axes_a: &[Vec3; 3],
    half_extents_b: Vec3,
    transform_b: &Transform,
    axes_b: &[Vec3; 3],
    normal: Vec3,
) -> Vec<Vec3> {
    // Reference face on A faces along the normal; incident face on B faces
    // against it.
    let reference = box_face(half_extents_a, transform_a, axes_a, normal);
    let incident = box_face(half_extents_b, transform_b, axes_b, -normal);

    let side_planes = [
        Plane::from_point_normal(
            reference.center + reference.tangent_u * reference.half_u,
            reference.tangent_u,
        ),
        Plane::from_point_normal(
            reference.center - reference.tangent_u * reference.half_u,
            -reference.tangent_u,
        ),
        Plane::from_point_normal(
            reference.center + reference.tangent_v * reference.half_v,
            reference.tangent_v,
        ),
        Plane::from_point_normal(
            reference.center - reference.tangent_v * reference.half_v,
            -reference.tangent_v,
        ),
    ];

    let mut polygon = incident.corners.to_vec();
    for plane in &side_planes {
        polygon = clip_against_plane(&polygon, plane);
        if polygon.is_empty() {
            break;
        }
    }

    // Keep points at or below the reference face, i.e. actually penetrating.
    let face_plane = Plane::from_point_normal(reference.center, reference.normal);
    let mut points: Vec<(f32, Vec3)> = polygon
        .into_iter()
        .filter_map(|p| {
            let separation = face_plane.signed_distance(p);
            (separation <= CLIP_EPSILON).then_some((separation, p))
        })
        .collect();

    if points.len() > MAX_MANIFOLD_POINTS {
        // Deepest points win when the clip produces more than fit.
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        points.truncate(MAX_MANIFOLD_POINTS);
    }

    points.into_iter().map(|(_, p)| p).collect()
}

fn clip_against_plane(vertices: &[Vec3], plane: &Plane) -> Vec<Vec3> {
    if vertices.is_empty() {
        return Vec::new();
    }

    let mut clipped = Vec::new();
    for i in 0..vertices.len() {
        let current = vertices[i];
        let next = vertices[(i + 1) % vertices.len()];

        let current_dist = plane.signed_distance(current);
        let next_dist = plane.signed_distance(next);
        let current_inside = current_dist <= CLIP_EPSILON;
        let next_inside = next_dist <= CLIP_EPSILON;

        if current_inside && next_inside {
            clipped.push(next);
        } else if current_inside != next_inside {
            let denom = current_dist - next_dist;
            if denom.abs() > CLIP_EPSILON {
                let t = current_dist / denom;
                clipped.push(current + (next - current) * t);
            }
            if next_inside {
                clipped.push(next);
            }
        }
    }

    clipped
}

fn convex_convex_manifold(
    shape_a: &ConvexShape,
    transform_a: &Transform,
    shape_b: &ConvexShape,
    transform_b: &Transform,
) -> Option<ContactManifold> {
    let a = PositionedShape {
        shape: shape_a,
        transform: transform_a,
    };
    let b = PositionedShape {
        shape: shape_b,
        transform: transform_b,
    };

    let initial = transform_b.position - transform_a.position;
    let GjkResult::Intersection(simplex) = gjk::gjk(&a, &b, initial) else {
        return None;
    };

    let penetration = gjk::epa(&simplex, &a, &b)?;
    let mut normal = penetration.normal;

    // Keep the first-to-second convention when EPA's face normal came out
    // facing the wrong way (possible for deep, near-symmetric overlap).
    if initial.length_squared() > GEOMETRIC_EPSILON && normal.dot(initial) < 0.0 {
        normal = -normal;
    }

    let point = a.support(normal) - normal * (penetration.depth * 0.5);
    Some(ContactManifold::single(normal, penetration.depth, point))
}
