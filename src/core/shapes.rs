use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, BoundingSphere};

/// Position and orientation of a body. Collision shapes are stored in
/// local space and positioned through one of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

/// Support-mapping capability: the farthest point of a convex volume along
/// a world-space direction. This is the only primitive GJK and EPA consume,
/// so any convex shape (including host-defined ones) plugs in by
/// implementing it.
pub trait Support {
    fn support(&self, direction: Vec3) -> Vec3;
}

/// Closures work as ad-hoc support functions for custom convex volumes.
impl<F> Support for F
where
    F: Fn(Vec3) -> Vec3,
{
    fn support(&self, direction: Vec3) -> Vec3 {
        self(direction)
    }
}

/// Supported convex collider geometries, stored in local space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConvexShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    Capsule { radius: f32, half_height: f32 },
    Hull { vertices: Vec<Vec3> },
}

impl ConvexShape {
    /// Farthest local-space point along a local-space direction.
    pub fn local_support(&self, direction: Vec3) -> Vec3 {
        match self {
            ConvexShape::Sphere { radius } => direction.normalize_or_zero() * *radius,
            ConvexShape::Box { half_extents } => Vec3::new(
                half_extents.x.copysign(direction.x),
                half_extents.y.copysign(direction.y),
                half_extents.z.copysign(direction.z),
            ),
            ConvexShape::Capsule {
                radius,
                half_height,
            } => {
                let mut point = direction.normalize_or_zero() * *radius;
                point.y += half_height.copysign(direction.y);
                point
            }
            ConvexShape::Hull { vertices } => {
                let mut best_point = Vec3::ZERO;
                let mut best_dot = f32::MIN;
                for v in vertices {
                    let dot = v.dot(direction);
                    if dot > best_dot {
                        best_dot = dot;
                        best_point = *v;
                    }
                }
                best_point
            }
        }
    }

    /// World-space AABB derived from six axis supports. Recomputed once per
    /// step per body; never cached.
    pub fn aabb(&self, transform: &Transform) -> Aabb {
        let positioned = PositionedShape {
            shape: self,
            transform,
        };
        let max = Vec3::new(
            positioned.support(Vec3::X).x,
            positioned.support(Vec3::Y).y,
            positioned.support(Vec3::Z).z,
        );
        let min = Vec3::new(
            positioned.support(Vec3::NEG_X).x,
            positioned.support(Vec3::NEG_Y).y,
            positioned.support(Vec3::NEG_Z).z,
        );
        Aabb::new(min, max)
    }

    pub fn bounding_radius(&self) -> f32 {
        match self {
            ConvexShape::Sphere { radius } => *radius,
            ConvexShape::Box { half_extents } => half_extents.length(),
            ConvexShape::Capsule {
                radius,
                half_height,
            } => radius + half_height,
            ConvexShape::Hull { vertices } => {
                vertices.iter().map(|v| v.length()).fold(0.0, f32::max)
            }
        }
    }

    pub fn bounding_sphere(&self, transform: &Transform) -> BoundingSphere {
        BoundingSphere::new(transform.position, self.bounding_radius())
    }
}

/// A shape placed in the world; the `Support` view GJK/EPA operate on.
#[derive(Debug, Clone, Copy)]
pub struct PositionedShape<'a> {
    pub shape: &'a ConvexShape,
    pub transform: &'a Transform,
}

impl Support for PositionedShape<'_> {
    fn support(&self, direction: Vec3) -> Vec3 {
        let local_dir = self.transform.rotation.conjugate() * direction;
        let local = self.shape.local_support(local_dir);
        self.transform.position + self.transform.rotation * local
    }
}
