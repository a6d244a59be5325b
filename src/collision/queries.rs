//! Closed-form intersection and distance tests for primitive pairs. These
//! are O(1) and preferred over GJK whenever both shapes are primitives.

use glam::Vec3;

use crate::core::aabb::{Aabb, BoundingSphere};

pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> bool {
    a.overlaps(b)
}

pub fn sphere_sphere(a: &BoundingSphere, b: &BoundingSphere) -> bool {
    a.overlaps(b)
}

pub fn sphere_aabb(sphere: &BoundingSphere, aabb: &Aabb) -> bool {
    let closest = aabb.clamp_point(sphere.center);
    closest.distance_squared(sphere.center) <= sphere.radius * sphere.radius
}

/// Hit from a ray-AABB slab test.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Distance along the (normalized) ray direction at which it enters the
    /// box. Zero when the origin starts inside.
    pub distance: f32,
    pub point: Vec3,
    /// Outward face normal of the entered face; zero for inside-origin hits.
    pub normal: Vec3,
}

/// Slab-method ray cast against an AABB, limited to `max_distance`.
pub fn ray_aabb(origin: Vec3, direction: Vec3, aabb: &Aabb, max_distance: f32) -> Option<RayHit> {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return None;
    }

    let mut t_min = 0.0f32;
    let mut t_max = max_distance;
    let mut normal = Vec3::ZERO;

    for i in 0..3 {
        let origin_component = origin[i];
        let dir_component = dir[i];
        let min = aabb.min[i];
        let max = aabb.max[i];

        if dir_component.abs() < crate::config::GEOMETRIC_EPSILON {
            // Parallel to the slab: must already be inside it.
            if origin_component < min || origin_component > max {
                return None;
            }
        } else {
            let inv_dir = 1.0 / dir_component;
            let mut t1 = (min - origin_component) * inv_dir;
            let mut t2 = (max - origin_component) * inv_dir;
            let mut axis_normal = Vec3::ZERO;
            axis_normal[i] = -dir_component.signum();

            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
                axis_normal = -axis_normal;
            }

            if t1 > t_min {
                t_min = t1;
                normal = axis_normal;
            }

            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some(RayHit {
        distance: t_min,
        point: origin + dir * t_min,
        normal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_sphere_touching_counts_as_hit() {
        let a = BoundingSphere::new(Vec3::ZERO, 1.0);
        let b = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(sphere_sphere(&a, &b));
        assert!(sphere_sphere(&b, &a));
    }

    #[test]
    fn sphere_sphere_separated() {
        let a = BoundingSphere::new(Vec3::ZERO, 1.0);
        let b = BoundingSphere::new(Vec3::new(2.1, 0.0, 0.0), 1.0);
        assert!(!sphere_sphere(&a, &b));
    }

    #[test]
    fn sphere_aabb_corner_case() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        // Sphere near the (1,1,1) corner, just inside reach.
        let near = BoundingSphere::new(Vec3::splat(1.5), 0.9);
        let far = BoundingSphere::new(Vec3::splat(1.5), 0.8);
        assert!(sphere_aabb(&near, &aabb));
        assert!(!sphere_aabb(&far, &aabb));
    }

    #[test]
    fn sphere_center_inside_aabb_hits() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let sphere = BoundingSphere::new(Vec3::new(0.2, 0.3, -0.1), 0.01);
        assert!(sphere_aabb(&sphere, &aabb));
    }

    #[test]
    fn ray_hits_front_face() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        let hit = ray_aabb(Vec3::ZERO, Vec3::X, &aabb, 100.0).expect("ray should hit");
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-5);
        assert_eq!(hit.normal, Vec3::NEG_X);
    }

    #[test]
    fn ray_misses_offset_box() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(5.0, 3.0, 0.0), Vec3::ONE);
        assert!(ray_aabb(Vec3::ZERO, Vec3::X, &aabb, 100.0).is_none());
    }

    #[test]
    fn ray_respects_max_distance() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        assert!(ray_aabb(Vec3::ZERO, Vec3::X, &aabb, 3.0).is_none());
    }

    #[test]
    fn ray_from_inside_reports_zero_distance() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let hit = ray_aabb(Vec3::ZERO, Vec3::X, &aabb, 10.0).expect("inside origin hits");
        assert_eq!(hit.distance, 0.0);
    }
}
