use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box. `min <= max` holds per axis; zero-extent
/// boxes are valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Builds a box from two arbitrary corners, normalizing so the
    /// per-axis invariant holds regardless of argument order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let he = half_extents.abs();
        Self {
            min: center - he,
            max: center + he,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Interval overlap on all three axes. Touching boxes count as
    /// overlapping.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Returns the box grown by `padding` on every side.
    pub fn expanded(&self, padding: f32) -> Self {
        let pad = Vec3::splat(padding.max(0.0));
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Closest point inside the box to `point` (the point itself when
    /// already inside).
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }
}

/// Bounding sphere with a non-negative radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn overlaps(&self, other: &BoundingSphere) -> bool {
        let combined = self.radius + other.radius;
        self.center.distance_squared(other.center) <= combined * combined
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_swapped_corners() {
        let aabb = Aabb::new(Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0));
        assert!(aabb.min.x <= aabb.max.x);
        assert!(aabb.min.y <= aabb.max.y);
        assert!(aabb.min.z <= aabb.max.z);
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_center_half_extents(Vec3::new(1.5, 0.0, 0.0), Vec3::ONE);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn degenerate_box_still_overlaps_itself() {
        let point_box = Aabb::new(Vec3::ONE, Vec3::ONE);
        assert!(point_box.overlaps(&point_box));
        assert!(point_box.contains_point(Vec3::ONE));
    }

    #[test]
    fn separated_boxes_do_not_overlap() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_center_half_extents(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn bounding_sphere_clamps_negative_radius() {
        let sphere = BoundingSphere::new(Vec3::ZERO, -2.0);
        assert_eq!(sphere.radius, 0.0);
    }
}
