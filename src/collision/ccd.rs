//! Continuous collision queries: time-of-impact for a swept AABB and for a
//! point segment, both against a static AABB. Pure functions returning the
//! fraction of motion at first touch; callers clamp their own motion and
//! re-resolve velocity.

use glam::Vec3;

use crate::{config::GEOMETRIC_EPSILON, core::aabb::Aabb};

/// Fraction `t` in `[0, 1]` of `displacement` at which `moving` first
/// touches `target`, or `None` when the sweep misses. Boxes already
/// overlapping at the start report `Some(0.0)`.
pub fn swept_aabb_toi(moving: &Aabb, displacement: Vec3, target: &Aabb) -> Option<f32> {
    let mut t_enter = 0.0f32;
    let mut t_exit = 1.0f32;

    for i in 0..3 {
        let v = displacement[i];
        let gap_entry = target.min[i] - moving.max[i];
        let gap_exit = target.max[i] - moving.min[i];

        if v.abs() < GEOMETRIC_EPSILON {
            // No motion on this axis: intervals must already overlap.
            if gap_entry > 0.0 || gap_exit < 0.0 {
                return None;
            }
            continue;
        }

        let inv_v = 1.0 / v;
        let mut entry = gap_entry * inv_v;
        let mut exit = gap_exit * inv_v;
        if entry > exit {
            std::mem::swap(&mut entry, &mut exit);
        }

        t_enter = t_enter.max(entry);
        t_exit = t_exit.min(exit);
        if t_enter > t_exit {
            return None;
        }
    }

    (t_enter <= 1.0 && t_exit >= 0.0).then_some(t_enter.max(0.0))
}

/// First fraction along the segment `start -> end` at which it enters
/// `target` (optionally padded outward by `padding`), via slab clipping.
/// A start point already inside reports `Some(0.0)`.
pub fn segment_aabb_toi(start: Vec3, end: Vec3, target: &Aabb, padding: f32) -> Option<f32> {
    let target = target.expanded(padding);
    let delta = end - start;

    let mut t_enter = 0.0f32;
    let mut t_exit = 1.0f32;

    for i in 0..3 {
        let d = delta[i];
        if d.abs() < GEOMETRIC_EPSILON {
            if start[i] < target.min[i] || start[i] > target.max[i] {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / d;
        let mut t1 = (target.min[i] - start[i]) * inv_d;
        let mut t2 = (target.max[i] - start[i]) * inv_d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_enter = t_enter.max(t1);
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}
