//! GJK intersection/distance query over arbitrary convex supports, with EPA
//! penetration-depth extraction on overlap. Both are bounded iterative
//! loops; hitting a cap fails closed (reported as separation / no manifold)
//! so pathological inputs can never hang a step.

use glam::Vec3;

use crate::{
    config::{EPA_MAX_ITERATIONS, GEOMETRIC_EPSILON, GJK_MAX_ITERATIONS},
    core::shapes::Support,
};

/// A vertex of the Minkowski difference together with the support points on
/// both shapes that produced it. Keeping the originals lets separation
/// queries report witness points.
#[derive(Debug, Clone, Copy)]
pub struct SupportPoint {
    pub minkowski: Vec3,
    pub on_a: Vec3,
    pub on_b: Vec3,
}

fn minkowski_support(a: &impl Support, b: &impl Support, direction: Vec3) -> SupportPoint {
    let on_a = a.support(direction);
    let on_b = b.support(-direction);
    SupportPoint {
        minkowski: on_a - on_b,
        on_a,
        on_b,
    }
}

/// Simplex built by GJK; a full tetrahedron when intersection is confirmed.
#[derive(Debug, Clone)]
pub struct Simplex {
    points: Vec<SupportPoint>,
}

impl Simplex {
    pub fn points(&self) -> &[SupportPoint] {
        &self.points
    }
}

/// Closest-point information for a separated pair.
#[derive(Debug, Clone, Copy)]
pub struct SeparationWitness {
    pub distance: f32,
    pub point_a: Vec3,
    pub point_b: Vec3,
}

#[derive(Debug, Clone)]
pub enum GjkResult {
    /// The shapes overlap; the enclosed simplex seeds EPA.
    Intersection(Simplex),
    Separated(SeparationWitness),
}

impl GjkResult {
    pub fn is_intersection(&self) -> bool {
        matches!(self, GjkResult::Intersection(_))
    }
}

/// Runs GJK on two convex supports. `initial_direction` is a search hint,
/// typically the center-to-center vector; anything near zero falls back to
/// +X.
pub fn gjk(a: &impl Support, b: &impl Support, initial_direction: Vec3) -> GjkResult {
    let mut direction = initial_direction;
    if direction.length_squared() < GEOMETRIC_EPSILON {
        direction = Vec3::X;
    }

    let mut simplex: Vec<SupportPoint> = Vec::with_capacity(4);

    for _ in 0..GJK_MAX_ITERATIONS {
        let point = minkowski_support(a, b, direction);
        if point.minkowski.dot(direction) < 0.0 {
            // No support point past the origin in this direction: the
            // Minkowski difference cannot contain it.
            simplex.push(point);
            return GjkResult::Separated(closest_witness(&simplex));
        }

        simplex.push(point);
        if refine_simplex(&mut simplex, &mut direction) {
            return GjkResult::Intersection(Simplex { points: simplex });
        }
    }

    log::debug!("gjk iteration cap reached; failing closed as separated");
    GjkResult::Separated(closest_witness(&simplex))
}

/// Convenience boolean query.
pub fn intersects(a: &impl Support, b: &impl Support, initial_direction: Vec3) -> bool {
    gjk(a, b, initial_direction).is_intersection()
}

/// Advances the simplex toward the origin. Returns true once the origin is
/// enclosed by a tetrahedron. The most recently added point is always last.
fn refine_simplex(simplex: &mut Vec<SupportPoint>, direction: &mut Vec3) -> bool {
    match simplex.len() {
        1 => {
            *direction = -simplex[0].minkowski;
            false
        }
        2 => {
            let a = simplex[1].minkowski;
            let b = simplex[0].minkowski;
            let ab = b - a;
            let ao = -a;

            let dir = ab.cross(ao).cross(ab);
            if dir.length_squared() < GEOMETRIC_EPSILON {
                // Origin lies on the line AB; pick any perpendicular.
                let axis = if ab.x.abs() < 0.1 { Vec3::X } else { Vec3::Y };
                *direction = ab.cross(axis);
            } else {
                *direction = dir;
            }
            false
        }
        3 => {
            let a = simplex[2].minkowski;
            let b = simplex[1].minkowski;
            let c = simplex[0].minkowski;
            let ab = b - a;
            let ac = c - a;
            let ao = -a;
            let abc = ab.cross(ac);

            if abc.cross(ac).dot(ao) > 0.0 {
                simplex.remove(1);
                *direction = ac.cross(ao).cross(ac);
                false
            } else if ab.cross(abc).dot(ao) > 0.0 {
                simplex.remove(0);
                *direction = ab.cross(ao).cross(ab);
                false
            } else {
                if abc.length_squared() < GEOMETRIC_EPSILON {
                    // Degenerate triangle; restart search off-plane.
                    *direction = Vec3::Y;
                } else if abc.dot(ao) > 0.0 {
                    *direction = abc;
                } else {
                    *direction = -abc;
                }
                false
            }
        }
        4 => {
            let a = simplex[3].minkowski;
            let b = simplex[2].minkowski;
            let c = simplex[1].minkowski;
            let d = simplex[0].minkowski;
            let ab = b - a;
            let ac = c - a;
            let ad = d - a;
            let ao = -a;
            let abc = ab.cross(ac);
            let acd = ac.cross(ad);
            let adb = ad.cross(ab);

            if abc.dot(ao) > 0.0 {
                simplex.remove(0);
                *direction = abc;
                false
            } else if acd.dot(ao) > 0.0 {
                simplex.remove(2);
                *direction = acd;
                false
            } else if adb.dot(ao) > 0.0 {
                simplex.remove(1);
                *direction = adb;
                false
            } else {
                true
            }
        }
        _ => false,
    }
}

/// Closest point to the origin over the current simplex, expressed as
/// witness points on both shapes via the stored support pairs.
fn closest_witness(simplex: &[SupportPoint]) -> SeparationWitness {
    let (closest, point_a, point_b) = match simplex.len() {
        0 => (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO),
        1 => (simplex[0].minkowski, simplex[0].on_a, simplex[0].on_b),
        2 => closest_on_segment(&simplex[0], &simplex[1]),
        3 => closest_on_triangle(&simplex[0], &simplex[1], &simplex[2]),
        _ => {
            // Separated simplices never legitimately hold 4 points, but the
            // fail-closed path can land here; take the best face.
            let faces = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
            let mut best = closest_on_triangle(&simplex[0], &simplex[1], &simplex[2]);
            for &(i, j, k) in &faces[1..] {
                let candidate = closest_on_triangle(&simplex[i], &simplex[j], &simplex[k]);
                if candidate.0.length_squared() < best.0.length_squared() {
                    best = candidate;
                }
            }
            best
        }
    };

    SeparationWitness {
        distance: closest.length(),
        point_a,
        point_b,
    }
}

fn closest_on_segment(p0: &SupportPoint, p1: &SupportPoint) -> (Vec3, Vec3, Vec3) {
    let d = p1.minkowski - p0.minkowski;
    let len_sq = d.length_squared();
    let t = if len_sq < GEOMETRIC_EPSILON {
        0.0
    } else {
        (-p0.minkowski.dot(d) / len_sq).clamp(0.0, 1.0)
    };
    (
        p0.minkowski.lerp(p1.minkowski, t),
        p0.on_a.lerp(p1.on_a, t),
        p0.on_b.lerp(p1.on_b, t),
    )
}

/// Closest point to the origin on a triangle, with the barycentric weights
/// carried over to the witness points.
fn closest_on_triangle(
    p0: &SupportPoint,
    p1: &SupportPoint,
    p2: &SupportPoint,
) -> (Vec3, Vec3, Vec3) {
    let a = p0.minkowski;
    let b = p1.minkowski;
    let c = p2.minkowski;

    let ab = b - a;
    let ac = c - a;
    let ap = -a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, p0.on_a, p0.on_b);
    }

    let bp = -b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, p1.on_a, p1.on_b);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let denom = d1 - d3;
        let t = if denom.abs() < GEOMETRIC_EPSILON {
            0.0
        } else {
            d1 / denom
        };
        return (
            a + ab * t,
            p0.on_a.lerp(p1.on_a, t),
            p0.on_b.lerp(p1.on_b, t),
        );
    }

    let cp = -c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, p2.on_a, p2.on_b);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let denom = d2 - d6;
        let t = if denom.abs() < GEOMETRIC_EPSILON {
            0.0
        } else {
            d2 / denom
        };
        return (
            a + ac * t,
            p0.on_a.lerp(p2.on_a, t),
            p0.on_b.lerp(p2.on_b, t),
        );
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let denom = (d4 - d3) + (d5 - d6);
        let t = if denom.abs() < GEOMETRIC_EPSILON {
            0.0
        } else {
            (d4 - d3) / denom
        };
        return (
            b + (c - b) * t,
            p1.on_a.lerp(p2.on_a, t),
            p1.on_b.lerp(p2.on_b, t),
        );
    }

    // Interior: project onto the face plane.
    let denom = va + vb + vc;
    if denom.abs() < GEOMETRIC_EPSILON {
        return (a, p0.on_a, p0.on_b);
    }
    let v = vb / denom;
    let w = vc / denom;
    let u = 1.0 - v - w;
    (
        a * u + b * v + c * w,
        p0.on_a * u + p1.on_a * v + p2.on_a * w,
        p0.on_b * u + p1.on_b * v + p2.on_b * w,
    )
}

/// Minimum penetration reported by EPA. `normal` is the outward normal of
/// the Minkowski-difference face closest to the origin; translating the
/// second shape by `normal * depth` resolves the overlap.
#[derive(Debug, Clone, Copy)]
pub struct Penetration {
    pub depth: f32,
    pub normal: Vec3,
}

/// Expanding Polytope Algorithm. Expands the tetrahedron GJK terminated
/// with until the closest face stops moving, yielding minimum penetration
/// depth and separating normal. Returns `None` (fail closed) on degenerate
/// input or non-convergence.
pub fn epa(simplex: &Simplex, a: &impl Support, b: &impl Support) -> Option<Penetration> {
    let seed = simplex.points();
    if seed.len() < 4 {
        log::debug!("epa seeded with degenerate simplex ({} points)", seed.len());
        return None;
    }

    let mut polytope: Vec<Vec3> = seed.iter().map(|p| p.minkowski).collect();
    let mut faces = initial_faces(&polytope);

    for _ in 0..EPA_MAX_ITERATIONS {
        let Some((min_dist, normal)) = closest_face(&polytope, &faces) else {
            log::debug!("epa polytope lost all valid faces; failing closed");
            return None;
        };

        let support = minkowski_support(a, b, normal);
        let distance = support.minkowski.dot(normal);

        // The new support point no longer expands the polytope: converged.
        if distance - min_dist < GEOMETRIC_EPSILON {
            return Some(Penetration {
                depth: min_dist.max(0.0),
                normal,
            });
        }

        expand_polytope(&mut polytope, &mut faces, support.minkowski);
    }

    log::debug!("epa iteration cap reached; failing closed");
    None
}

fn initial_faces(polytope: &[Vec3]) -> Vec<(usize, usize, usize)> {
    let mut faces = vec![(0, 1, 2), (0, 2, 3), (0, 3, 1), (1, 3, 2)];

    // Orient every face outward; the origin is inside the seed tetrahedron.
    for face in &mut faces {
        let ab = polytope[face.1] - polytope[face.0];
        let ac = polytope[face.2] - polytope[face.0];
        let normal = ab.cross(ac);
        if polytope[face.0].dot(normal) < 0.0 {
            std::mem::swap(&mut face.1, &mut face.2);
        }
    }
    faces
}

fn closest_face(polytope: &[Vec3], faces: &[(usize, usize, usize)]) -> Option<(f32, Vec3)> {
    let mut min_dist = f32::MAX;
    let mut min_normal = Vec3::ZERO;
    let mut found = false;

    for &(a, b, c) in faces {
        let ab = polytope[b] - polytope[a];
        let ac = polytope[c] - polytope[a];
        let normal = ab.cross(ac).normalize_or_zero();

        // Near-coplanar face; skip rather than divide by a tiny length.
        if normal == Vec3::ZERO {
            continue;
        }

        let dist = polytope[a].dot(normal);
        if dist < min_dist {
            min_dist = dist;
            min_normal = normal;
            found = true;
        }
    }

    found.then_some((min_dist, min_normal))
}

fn expand_polytope(polytope: &mut Vec<Vec3>, faces: &mut Vec<(usize, usize, usize)>, support: Vec3) {
    let new_idx = polytope.len();
    polytope.push(support);

    // Remove every face the new point can see, collecting its edges.
    let mut edges = Vec::new();
    let mut i = 0;
    while i < faces.len() {
        let (a, b, c) = faces[i];
        let ab = polytope[b] - polytope[a];
        let ac = polytope[c] - polytope[a];
        let normal = ab.cross(ac).normalize_or_zero();

        if normal.dot(support - polytope[a]) > 0.0 {
            edges.push((a, b));
            edges.push((b, c));
            edges.push((c, a));
            faces.swap_remove(i);
        } else {
            i += 1;
        }
    }

    // Edges shared by two removed faces cancel; the rest form the horizon.
    let mut boundary_edges: Vec<(usize, usize)> = Vec::new();
    for (u, v) in edges {
        if let Some(pos) = boundary_edges.iter().position(|&e| e == (v, u)) {
            boundary_edges.remove(pos);
        } else {
            boundary_edges.push((u, v));
        }
    }

    for (u, v) in boundary_edges {
        faces.push((u, v, new_idx));
    }
}
