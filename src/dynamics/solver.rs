//! Linear sequential-impulse contact solver. Contacts are prepared once
//! per step, warm started, then relaxed Gauss-Seidel style: every velocity
//! iteration visits every contact once, so impulses propagate between
//! coupled pairs (stacks, chains) within a single step. A direct position
//! correction pass handles whatever penetration remains.

use glam::Vec3;

use crate::{
    collision::{cache::WarmStartImpulse, contact::ContactManifold},
    config::{
        DEFAULT_BAUMGARTE, DEFAULT_SOLVER_ITERATIONS, GEOMETRIC_EPSILON, PENETRATION_SLOP,
        RESTITUTION_THRESHOLD,
    },
};

/// Minimal dynamic state the solver needs from a body. Static geometry
/// reports an inverse mass of zero and is never moved.
pub trait RigidBodyAdapter {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    /// `1 / mass`; zero marks the body static.
    fn inverse_mass(&self) -> f32;
    fn restitution(&self) -> f32;
    fn friction(&self) -> f32;
}

/// Per-pair constraint data computed once before the iteration loop.
/// Restitution responds to the pre-solve approach speed, so preparation
/// must happen before any warm starting touches velocities.
#[derive(Debug, Clone, Copy)]
pub struct PreparedContact {
    pub normal: Vec3,
    pub depth: f32,
    pub inv_a: f32,
    pub inv_b: f32,
    pub effective_mass: f32,
    pub friction: f32,
    pub bounce: f32,
    pub bias: f32,
}

#[derive(Debug, Clone)]
pub struct SequentialImpulseSolver {
    pub iterations: usize,
    pub baumgarte: f32,
    pub slop: f32,
    pub restitution_threshold: f32,
}

impl Default for SequentialImpulseSolver {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_SOLVER_ITERATIONS,
            baumgarte: DEFAULT_BAUMGARTE,
            slop: PENETRATION_SLOP,
            restitution_threshold: RESTITUTION_THRESHOLD,
        }
    }
}

impl SequentialImpulseSolver {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations: iterations.max(1),
            ..Self::default()
        }
    }

    /// Builds the per-pair constraint, or `None` when neither body can
    /// move. The manifold normal points from `body_a` toward `body_b`.
    pub fn prepare<A, B>(
        &self,
        body_a: &A,
        body_b: &B,
        manifold: &ContactManifold,
        dt: f32,
    ) -> Option<PreparedContact>
    where
        A: RigidBodyAdapter,
        B: RigidBodyAdapter,
    {
        let inv_a = body_a.inverse_mass();
        let inv_b = body_b.inverse_mass();
        let inv_sum = inv_a + inv_b;
        if inv_sum <= 0.0 || manifold.points.is_empty() {
            return None;
        }

        let normal = manifold.normal;
        let restitution = (body_a.restitution() * body_b.restitution()).max(0.0).sqrt();
        let friction = (body_a.friction() * body_b.friction()).max(0.0).sqrt();

        // Restitution only above the threshold so resting contacts do not
        // jitter.
        let approach = -(body_b.velocity() - body_a.velocity()).dot(normal);
        let bounce = if approach > self.restitution_threshold {
            restitution * approach
        } else {
            0.0
        };

        let bias = if dt > 0.0 {
            (self.baumgarte / dt) * (manifold.depth - self.slop).max(0.0)
        } else {
            0.0
        };

        Some(PreparedContact {
            normal,
            depth: manifold.depth,
            inv_a,
            inv_b,
            effective_mass: 1.0 / inv_sum,
            friction,
            bounce,
            bias,
        })
    }

    /// Replays last frame's accumulated impulses before iteration begins.
    pub fn warm_start<A, B>(
        &self,
        body_a: &mut A,
        body_b: &mut B,
        contact: &PreparedContact,
        impulses: &[WarmStartImpulse],
    ) where
        A: RigidBodyAdapter,
        B: RigidBodyAdapter,
    {
        for warm in impulses {
            let impulse = contact.normal * warm.normal_impulse + warm.tangent_impulse;
            body_a.set_velocity(body_a.velocity() - impulse * contact.inv_a);
            body_b.set_velocity(body_b.velocity() + impulse * contact.inv_b);
        }
    }

    /// One relaxation pass over this pair's contact points. The caller
    /// drives the outer iteration loop across all pairs so impulses
    /// interleave between coupled contacts.
    pub fn solve_velocity_iteration<A, B>(
        &self,
        body_a: &mut A,
        body_b: &mut B,
        contact: &PreparedContact,
        impulses: &mut [WarmStartImpulse],
    ) where
        A: RigidBodyAdapter,
        B: RigidBodyAdapter,
    {
        let normal = contact.normal;
        for warm in impulses.iter_mut() {
            // Normal impulse with accumulated clamping.
            let relative = body_b.velocity() - body_a.velocity();
            let vn = relative.dot(normal);
            let lambda = (contact.bounce + contact.bias - vn) * contact.effective_mass;

            let old = warm.normal_impulse;
            warm.normal_impulse = (old + lambda).max(0.0);
            let applied = warm.normal_impulse - old;

            let impulse = normal * applied;
            body_a.set_velocity(body_a.velocity() - impulse * contact.inv_a);
            body_b.set_velocity(body_b.velocity() + impulse * contact.inv_b);

            // Coulomb friction along the contact tangent, bounded by the
            // current normal impulse.
            let relative = body_b.velocity() - body_a.velocity();
            let tangent_velocity = relative - normal * relative.dot(normal);
            let speed_sq = tangent_velocity.length_squared();
            if speed_sq <= GEOMETRIC_EPSILON {
                continue;
            }

            let tangent = tangent_velocity / speed_sq.sqrt();
            let lambda_t = -relative.dot(tangent) * contact.effective_mass;

            let max_friction = contact.friction * warm.normal_impulse;
            let old_t = warm.tangent_impulse;
            let mut new_t = old_t + tangent * lambda_t;
            let magnitude = new_t.length();
            if magnitude > max_friction {
                new_t *= if magnitude > 0.0 { max_friction / magnitude } else { 0.0 };
            }
            warm.tangent_impulse = new_t;

            let applied_t = new_t - old_t;
            body_a.set_velocity(body_a.velocity() - applied_t * contact.inv_a);
            body_b.set_velocity(body_b.velocity() + applied_t * contact.inv_b);
        }
    }

    /// Direct positional de-penetration, split by inverse mass.
    pub fn correct_positions<A, B>(&self, body_a: &mut A, body_b: &mut B, contact: &PreparedContact)
    where
        A: RigidBodyAdapter,
        B: RigidBodyAdapter,
    {
        let excess = (contact.depth - self.slop).max(0.0);
        if excess <= 0.0 {
            return;
        }

        let correction =
            contact.normal * (excess * self.baumgarte / (contact.inv_a + contact.inv_b));
        body_a.set_position(body_a.position() - correction * contact.inv_a);
        body_b.set_position(body_b.position() + correction * contact.inv_b);
    }

    /// Resolves a single isolated pair end to end: prepare, warm start,
    /// iterate, correct. For coupled scenes the caller should drive the
    /// granular methods itself so iterations interleave across pairs.
    pub fn solve<A, B>(
        &self,
        body_a: &mut A,
        body_b: &mut B,
        manifold: &ContactManifold,
        impulses: &mut [WarmStartImpulse],
        dt: f32,
    ) where
        A: RigidBodyAdapter,
        B: RigidBodyAdapter,
    {
        let Some(contact) = self.prepare(body_a, body_b, manifold, dt) else {
            return;
        };

        self.warm_start(body_a, body_b, &contact, impulses);
        for _ in 0..self.iterations {
            self.solve_velocity_iteration(body_a, body_b, &contact, impulses);
        }
        self.correct_positions(body_a, body_b, &contact);
    }
}
