//! World orchestration: one `step` runs broad phase, filtering, narrow
//! phase, manifold caching, impulse solving, and integration with
//! continuous-collision clamping for fast movers, then reports the frame's
//! contact events.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    collision::{
        broadphase::{BroadPhase, BroadPhaseEntry, SpatialHash},
        cache::{CollisionEvent, ManifoldCache, WarmStartImpulse},
        ccd::swept_aabb_toi,
        contact::{generate_manifold, ContactManifold},
    },
    config::{DEFAULT_GRAVITY, GEOMETRIC_EPSILON},
    core::{
        aabb::Aabb,
        filter::CollisionFilter,
        pair::{BodyKey, CollisionPair},
        shapes::{ConvexShape, Transform},
    },
    dynamics::solver::{PreparedContact, RigidBodyAdapter, SequentialImpulseSolver},
    utils::logging::ScopedTimer,
};

/// What the world needs to know about a body besides its dynamic state:
/// a stable key, its collision shape, and how it filters against others.
pub trait CollisionObject {
    type Key: BodyKey;

    fn key(&self) -> Self::Key;
    fn shape(&self) -> &ConvexShape;

    fn rotation(&self) -> Quat {
        Quat::IDENTITY
    }

    fn filter(&self) -> CollisionFilter {
        CollisionFilter::default()
    }
}

/// One responding manifold's solver state for the current step.
struct SolverJob<T: BodyKey> {
    pair: CollisionPair<T>,
    i: usize,
    j: usize,
    contact: PreparedContact,
    impulses: Vec<WarmStartImpulse>,
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("invalid timestep: {0}")]
    InvalidTimestep(f32),
    #[error("duplicate body key in step input")]
    DuplicateBodyKey,
}

/// Collision pipeline state that persists between steps: the manifold
/// cache, the pluggable broad phase, and solver tuning.
pub struct CollisionWorld<T: BodyKey> {
    cache: ManifoldCache<T>,
    broadphase: Box<dyn BroadPhase<T>>,
    solver: SequentialImpulseSolver,
    gravity: Vec3,
}

impl<T: BodyKey> Default for CollisionWorld<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BodyKey> CollisionWorld<T> {
    pub fn new() -> Self {
        Self {
            cache: ManifoldCache::new(),
            broadphase: Box::new(SpatialHash::default()),
            solver: SequentialImpulseSolver::default(),
            gravity: Vec3::from_slice(&DEFAULT_GRAVITY),
        }
    }

    pub fn with_broadphase<B>(broadphase: B) -> Self
    where
        B: BroadPhase<T> + 'static,
    {
        Self {
            broadphase: Box::new(broadphase),
            ..Self::new()
        }
    }

    pub fn set_broadphase<B>(&mut self, broadphase: B)
    where
        B: BroadPhase<T> + 'static,
    {
        self.broadphase = Box::new(broadphase);
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn solver_mut(&mut self) -> &mut SequentialImpulseSolver {
        &mut self.solver
    }

    /// See [`ManifoldCache::set_retention_frames`].
    pub fn set_retention_frames(&mut self, frames: u32) {
        self.cache.set_retention_frames(frames);
    }

    /// Read-only view of the cached manifolds from the last step.
    pub fn manifolds(&self) -> impl Iterator<Item = (&CollisionPair<T>, &ContactManifold)> {
        self.cache.iter()
    }

    /// Accumulated solver impulses stored for a pair after the last step.
    pub fn contact_impulses(&self, pair: &CollisionPair<T>) -> Option<&[WarmStartImpulse]> {
        self.cache.impulses(pair)
    }

    /// Advances the world one frame.
    ///
    /// A zero timestep runs detection and event reporting but skips
    /// gravity, solving, and integration. Negative or non-finite
    /// timesteps are rejected. Events come back sorted by pair.
    pub fn step<B>(&mut self, bodies: &mut [B], dt: f32) -> Result<Vec<CollisionEvent<T>>, StepError>
    where
        B: CollisionObject<Key = T> + RigidBodyAdapter + Send + Sync,
        T: Send + Sync,
    {
        if !dt.is_finite() || dt < 0.0 {
            return Err(StepError::InvalidTimestep(dt));
        }

        let index_of = build_index(bodies)?;

        if dt > 0.0 {
            for body in bodies.iter_mut() {
                if body.inverse_mass() > 0.0 {
                    body.set_velocity(body.velocity() + self.gravity * dt);
                }
            }
        }

        // AABBs are swept over the step's displacement so fast movers still
        // reach the broad phase as candidates.
        let entries: Vec<BroadPhaseEntry<T>> = bodies
            .iter()
            .map(|body| {
                let aabb = body_aabb(body);
                let swept = aabb.union(&aabb.translated(body.velocity() * dt));
                BroadPhaseEntry::new(body.key(), swept)
            })
            .collect();

        let candidates = {
            let _timer = ScopedTimer::new("broadphase");
            self.broadphase.find_potential_pairs(&entries)
        };

        let narrow_input: Vec<(CollisionPair<T>, usize, usize, bool)> = candidates
            .iter()
            .filter_map(|pair| {
                let &i = index_of.get(&pair.first())?;
                let &j = index_of.get(&pair.second())?;
                let decision = CollisionFilter::evaluate(&bodies[i].filter(), &bodies[j].filter());
                decision
                    .testable
                    .then_some((*pair, i, j, decision.respond))
            })
            .collect();

        let narrow = |&(pair, i, j, respond): &(CollisionPair<T>, usize, usize, bool)| {
            let a = &bodies[i];
            let b = &bodies[j];
            generate_manifold(
                a.shape(),
                &object_transform(a),
                b.shape(),
                &object_transform(b),
            )
            .map(|manifold| (pair, manifold, respond))
        };

        let manifolds: Vec<(CollisionPair<T>, ContactManifold, bool)> = {
            let _timer = ScopedTimer::new("narrowphase");
            #[cfg(feature = "parallel")]
            {
                narrow_input.par_iter().filter_map(narrow).collect()
            }
            #[cfg(not(feature = "parallel"))]
            {
                narrow_input.iter().filter_map(narrow).collect()
            }
        };

        let responding: Vec<(CollisionPair<T>, ContactManifold)> = manifolds
            .iter()
            .filter(|(_, _, respond)| *respond)
            .map(|(pair, manifold, _)| (*pair, manifold.clone()))
            .collect();

        let events = self.cache.merge(
            manifolds
                .into_iter()
                .map(|(pair, manifold, _)| (pair, manifold))
                .collect(),
        );

        if dt > 0.0 {
            {
                let _timer = ScopedTimer::new("solver");

                // Constraints are prepared against pre-solve velocities,
                // then warm started together, then relaxed Gauss-Seidel
                // style: each velocity iteration visits every responding
                // manifold once so impulses propagate through stacks.
                let mut jobs: Vec<SolverJob<T>> = responding
                    .iter()
                    .filter_map(|(pair, manifold)| {
                        let &i = index_of.get(&pair.first())?;
                        let &j = index_of.get(&pair.second())?;
                        let contact = self.solver.prepare(&bodies[i], &bodies[j], manifold, dt)?;
                        let impulses = self.cache.warm_start(pair, manifold);
                        Some(SolverJob {
                            pair: *pair,
                            i,
                            j,
                            contact,
                            impulses,
                        })
                    })
                    .collect();

                for job in &jobs {
                    let (body_a, body_b) = pair_mut(bodies, job.i, job.j);
                    self.solver.warm_start(body_a, body_b, &job.contact, &job.impulses);
                }

                for _ in 0..self.solver.iterations {
                    for job in &mut jobs {
                        let (body_a, body_b) = pair_mut(bodies, job.i, job.j);
                        self.solver.solve_velocity_iteration(
                            body_a,
                            body_b,
                            &job.contact,
                            &mut job.impulses,
                        );
                    }
                }

                for job in jobs {
                    let (body_a, body_b) = pair_mut(bodies, job.i, job.j);
                    self.solver.correct_positions(body_a, body_b, &job.contact);
                    self.cache.store_impulses(&job.pair, job.impulses);
                }
            }

            self.integrate(bodies, &narrow_input, dt);
        }

        Ok(events)
    }

    /// Moves dynamic bodies by their velocity, clamped to the earliest
    /// time of impact among responding candidate pairs that are not yet
    /// overlapping. Already-overlapping pairs are the solver's problem.
    fn integrate<B>(
        &mut self,
        bodies: &mut [B],
        candidates: &[(CollisionPair<T>, usize, usize, bool)],
        dt: f32,
    ) where
        B: CollisionObject<Key = T> + RigidBodyAdapter,
    {
        let _timer = ScopedTimer::new("integrate");

        let mut motion_scale = vec![1.0f32; bodies.len()];
        for &(_, i, j, respond) in candidates {
            if !respond {
                continue;
            }

            let aabb_i = body_aabb(&bodies[i]);
            let aabb_j = body_aabb(&bodies[j]);
            if aabb_i.overlaps(&aabb_j) {
                continue;
            }

            let relative = (bodies[i].velocity() - bodies[j].velocity()) * dt;
            if relative.length_squared() < GEOMETRIC_EPSILON {
                continue;
            }

            if let Some(t) = swept_aabb_toi(&aabb_i, relative, &aabb_j) {
                motion_scale[i] = motion_scale[i].min(t);
                motion_scale[j] = motion_scale[j].min(t);
            }
        }

        for (body, scale) in bodies.iter_mut().zip(motion_scale) {
            if body.inverse_mass() > 0.0 {
                let position = body.position() + body.velocity() * (dt * scale);
                body.set_position(position);
            }
        }
    }
}

fn build_index<B, T>(bodies: &[B]) -> Result<HashMap<T, usize>, StepError>
where
    B: CollisionObject<Key = T>,
    T: BodyKey,
{
    let mut index = HashMap::with_capacity(bodies.len());
    for (i, body) in bodies.iter().enumerate() {
        if index.insert(body.key(), i).is_some() {
            return Err(StepError::DuplicateBodyKey);
        }
    }
    Ok(index)
}

fn object_transform<B>(body: &B) -> Transform
where
    B: CollisionObject + RigidBodyAdapter,
{
    Transform::from_position_rotation(body.position(), body.rotation())
}

fn body_aabb<B>(body: &B) -> Aabb
where
    B: CollisionObject + RigidBodyAdapter,
{
    body.shape().aabb(&object_transform(body))
}

/// Two distinct mutable borrows out of one slice.
fn pair_mut<B>(bodies: &mut [B], i: usize, j: usize) -> (&mut B, &mut B) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = bodies.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}
