//! Collision Core – collision detection and contact resolution for Rust.
//!
//! This crate exposes a modular collision pipeline built around
//! host-owned bodies: broad-phase candidate generation, convex narrow
//! phase (closed forms, SAT, GJK/EPA), continuous queries, a persistent
//! manifold cache with enter/stay/exit events, and a sequential-impulse
//! contact solver, orchestrated by a [`CollisionWorld`].

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod utils;
pub mod world;

pub use glam::{Quat, Vec2, Vec3};

pub use collision::{
    broadphase::{BroadPhase, BroadPhaseEntry, SpatialHash, SweepAndPrune},
    cache::{CollisionEvent, ContactEventKind, ManifoldCache, WarmStartImpulse},
    ccd::{segment_aabb_toi, swept_aabb_toi},
    contact::{generate_manifold, ContactManifold},
    gjk::{epa, gjk, intersects, GjkResult, Penetration, SeparationWitness},
    queries::{ray_aabb, RayHit},
    sat::{polygon_polygon, Mtv},
};
pub use core::{
    aabb::{Aabb, BoundingSphere},
    filter::{CollisionFilter, FilterDecision, FilterKind},
    pair::{BodyKey, CollisionPair},
    polygon::{ConvexPolygon, ShapeError},
    shapes::{ConvexShape, PositionedShape, Support, Transform},
};
pub use dynamics::solver::{PreparedContact, RigidBodyAdapter, SequentialImpulseSolver};
pub use world::{CollisionObject, CollisionWorld, StepError};
