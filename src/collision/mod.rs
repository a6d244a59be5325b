pub mod broadphase;
pub mod cache;
pub mod ccd;
pub mod contact;
pub mod gjk;
pub mod queries;
pub mod sat;

pub use broadphase::{BroadPhase, BroadPhaseEntry, SpatialHash, SweepAndPrune};
pub use cache::{CollisionEvent, ContactEventKind, ManifoldCache, WarmStartImpulse};
pub use ccd::{segment_aabb_toi, swept_aabb_toi};
pub use contact::{generate_manifold, ContactManifold};
pub use gjk::{epa, gjk, intersects, GjkResult, Penetration, SeparationWitness};
pub use queries::{aabb_aabb, ray_aabb, sphere_aabb, sphere_sphere, RayHit};
pub use sat::{polygon_polygon, Mtv};
