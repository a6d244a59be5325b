//! Geometry primitives and the capability types the rest of the engine is
//! built on: bounding volumes, support mappings, pair identity, filtering.

pub mod aabb;
pub mod filter;
pub mod pair;
pub mod polygon;
pub mod shapes;

pub use aabb::{Aabb, BoundingSphere};
pub use filter::{CollisionFilter, FilterDecision, FilterKind};
pub use pair::{BodyKey, CollisionPair};
pub use polygon::{ConvexPolygon, ShapeError};
pub use shapes::{ConvexShape, PositionedShape, Support, Transform};
