pub mod solver;

pub use solver::{RigidBodyAdapter, SequentialImpulseSolver};
