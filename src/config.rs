//! Tuning constants for the collision core. Iteration caps are exposed here
//! rather than buried in the algorithms so tests can reason about them.

/// Default gravity vector applied to dynamic bodies (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Velocity iterations the sequential impulse solver runs per step.
pub const DEFAULT_SOLVER_ITERATIONS: usize = 10;

/// Baumgarte positional-bias factor (fraction of penetration corrected per
/// step at the velocity level).
pub const DEFAULT_BAUMGARTE: f32 = 0.2;

/// Penetration depth tolerated before positional bias kicks in.
pub const PENETRATION_SLOP: f32 = 0.005;

/// Approach speed below which restitution is ignored, preventing jitter in
/// resting contacts.
pub const RESTITUTION_THRESHOLD: f32 = 0.5;

/// Default cell size for the spatial-hash broad phase.
pub const DEFAULT_BROADPHASE_CELL_SIZE: f32 = 5.0;

/// Frames a vanished pair survives in the manifold cache before eviction,
/// tolerating single-frame narrow-phase flicker.
pub const DEFAULT_RETENTION_FRAMES: u32 = 1;

/// Iteration cap for the GJK simplex loop; hitting it fails closed.
pub const GJK_MAX_ITERATIONS: usize = 32;

/// Iteration cap for EPA polytope expansion; hitting it fails closed.
pub const EPA_MAX_ITERATIONS: usize = 48;

/// Epsilon guarding normalization and degenerate-face checks.
pub const GEOMETRIC_EPSILON: f32 = 1e-6;

/// Maximum distance at which a contact point is considered the same point
/// as last frame when rematching warm-start impulses.
pub const CONTACT_MATCH_TOLERANCE: f32 = 0.05;
