use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Stable body identifier the core is generic over. Hosts typically use an
/// arena index or integer handle; object identity is never relied on.
pub trait BodyKey: Copy + Eq + Hash + Ord {}

impl<T: Copy + Eq + Hash + Ord> BodyKey for T {}

/// Unordered pair of body keys. Normalized on construction so
/// `CollisionPair::new(a, b) == CollisionPair::new(b, a)` and the derived
/// hash is order-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionPair<T> {
    first: T,
    second: T,
}

impl<T: BodyKey> CollisionPair<T> {
    pub fn new(a: T, b: T) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub fn first(&self) -> T {
        self.first
    }

    pub fn second(&self) -> T {
        self.second
    }

    pub fn contains(&self, key: T) -> bool {
        self.first == key || self.second == key
    }
}
