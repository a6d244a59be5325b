//! Persistent manifold cache. Carries contact manifolds and accumulated
//! solver impulses across frames, classifies each pair as entering,
//! staying, or exiting, and tolerates short broad-phase flicker through a
//! retention window.

use std::collections::HashMap;

use glam::Vec3;

use crate::{
    config::{CONTACT_MATCH_TOLERANCE, DEFAULT_RETENTION_FRAMES},
    core::pair::{BodyKey, CollisionPair},
};

use super::contact::ContactManifold;

/// Accumulated impulses for one cached contact point, used to warm start
/// the solver on the next frame.
#[derive(Debug, Clone, Copy)]
pub struct WarmStartImpulse {
    pub point: Vec3,
    pub normal_impulse: f32,
    pub tangent_impulse: Vec3,
}

impl WarmStartImpulse {
    pub fn cold(point: Vec3) -> Self {
        Self {
            point,
            normal_impulse: 0.0,
            tangent_impulse: Vec3::ZERO,
        }
    }
}

/// Lifecycle of a contact pair between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEventKind {
    Enter,
    Stay,
    Exit,
}

/// One pair transition reported by [`ManifoldCache::merge`]. `Enter` and
/// `Stay` carry the fresh manifold; `Exit` carries the last-known one, so
/// listeners can tell where the contact was when it broke.
#[derive(Debug, Clone)]
pub struct CollisionEvent<T> {
    pub pair: CollisionPair<T>,
    pub kind: ContactEventKind,
    pub manifold: Option<ContactManifold>,
}

#[derive(Debug, Clone)]
struct PairEntry {
    manifold: ContactManifold,
    /// Consecutive frames this pair has been present.
    age: u32,
    /// Consecutive frames the pair has been absent from fresh results.
    missed_frames: u32,
    warm: Vec<WarmStartImpulse>,
}

/// Frame-to-frame contact state keyed by normalized pair.
#[derive(Debug)]
pub struct ManifoldCache<T> {
    entries: HashMap<CollisionPair<T>, PairEntry>,
    retention_frames: u32,
    match_tolerance: f32,
}

impl<T: BodyKey> Default for ManifoldCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BodyKey> ManifoldCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            retention_frames: DEFAULT_RETENTION_FRAMES,
            match_tolerance: CONTACT_MATCH_TOLERANCE,
        }
    }

    /// How many consecutive absent frames a pair survives before it is
    /// evicted and reported as an exit. Zero evicts immediately.
    pub fn set_retention_frames(&mut self, frames: u32) {
        self.retention_frames = frames;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn manifold(&self, pair: &CollisionPair<T>) -> Option<&ContactManifold> {
        self.entries.get(pair).map(|e| &e.manifold)
    }

    /// Iterates cached pairs and manifolds in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&CollisionPair<T>, &ContactManifold)> {
        self.entries.iter().map(|(pair, e)| (pair, &e.manifold))
    }

    /// Folds this frame's narrow-phase results into the cache and returns
    /// the resulting lifecycle events, sorted by pair for determinism.
    ///
    /// New pairs report `Enter`, persisting pairs `Stay`. Cached pairs
    /// missing from `fresh` survive silently inside the retention window;
    /// past it they are evicted and report `Exit`. Warm-start impulses are
    /// re-matched to the nearest new contact point so resting stacks keep
    /// their accumulated impulses across frames.
    pub fn merge(
        &mut self,
        fresh: Vec<(CollisionPair<T>, ContactManifold)>,
    ) -> Vec<CollisionEvent<T>> {
        let mut events = Vec::new();
        let mut seen: Vec<CollisionPair<T>> = Vec::with_capacity(fresh.len());

        for (pair, manifold) in fresh {
            seen.push(pair);
            match self.entries.get_mut(&pair) {
                Some(entry) => {
                    entry.warm = rematch_impulses(&entry.warm, &manifold, self.match_tolerance);
                    entry.manifold = manifold.clone();
                    entry.age = entry.age.saturating_add(1);
                    entry.missed_frames = 0;
                    events.push(CollisionEvent {
                        pair,
                        kind: ContactEventKind::Stay,
                        manifold: Some(manifold),
                    });
                }
                None => {
                    self.entries.insert(
                        pair,
                        PairEntry {
                            warm: manifold.points.iter().map(|&p| WarmStartImpulse::cold(p)).collect(),
                            manifold: manifold.clone(),
                            age: 1,
                            missed_frames: 0,
                        },
                    );
                    events.push(CollisionEvent {
                        pair,
                        kind: ContactEventKind::Enter,
                        manifold: Some(manifold),
                    });
                }
            }
        }

        let retention = self.retention_frames;
        self.entries.retain(|pair, entry| {
            if seen.contains(pair) {
                return true;
            }
            entry.missed_frames += 1;
            if entry.missed_frames > retention {
                events.push(CollisionEvent {
                    pair: *pair,
                    kind: ContactEventKind::Exit,
                    manifold: Some(entry.manifold.clone()),
                });
                false
            } else {
                true
            }
        });

        events.sort_by_key(|e| e.pair);
        events
    }

    /// Warm-start impulses for a pair, one per manifold point. Unmatched
    /// or unknown points come back cold.
    pub fn warm_start(&self, pair: &CollisionPair<T>, manifold: &ContactManifold) -> Vec<WarmStartImpulse> {
        match self.entries.get(pair) {
            Some(entry) => rematch_impulses(&entry.warm, manifold, self.match_tolerance),
            None => manifold.points.iter().map(|&p| WarmStartImpulse::cold(p)).collect(),
        }
    }

    /// Stores the solver's accumulated impulses for next frame's warm
    /// start. Ignored for pairs no longer cached.
    pub fn store_impulses(&mut self, pair: &CollisionPair<T>, impulses: Vec<WarmStartImpulse>) {
        if let Some(entry) = self.entries.get_mut(pair) {
            entry.warm = impulses;
        }
    }

    /// The impulses last stored for a pair, if it is still cached.
    pub fn impulses(&self, pair: &CollisionPair<T>) -> Option<&[WarmStartImpulse]> {
        self.entries.get(pair).map(|e| e.warm.as_slice())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Nearest-point matching between last frame's impulse set and this
/// frame's contact points. A point with no cached neighbor within the
/// tolerance starts cold.
fn rematch_impulses(
    previous: &[WarmStartImpulse],
    manifold: &ContactManifold,
    tolerance: f32,
) -> Vec<WarmStartImpulse> {
    let tol_sq = tolerance * tolerance;
    manifold
        .points
        .iter()
        .map(|&point| {
            previous
                .iter()
                .map(|w| (w.point.distance_squared(point), w))
                .filter(|(d, _)| *d <= tol_sq)
                .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(_, w)| WarmStartImpulse {
                    point,
                    normal_impulse: w.normal_impulse,
                    tangent_impulse: w.tangent_impulse,
                })
                .unwrap_or_else(|| WarmStartImpulse::cold(point))
        })
        .collect()
}
