//! Broad-phase candidate-pair generation. Two interchangeable
//! implementations sit behind one trait: a uniform spatial hash and a
//! sweep-and-prune. Both are safe over-approximations (every truly
//! overlapping AABB pair is reported) and both return deduplicated, sorted
//! output so downstream iteration order is deterministic.

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use crate::core::{
    aabb::Aabb,
    pair::{BodyKey, CollisionPair},
};

/// One body as seen by the broad phase: its key and the step's AABB.
#[derive(Debug, Clone, Copy)]
pub struct BroadPhaseEntry<T> {
    pub key: T,
    pub aabb: Aabb,
}

impl<T> BroadPhaseEntry<T> {
    pub fn new(key: T, aabb: Aabb) -> Self {
        Self { key, aabb }
    }
}

/// Candidate-pair contract. False positives are acceptable and pruned by
/// the narrow phase; false negatives are not.
pub trait BroadPhase<T: BodyKey> {
    fn find_potential_pairs(&mut self, entries: &[BroadPhaseEntry<T>]) -> Vec<CollisionPair<T>>;
}

/// Uniform-grid spatial hash. Each body is inserted into every cell its
/// AABB touches; bodies sharing a cell become candidates. Works best when
/// bodies are small relative to the cell size and roughly uniformly
/// distributed; a few huge AABBs fan out over many cells.
pub struct SpatialHash {
    cell_size: f32,
    grid: HashMap<(i32, i32, i32), Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(crate::config::GEOMETRIC_EPSILON),
            grid: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, position: Vec3) -> (i32, i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
            (position.z / self.cell_size).floor() as i32,
        )
    }
}

impl<T: BodyKey> BroadPhase<T> for SpatialHash {
    fn find_potential_pairs(&mut self, entries: &[BroadPhaseEntry<T>]) -> Vec<CollisionPair<T>> {
        self.grid.clear();

        for (index, entry) in entries.iter().enumerate() {
            let min_cell = self.cell_of(entry.aabb.min);
            let max_cell = self.cell_of(entry.aabb.max);
            for x in min_cell.0..=max_cell.0 {
                for y in min_cell.1..=max_cell.1 {
                    for z in min_cell.2..=max_cell.2 {
                        self.grid.entry((x, y, z)).or_default().push(index);
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for bucket in self.grid.values() {
            for (slot, &i) in bucket.iter().enumerate() {
                for &j in &bucket[slot + 1..] {
                    let pair = CollisionPair::new(entries[i].key, entries[j].key);
                    if entries[i].aabb.overlaps(&entries[j].aabb) && seen.insert(pair) {
                        pairs.push(pair);
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BROADPHASE_CELL_SIZE)
    }
}

/// Sweep-and-prune along the axis with the greatest spread of AABB
/// centers. Bodies are sorted by interval min and swept with an active
/// set; intervals past their max drop out. Suits coherent, largely
/// one-dimensional scenes.
#[derive(Debug, Default)]
pub struct SweepAndPrune {
    peak_active: usize,
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest active-set size observed during the last sweep; a useful
    /// cost metric for scene layout.
    pub fn peak_active(&self) -> usize {
        self.peak_active
    }

    fn sort_axis<T>(entries: &[BroadPhaseEntry<T>]) -> usize {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for entry in entries {
            let center = entry.aabb.center();
            min = min.min(center);
            max = max.max(center);
        }
        let spread = max - min;
        if spread.x >= spread.y && spread.x >= spread.z {
            0
        } else if spread.y >= spread.z {
            1
        } else {
            2
        }
    }
}

impl<T: BodyKey> BroadPhase<T> for SweepAndPrune {
    fn find_potential_pairs(&mut self, entries: &[BroadPhaseEntry<T>]) -> Vec<CollisionPair<T>> {
        self.peak_active = 0;
        if entries.len() < 2 {
            return Vec::new();
        }

        let axis = Self::sort_axis(entries);
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_unstable_by(|&a, &b| {
            entries[a].aabb.min[axis]
                .partial_cmp(&entries[b].aabb.min[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut active: Vec<usize> = Vec::new();
        let mut pairs = Vec::new();

        for &index in &order {
            let current = &entries[index];
            active.retain(|&other| entries[other].aabb.max[axis] >= current.aabb.min[axis]);

            for &other in &active {
                if current.aabb.overlaps(&entries[other].aabb) {
                    pairs.push(CollisionPair::new(current.key, entries[other].key));
                }
            }

            active.push(index);
            self.peak_active = self.peak_active.max(active.len());
        }

        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}
