use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Construction failures for collision geometry supplied by the host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("convex polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),
}

/// Convex polygon in 2D: ordered, non-self-intersecting vertices with
/// counter-clockwise winding assumed for edge-normal derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvexPolygon {
    vertices: Vec<Vec2>,
}

impl ConvexPolygon {
    pub fn new(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        if vertices.len() < 3 {
            return Err(ShapeError::DegeneratePolygon(vertices.len()));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Derived, never stored.
    pub fn centroid(&self) -> Vec2 {
        let sum: Vec2 = self.vertices.iter().copied().sum();
        sum / self.vertices.len() as f32
    }

    /// Returns a copy translated by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| *v + offset).collect(),
        }
    }

    /// Outward edge normals in vertex order (CCW winding).
    pub fn edge_normals(&self) -> impl Iterator<Item = Vec2> + '_ {
        let count = self.vertices.len();
        (0..count).filter_map(move |i| {
            let edge = self.vertices[(i + 1) % count] - self.vertices[i];
            let normal = Vec2::new(edge.y, -edge.x);
            if normal.length_squared() < crate::config::GEOMETRIC_EPSILON {
                None
            } else {
                Some(normal.normalize())
            }
        })
    }

    /// Min/max projection of every vertex onto `axis`.
    pub fn project(&self, axis: Vec2) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for v in &self.vertices {
            let d = v.dot(axis);
            min = min.min(d);
            max = max.max(d);
        }
        (min, max)
    }
}
