//! Template geometry: object-local vertex positions.
//!
//! Only positions are kept; projection and bounds never look at faces.
//! Meshes are cheaply cloneable because the vertex list is `Arc`-wrapped,
//! so every instance of a template shares one allocation.

use std::sync::Arc;

use glam::Vec3;

use crate::aabb::Aabb;
use crate::error::SceneError;

#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Arc<[Vec3]>,
    bounds: Aabb,
}

impl Mesh {
    /// Build a mesh from object-local vertex positions.
    pub fn from_positions(positions: Vec<Vec3>) -> Result<Self, SceneError> {
        let bounds = Aabb::from_points(positions.iter().copied()).ok_or(SceneError::EmptyMesh)?;
        Ok(Self {
            positions: positions.into(),
            bounds,
        })
    }

    /// Box centred at the origin with the given half extents (8 vertices).
    pub fn cuboid(half_extents: Vec3) -> Self {
        let bounds = Aabb::from_center_half_extents(Vec3::ZERO, half_extents);
        Self {
            positions: bounds.corners().to_vec().into(),
            bounds,
        }
    }

    /// Cube with edge length `2 * half_extent`.
    pub fn cube(half_extent: f32) -> Self {
        Self::cuboid(Vec3::splat(half_extent))
    }

    /// Load every model of an OBJ file into one position list.
    #[cfg(feature = "obj")]
    pub fn load_obj(path: &std::path::Path) -> Result<Self, SceneError> {
        let (models, _) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|e| {
            SceneError::MeshLoad {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let positions: Vec<Vec3> = models
            .iter()
            .flat_map(|m| m.mesh.positions.chunks_exact(3))
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        log::debug!("loaded {} vertices from {}", positions.len(), path.display());
        Self::from_positions(positions)
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Object-local bounding box of the vertices.
    #[inline]
    pub fn local_bounds(&self) -> Aabb {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_eight_corners() {
        let m = Mesh::cube(0.5);
        assert_eq!(m.positions().len(), 8);
        assert_eq!(m.local_bounds().max, Vec3::splat(0.5));
        assert_eq!(m.local_bounds().min, Vec3::splat(-0.5));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(matches!(
            Mesh::from_positions(Vec::new()),
            Err(SceneError::EmptyMesh)
        ));
    }

    #[test]
    fn clones_share_vertices() {
        let a = Mesh::cube(1.0);
        let b = a.clone();
        assert!(std::ptr::eq(a.positions().as_ptr(), b.positions().as_ptr()));
    }
}
