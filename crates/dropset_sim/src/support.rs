//! Support region derived from the static surface object.

use dropset_core::{Aabb, Element, SceneContext};
use glam::{Vec2, Vec3};
use rand::Rng;

use crate::error::SimError;

/// Sampling volume above the surface: an XY rectangle plus the height of
/// the surface's top face.  Computed once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportRegion {
    pub min: Vec2,
    pub max: Vec2,
    /// World z of the surface's top face.
    pub top: f32,
}

impl SupportRegion {
    /// Derive the region from the scene's surface object.
    pub fn from_scene(scene: &SceneContext) -> Result<Self, SimError> {
        let surface = scene
            .surface()
            .ok_or_else(|| SimError::Configuration("scene has no surface object".into()))?;
        Self::from_surface(surface)
    }

    /// Derive the region from the surface's world-space footprint.
    pub fn from_surface(surface: &Element) -> Result<Self, SimError> {
        let bounds = surface.world_bounds();
        let size = bounds.size();
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(SimError::Configuration(format!(
                "surface '{}' has zero footprint ({} x {})",
                surface.name, size.x, size.y
            )));
        }
        Ok(Self::from_bounds(&bounds))
    }

    pub fn from_bounds(bounds: &Aabb) -> Self {
        Self {
            min: bounds.min.truncate(),
            max: bounds.max.truncate(),
            top: bounds.max.z,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Uniform sample of the XY rectangle.
    pub fn sample_xy<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            uniform(rng, self.min.x, self.max.x),
            uniform(rng, self.min.y, self.max.y),
        )
    }

    /// `true` if `p` lies outside the footprint grown by `margin` on every
    /// side, or below `floor_z`.
    pub fn is_out_of_world(&self, p: Vec3, margin: f32, floor_z: f32) -> bool {
        p.x < self.min.x - margin
            || p.x > self.max.x + margin
            || p.y < self.min.y - margin
            || p.y > self.max.y + margin
            || p.z < floor_z
    }
}

/// Uniform sample of `[lo, hi]`; collapses to `lo` for an empty interval.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropset_core::{Mesh, Transform};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(size: Vec3) -> Element {
        Element::new(
            "Table",
            Transform::from_position(Vec3::new(1.0, -1.0, 0.5)),
            Mesh::cuboid(size * 0.5),
        )
    }

    #[test]
    fn region_follows_surface_footprint() {
        let r = SupportRegion::from_surface(&table(Vec3::new(4.0, 2.0, 1.0))).unwrap();
        assert_eq!(r.min, Vec2::new(-1.0, -2.0));
        assert_eq!(r.max, Vec2::new(3.0, 0.0));
        assert_eq!(r.top, 1.0);
    }

    #[test]
    fn flat_surface_is_a_configuration_error() {
        let err = SupportRegion::from_surface(&table(Vec3::new(4.0, 0.0, 1.0))).unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }

    #[test]
    fn missing_surface_is_a_configuration_error() {
        let scene = SceneContext::new(vec![dropset_core::Template::new("Cube", Mesh::cube(0.5))])
            .unwrap();
        assert!(matches!(
            SupportRegion::from_scene(&scene),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn samples_stay_inside() {
        let r = SupportRegion::from_surface(&table(Vec3::new(4.0, 2.0, 1.0))).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = r.sample_xy(&mut rng);
            assert!(p.x >= r.min.x && p.x <= r.max.x);
            assert!(p.y >= r.min.y && p.y <= r.max.y);
        }
    }

    #[test]
    fn out_of_world_checks_margin_and_floor() {
        let r = SupportRegion::from_surface(&table(Vec3::new(4.0, 2.0, 1.0))).unwrap();
        assert!(!r.is_out_of_world(Vec3::new(3.2, 0.0, 1.0), 0.5, 0.0));
        assert!(r.is_out_of_world(Vec3::new(3.2, 0.0, 1.0), 0.0, 0.0));
        assert!(r.is_out_of_world(Vec3::new(0.0, -1.0, -0.01), 0.0, 0.0));
    }
}
