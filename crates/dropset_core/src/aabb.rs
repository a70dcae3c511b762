//! Axis-aligned bounding boxes and the placement collision predicate.

use glam::{Mat4, Vec3};

/// World-space axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Creates an AABB from `min`/`max` corners.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centred at `centre` with the given half extents.
    #[inline]
    pub fn from_center_half_extents(centre: Vec3, half: Vec3) -> Self {
        Self {
            min: centre - half,
            max: centre + half,
        }
    }

    /// Smallest box enclosing every point, or `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    /// The eight corners, ordered like a host bound box (x-major, then y, then z).
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(b.x, b.y, a.z),
        ]
    }

    /// Returns a new AABB enclosing the eight corners transformed by `transform`.
    ///
    /// Only the local box corners are transformed; the result is not refit
    /// to the mesh vertices, so rotated objects get a looser box.
    pub fn transform(&self, transform: &Mat4) -> Self {
        let corners = self.corners().map(|c| transform.transform_point3(c));
        let mut out = Self::new(corners[0], corners[0]);
        for c in &corners[1..] {
            out.min = out.min.min(*c);
            out.max = out.max.max(*c);
        }
        out
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Placement collision test between `self` (the candidate) and `other`.
    ///
    /// On every axis the candidate must have its max or its min inside the
    /// other box's closed interval.  A candidate that strictly contains the
    /// other box on an axis is therefore *not* colliding on that axis, which
    /// makes the predicate order-dependent.  Existing datasets were generated
    /// with this rule, so it is kept as is.
    pub fn collides(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| {
            let (a_min, a_max) = (self.min[axis], self.max[axis]);
            let (b_min, b_max) = (other.min[axis], other.max[axis]);
            (a_max >= b_min && a_max <= b_max) || (a_min <= b_max && a_min >= b_min)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn cube(centre: Vec3, half: f32) -> Aabb {
        Aabb::from_center_half_extents(centre, Vec3::splat(half))
    }

    #[test]
    fn partial_overlap_collides_both_ways() {
        let a = cube(Vec3::ZERO, 1.0);
        let b = cube(Vec3::new(1.5, 0.5, -0.5), 1.0);
        assert!(a.collides(&b));
        assert!(b.collides(&a));
    }

    #[test]
    fn separated_on_one_axis_does_not_collide() {
        let a = cube(Vec3::ZERO, 1.0);
        let b = cube(Vec3::new(0.0, 0.0, 2.5), 1.0);
        assert!(!a.collides(&b));
        assert!(!b.collides(&a));
    }

    #[test]
    fn containment_rule_is_order_dependent() {
        let big = cube(Vec3::ZERO, 2.0);
        let small = cube(Vec3::ZERO, 0.5);
        // small's min and max both lie inside big on every axis
        assert!(small.collides(&big));
        // big's min and max both lie outside small on every axis
        assert!(!big.collides(&small));
    }

    #[test]
    fn containment_on_a_single_axis_breaks_the_test() {
        // b straddles a on X only; on Y/Z they overlap normally
        let a = Aabb::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(1.0, 1.5, 1.5));
        assert!(!a.collides(&b));
        assert!(b.collides(&a));
    }

    #[test]
    fn touching_faces_collide() {
        let a = cube(Vec3::ZERO, 1.0);
        let b = cube(Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(a.collides(&b));
    }

    #[test]
    fn transform_uses_rotated_corners() {
        let unit = cube(Vec3::ZERO, 0.5);
        let rot = Mat4::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4));
        let out = unit.transform(&rot);
        let r = 0.5 * std::f32::consts::SQRT_2;
        assert!(out.max.abs_diff_eq(Vec3::new(r, r, 0.5), 1e-5));
        assert!(out.min.abs_diff_eq(Vec3::new(-r, -r, -0.5), 1e-5));
    }

    #[test]
    fn from_points_encloses_all() {
        let b = Aabb::from_points([Vec3::X, Vec3::NEG_Y, Vec3::Z * 2.0]).unwrap();
        assert_eq!(b.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 0.0, 2.0));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }
}
