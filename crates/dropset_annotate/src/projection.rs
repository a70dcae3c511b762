//! Camera-space 2D bounding boxes.
//!
//! ## Algorithm
//!
//! Every vertex is moved into camera space (object → world → camera, camera
//! scale stripped).  The camera's view-frame corners are negated, since the
//! camera looks down its local `-Z`.  For a perspective camera the corners
//! are rescaled to the vertex's own depth before the vertex is mapped
//! linearly between them, so the frustum cross-section is re-derived per
//! vertex.  Per-vertex coordinates are reduced to min/max and clamped to
//! `[0, 1]`.
//!
//! ## Known limitation
//!
//! Vertices behind the camera or outside the frustum are not discarded.
//! They still take part in the min/max before clamping, so a mesh that
//! straddles the camera plane can produce an oversized box.  A perspective
//! mesh lying entirely behind the camera gets a mirrored box of its own:
//! the negative depth flips the scaled frame, and the result lands inside
//! `[0, 1]` as if the object were in front.

use dropset_core::{CameraFrame, Instance, RenderSettings};
use glam::{Mat4, Vec2, Vec3};

use crate::bbox::NormalizedBox;

/// Negated view-frame corners (top-right, bottom-right, bottom-left) used
/// as the interpolation reference.
pub type FrameReference = [Vec3; 3];

/// Snapshot of the camera taken once per projected object.
#[derive(Debug, Clone, Copy)]
pub struct CameraSnapshot {
    pub world_to_camera: Mat4,
    pub frame: FrameReference,
    pub perspective: bool,
}

impl CameraSnapshot {
    pub fn new(camera: &CameraFrame, render: &RenderSettings) -> Self {
        let corners = camera.view_frame(render);
        Self {
            world_to_camera: camera.world_to_camera(),
            frame: [-corners[0], -corners[1], -corners[2]],
            perspective: camera.is_perspective(),
        }
    }
}

/// Map one camera-space point to normalized frame coordinates.
///
/// A perspective point at exactly zero depth maps to the frame centre.
pub fn project_point(co: Vec3, frame: &FrameReference, perspective: bool) -> Vec2 {
    let z = -co.z;
    let frame = if perspective {
        if z == 0.0 {
            return Vec2::splat(0.5);
        }
        frame.map(|v| v / (v.z / z))
    } else {
        *frame
    };

    let (min_x, max_x) = (frame[1].x, frame[2].x);
    let (min_y, max_y) = (frame[0].y, frame[1].y);
    Vec2::new(
        (co.x - min_x) / (max_x - min_x),
        (co.y - min_y) / (max_y - min_y),
    )
}

/// Normalized box of `positions` (object-local) placed by `object_to_world`.
///
/// Returns [`NormalizedBox::ZERO`] for an empty vertex list.
pub fn project_vertices(
    snapshot: &CameraSnapshot,
    object_to_world: &Mat4,
    positions: &[Vec3],
) -> NormalizedBox {
    if positions.is_empty() {
        return NormalizedBox::ZERO;
    }
    let to_camera = snapshot.world_to_camera * *object_to_world;

    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for p in positions {
        let uv = project_point(
            to_camera.transform_point3(*p),
            &snapshot.frame,
            snapshot.perspective,
        );
        min = min.min(uv);
        max = max.max(uv);
    }
    NormalizedBox::clamped(min, max)
}

/// Camera-view bounds of a placed instance.
pub fn camera_view_bounds(
    camera: &CameraFrame,
    render: &RenderSettings,
    instance: &Instance,
) -> NormalizedBox {
    let snapshot = CameraSnapshot::new(camera, render);
    project_vertices(
        &snapshot,
        &instance.transform().matrix(),
        instance.mesh().positions(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::PixelBox;
    use dropset_core::{Mesh, Projection, Transform};

    const SQUARE: RenderSettings = RenderSettings {
        resolution_x: 200,
        resolution_y: 200,
        percentage: 100,
    };

    fn top_down_ortho(scale: f32) -> CameraFrame {
        CameraFrame {
            transform: Transform::from_position(Vec3::new(0.0, 0.0, 10.0)),
            projection: Projection::Orthographic { scale },
            ..Default::default()
        }
    }

    fn top_down_persp(height: f32) -> CameraFrame {
        CameraFrame {
            transform: Transform::from_position(Vec3::new(0.0, 0.0, height)),
            projection: Projection::Perspective {
                lens: 50.0,
                sensor_width: 36.0,
                sensor_height: 24.0,
            },
            ..Default::default()
        }
    }

    fn cube_box(camera: &CameraFrame, at: Vec3) -> NormalizedBox {
        let snap = CameraSnapshot::new(camera, &SQUARE);
        let mesh = Mesh::cube(0.5);
        project_vertices(&snap, &Mat4::from_translation(at), mesh.positions())
    }

    #[test]
    fn ortho_unit_cube_covers_a_quarter_of_the_frame() {
        let b = cube_box(&top_down_ortho(4.0), Vec3::ZERO);
        assert!((b.min_x - 0.375).abs() < 1e-6);
        assert!((b.max_x - 0.625).abs() < 1e-6);
        assert!((b.min_y - 0.375).abs() < 1e-6);
        assert!((b.max_y - 0.625).abs() < 1e-6);
        assert_eq!(
            b.to_pixels(SQUARE.effective_size()),
            PixelBox::from([75, 75, 50, 50])
        );
    }

    #[test]
    fn ortho_boxes_translate_without_resizing() {
        let cam = top_down_ortho(4.0);
        let a = cube_box(&cam, Vec3::ZERO).to_pixels(SQUARE.effective_size());
        let b = cube_box(&cam, Vec3::new(1.0, 0.0, 0.0)).to_pixels(SQUARE.effective_size());
        assert_eq!((a.width, a.height), (b.width, b.height));
        // one world unit = 200 px / 4 units
        assert_eq!(b.x - a.x, 50);
        assert_eq!(a.y, b.y);
    }

    #[test]
    fn ortho_box_ignores_depth() {
        let cam = top_down_ortho(4.0);
        let near = cube_box(&cam, Vec3::new(0.0, 0.0, 5.0));
        let far = cube_box(&cam, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(near, far);
    }

    #[test]
    fn perspective_box_is_centred_and_grows_when_closer() {
        let far = cube_box(&top_down_persp(10.0), Vec3::ZERO);
        let near = cube_box(&top_down_persp(4.0), Vec3::ZERO);
        assert!((far.min_x + far.max_x - 1.0).abs() < 1e-5);
        assert!((far.min_y + far.max_y - 1.0).abs() < 1e-5);
        assert!(near.width() > far.width());
    }

    #[test]
    fn perspective_matches_pinhole_model() {
        // half frame width at distance d is 0.5 * d / (lens / sensor)
        let b = cube_box(&top_down_persp(10.0), Vec3::ZERO);
        let k = 50.0 / 36.0;
        // widest extent comes from the top face at distance 9.5
        let expected = 0.5 + 0.5 / (2.0 * 0.5 * 9.5 / k);
        assert!((b.max_x - expected).abs() < 1e-5, "{} vs {}", b.max_x, expected);
    }

    #[test]
    fn fully_outside_frustum_collapses_to_zero() {
        // far to the left of and below the view
        let b = cube_box(&top_down_persp(10.0), Vec3::new(-100.0, -100.0, 0.0));
        assert_eq!(b, NormalizedBox::ZERO);
        assert_eq!(b.to_pixels(SQUARE.effective_size()), PixelBox::ZERO);
    }

    #[test]
    fn fully_outside_frustum_top_right_collapses_to_zero() {
        let b = cube_box(&top_down_persp(10.0), Vec3::new(100.0, 100.0, 0.0));
        assert_eq!(
            b,
            NormalizedBox {
                min_x: 1.0,
                min_y: 1.0,
                max_x: 1.0,
                max_y: 1.0,
            }
        );
        assert_eq!(b.to_pixels(SQUARE.effective_size()), PixelBox::ZERO);
    }

    #[test]
    fn mesh_behind_perspective_camera_still_gets_a_mirrored_box() {
        // camera at z=10 looking down, cube at z=20 above it
        let b = cube_box(&top_down_persp(10.0), Vec3::new(0.0, 0.0, 20.0));
        assert!((b.min_x + b.max_x - 1.0).abs() < 1e-5);
        assert!(b.width() > 0.0 && b.width() < 1.0);
        assert_eq!(
            b.to_pixels(SQUARE.effective_size()),
            PixelBox::from([85, 85, 29, 29])
        );
    }

    #[test]
    fn zero_depth_vertex_maps_to_centre() {
        let snap = CameraSnapshot::new(&top_down_persp(10.0), &SQUARE);
        let uv = project_point(Vec3::new(3.0, -2.0, 0.0), &snap.frame, true);
        assert_eq!(uv, Vec2::splat(0.5));
    }

    #[test]
    fn camera_scale_does_not_change_the_box() {
        let mut cam = top_down_ortho(4.0);
        let plain = cube_box(&cam, Vec3::ZERO);
        cam.transform.scale = Vec3::splat(3.0);
        assert_eq!(cube_box(&cam, Vec3::ZERO), plain);
    }

    #[test]
    fn empty_mesh_projects_to_zero() {
        let snap = CameraSnapshot::new(&top_down_ortho(4.0), &SQUARE);
        assert_eq!(project_vertices(&snap, &Mat4::IDENTITY, &[]), NormalizedBox::ZERO);
    }
}
