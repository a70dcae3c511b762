use glam::{Mat4, Vec2, Vec3};

use crate::transform::Transform;

/// How the camera maps onto the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorFit {
    /// Fit the sensor to the larger render dimension.
    #[default]
    Auto,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Pinhole camera.  `lens` is the focal length, sensor sizes share its unit (mm).
    Perspective {
        lens: f32,
        sensor_width: f32,
        sensor_height: f32,
    },
    /// Parallel projection; `scale` is the view width along the fitted axis.
    Orthographic { scale: f32 },
}

/// Output image size.  The effective size is `resolution * percentage / 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub resolution_x: u32,
    pub resolution_y: u32,
    pub percentage: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution_x: 1920,
            resolution_y: 1080,
            percentage: 100,
        }
    }
}

impl RenderSettings {
    /// Effective pixel dimensions after applying the percentage factor.
    pub fn effective_size(&self) -> Vec2 {
        let fac = self.percentage as f32 * 0.01;
        Vec2::new(self.resolution_x as f32 * fac, self.resolution_y as f32 * fac)
    }

    /// Per-axis aspect factors; the fitted axis gets 1.0.
    fn aspect(&self, fit: SensorFit) -> Vec2 {
        let (x, y) = (self.resolution_x as f32, self.resolution_y as f32);
        let horizontal = match fit {
            SensorFit::Auto => x > y,
            SensorFit::Horizontal => true,
            SensorFit::Vertical => false,
        };
        if horizontal {
            Vec2::new(1.0, y / x)
        } else {
            Vec2::new(x / y, 1.0)
        }
    }
}

/// Camera state consumed by the projection step.
///
/// Cheap to copy; the projection snapshots it once per object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub transform: Transform,
    pub projection: Projection,
    pub sensor_fit: SensorFit,
    /// Lens shift in units of the fitted frame dimension.
    pub shift: Vec2,
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            projection: Projection::Perspective {
                lens: 50.0,
                sensor_width: 36.0,
                sensor_height: 24.0,
            },
            sensor_fit: SensorFit::Auto,
            shift: Vec2::ZERO,
        }
    }
}

impl CameraFrame {
    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective { .. })
    }

    /// World → camera-local matrix.  Scale is stripped before inversion.
    pub fn world_to_camera(&self) -> Mat4 {
        self.transform.normalized_matrix().inverse()
    }

    /// Camera-space corners of the view frame, ordered top-right,
    /// bottom-right, bottom-left, top-left.
    ///
    /// Perspective frames sit at depth `-lens / sensor` with a half-size of
    /// `0.5` on the fitted axis, i.e. the frustum cross-section at that
    /// depth.  Orthographic frames sit at depth `-1` and span the view
    /// rectangle.
    pub fn view_frame(&self, render: &RenderSettings) -> [Vec3; 4] {
        let asp = render.aspect(self.sensor_fit);
        let (half, depth, shift) = match self.projection {
            Projection::Orthographic { scale } => {
                (0.5 * scale * asp, -1.0, self.shift * scale)
            }
            Projection::Perspective {
                lens,
                sensor_width,
                sensor_height,
            } => {
                let sensor = match self.sensor_fit {
                    SensorFit::Vertical => sensor_height,
                    _ => sensor_width,
                };
                let fac = 0.5;
                (fac * asp, fac * lens / -(0.5 * sensor), self.shift * 2.0 * fac)
            }
        };
        [
            Vec3::new(shift.x + half.x, shift.y + half.y, depth),
            Vec3::new(shift.x + half.x, shift.y - half.y, depth),
            Vec3::new(shift.x - half.x, shift.y - half.y, depth),
            Vec3::new(shift.x - half.x, shift.y + half.y, depth),
        ]
    }
}
