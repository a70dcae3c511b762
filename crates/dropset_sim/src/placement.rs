//! Retry-bounded scatter placement.
//!
//! Every new instance gets a random template, then up to `retry_budget`
//! random poses above the support region.  The first pose whose bounds do
//! not collide with any already-placed instance wins; when the budget runs
//! out the last sampled pose is kept anyway.  Placement therefore lowers the
//! collision rate but never guarantees separation.

use dropset_core::{SceneContext, Transform};
use glam::Vec3;
use log::{debug, info, warn};
use rand::Rng;

use crate::error::SimError;
use crate::support::{uniform, SupportRegion};

/// Parameters for one placement pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Number of instances to create.
    pub count: usize,
    /// Pose attempts per instance.  At least one pose is always sampled.
    pub retry_budget: u32,
    /// Height of the drop band above the surface's top face.
    pub drop_height: f32,
    /// Per-axis Euler angle range `[min, max]` in radians (X, Y, Z).
    pub rotation_range: [[f32; 2]; 3],
}

impl Default for PlacementConfig {
    fn default() -> Self {
        let quarter = std::f32::consts::FRAC_PI_2;
        Self {
            count: 30,
            retry_budget: 10,
            drop_height: 0.5,
            rotation_range: [[-quarter, quarter]; 3],
        }
    }
}

/// Outcome of a placement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Indices of the created instances, in creation order.
    pub placed: Vec<u32>,
    /// Instances that kept a colliding pose after exhausting the budget.
    pub exhausted: Vec<u32>,
}

/// Scatter `config.count` template copies above `region`.
///
/// Templates are drawn up front, so the instance index order matches the
/// template selection order.
pub fn place<R: Rng + ?Sized>(
    scene: &mut SceneContext,
    region: &SupportRegion,
    config: &PlacementConfig,
    rng: &mut R,
) -> Result<PlacementReport, SimError> {
    let pool = scene.templates().len();
    let choice: Vec<usize> = (0..config.count).map(|_| rng.gen_range(0..pool)).collect();
    debug!("template choice: {:?}", choice);

    let mut report = PlacementReport::default();
    for template in choice {
        let index = scene.spawn(template)?.build();
        let attempts = config.retry_budget.max(1);

        let mut clear = false;
        for attempt in 0..attempts {
            let pose = sample_pose(scene, index, region, config, rng);
            scene.set_transform(index, pose)?;
            clear = !collides_with_others(scene, index);
            debug!(
                "instance {} attempt {}: pos={:?} clear={}",
                index, attempt, pose.position, clear
            );
            if clear {
                break;
            }
        }

        if !clear {
            warn!(
                "instance {} still collides after {} attempts; keeping last pose",
                index, attempts
            );
            report.exhausted.push(index);
        }
        report.placed.push(index);
    }

    info!(
        "placed {} instances ({} with exhausted retries)",
        report.placed.len(),
        report.exhausted.len()
    );
    Ok(report)
}

/// Random pose for `index`: XY inside the region, Z in the drop band lifted
/// so that the rotated bounds start on or above the band, Euler angles
/// within the configured ranges.
fn sample_pose<R: Rng + ?Sized>(
    scene: &SceneContext,
    index: u32,
    region: &SupportRegion,
    config: &PlacementConfig,
    rng: &mut R,
) -> Transform {
    let xy = region.sample_xy(rng);
    let drop = uniform(rng, region.top, region.top + config.drop_height);
    let [rx, ry, rz] = config.rotation_range;
    let euler = Vec3::new(
        uniform(rng, rx[0], rx[1]),
        uniform(rng, ry[0], ry[1]),
        uniform(rng, rz[0], rz[1]),
    );

    let mut pose = Transform::from_euler_xyz(Vec3::ZERO, euler);
    let lift = scene
        .get(index)
        .map(|inst| {
            pose.scale = inst.transform().scale;
            -inst.mesh().local_bounds().transform(&pose.matrix()).min.z
        })
        .unwrap_or(0.0);
    pose.position = Vec3::new(xy.x, xy.y, drop + lift);
    pose
}

/// Test the instance's current bounds against every other active instance.
fn collides_with_others(scene: &SceneContext, index: u32) -> bool {
    let Some(candidate) = scene.get(index).map(|i| i.world_bounds()) else {
        return false;
    };
    scene
        .instances()
        .filter(|other| other.index() != index)
        .any(|other| candidate.collides(&other.world_bounds()))
}

/// Convert a per-axis `[min, max]` range in degrees to radians.
pub fn degrees_to_radians(range: [[f32; 2]; 3]) -> [[f32; 2]; 3] {
    range.map(|[lo, hi]| [lo.to_radians(), hi.to_radians()])
}
