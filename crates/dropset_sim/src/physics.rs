//! Physics adapter: hands placed instances to an external rigid-body
//! engine and reads back where they came to rest.
//!
//! The engine itself sits behind [`PhysicsBackend`]; the adapter only
//! sequences the calls:
//!
//! 1. initialise the engine (fail fast if it is missing),
//! 2. clear any cached simulation from a previous run,
//! 3. register the surface as a static body and every instance as a dynamic one,
//! 4. bake from frame 1 to the settle frame,
//! 5. write back settled transforms and drop instances that left the world.

use dropset_core::{Aabb, SceneContext, Transform};
use log::{debug, info, warn};

use crate::error::SimError;
use crate::support::SupportRegion;

/// Body id used for the static surface.  Instance indices start at 1.
pub const SURFACE_BODY: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Moved by the solver.
    Dynamic,
    /// Collides but never moves.
    Static,
}

/// Everything the engine needs to know about one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub id: u32,
    pub kind: BodyKind,
    pub transform: Transform,
    /// Object-local bounds used as the collision shape.
    pub local_bounds: Aabb,
}

impl BodyDesc {
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.transform(&self.transform.matrix())
    }
}

/// Rigid-body engine boundary.
///
/// Implementations are stateful and single-threaded; the adapter owns the
/// backend exclusively for the duration of a run.
pub trait PhysicsBackend {
    /// Short human-readable label used in logs.
    fn name(&self) -> &str;

    /// Bring the engine up.  An `Err` means the engine is unavailable.
    fn initialize(&mut self) -> Result<(), String>;

    /// Drop registered bodies and baked frames from a previous run.
    fn clear_cache(&mut self);

    fn register_body(&mut self, body: BodyDesc) -> Result<(), String>;

    /// Simulate and cache frames `start..=end`.
    fn bake_to_frame(&mut self, start: u32, end: u32) -> Result<(), String>;

    /// World transform of body `id` at `frame`, if the engine knows it.
    fn body_transform(&self, id: u32, frame: u32) -> Option<Transform>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Frame at which motion is considered final.
    pub settle_frame: u32,
    /// Extra room around the surface footprint before an instance counts as lost.
    pub margin: f32,
    /// Instances whose settled origin is below this height are lost.
    pub floor_z: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            settle_frame: 500,
            margin: 0.0,
            floor_z: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Instances still active after settling.
    pub settled: Vec<u32>,
    /// Instances removed because they ended outside the world bounds.
    pub culled: Vec<u32>,
}

/// First simulated frame of every bake.
pub const FIRST_FRAME: u32 = 1;

pub struct PhysicsAdapter<'a> {
    backend: &'a mut dyn PhysicsBackend,
    config: PhysicsConfig,
}

impl<'a> PhysicsAdapter<'a> {
    pub fn new(backend: &'a mut dyn PhysicsBackend, config: PhysicsConfig) -> Self {
        Self { backend, config }
    }

    /// Run the simulation to the settle frame and update `scene` in place.
    pub fn settle(
        &mut self,
        scene: &mut SceneContext,
        region: &SupportRegion,
    ) -> Result<SettleReport, SimError> {
        self.backend
            .initialize()
            .map_err(SimError::PhysicsUnavailable)?;
        self.backend.clear_cache();

        let surface = scene
            .surface()
            .ok_or_else(|| SimError::Configuration("scene has no surface object".into()))?;
        self.backend
            .register_body(BodyDesc {
                id: SURFACE_BODY,
                kind: BodyKind::Static,
                transform: surface.transform,
                local_bounds: surface.mesh.local_bounds(),
            })
            .map_err(SimError::PhysicsUnavailable)?;

        for inst in scene.instances() {
            self.backend
                .register_body(BodyDesc {
                    id: inst.index(),
                    kind: BodyKind::Dynamic,
                    transform: *inst.transform(),
                    local_bounds: inst.mesh().local_bounds(),
                })
                .map_err(SimError::PhysicsUnavailable)?;
        }

        let frame = self.config.settle_frame;
        info!(
            "baking {} bodies with {} to frame {}",
            scene.len() + 1,
            self.backend.name(),
            frame
        );
        self.backend
            .bake_to_frame(FIRST_FRAME, frame)
            .map_err(|reason| SimError::BakeFailed { frame, reason })?;

        let mut report = SettleReport::default();
        for index in scene.indices() {
            let settled = self
                .backend
                .body_transform(index, frame)
                .ok_or(SimError::MissingBody { index, frame })?;
            scene.set_transform(index, settled)?;

            if region.is_out_of_world(settled.position, self.config.margin, self.config.floor_z) {
                warn!(
                    "instance {} settled outside the world at {:?}; removing it",
                    index, settled.position
                );
                scene.despawn(index);
                report.culled.push(index);
            } else {
                debug!("instance {} settled at {:?}", index, settled.position);
                report.settled.push(index);
            }
        }
        Ok(report)
    }

    /// Move every active instance to its simulated pose at `frame`.
    ///
    /// Instances the engine has no data for keep their current transform.
    pub fn sync_frame(&self, scene: &mut SceneContext, frame: u32) -> Result<(), SimError> {
        for index in scene.indices() {
            if let Some(t) = self.backend.body_transform(index, frame) {
                scene.set_transform(index, t)?;
            }
        }
        Ok(())
    }
}
