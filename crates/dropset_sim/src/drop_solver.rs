//! Minimal built-in rigid-body solver.
//!
//! Bodies fall straight down under gravity without rotating.  A body whose
//! centre is above the footprint of a static body, or of a dynamic body
//! that already came to rest, lands on the highest such top face below it;
//! anything else keeps falling until the bake ends.  Good enough to drive
//! the pipeline headless and in tests; real scenes use an external engine.

use std::collections::HashMap;

use dropset_core::{Aabb, Transform};
use glam::Vec2;
use log::debug;

use crate::physics::{BodyDesc, BodyKind, PhysicsBackend};

#[derive(Debug)]
pub struct DropSolver {
    available: bool,
    initialized: bool,
    /// Downward acceleration in world units per second².
    pub gravity: f32,
    /// Simulation frames per second.
    pub fps: f32,
    bodies: Vec<BodyDesc>,
    tracks: HashMap<u32, Vec<Transform>>,
    first_frame: u32,
}

impl Default for DropSolver {
    fn default() -> Self {
        Self {
            available: true,
            initialized: false,
            gravity: 9.81,
            fps: 24.0,
            bodies: Vec::new(),
            tracks: HashMap::new(),
            first_frame: 1,
        }
    }
}

impl DropSolver {
    /// A solver that refuses to initialise, standing in for a missing engine.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// Number of registered bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Height of the highest resting top face under `centre` that is not
    /// above `bottom`.
    fn support_height(resting: &[Aabb], centre: Vec2, bottom: f32) -> Option<f32> {
        resting
            .iter()
            .filter(|b| {
                centre.x >= b.min.x
                    && centre.x <= b.max.x
                    && centre.y >= b.min.y
                    && centre.y <= b.max.y
                    && b.max.z <= bottom + 1e-5
            })
            .map(|b| b.max.z)
            .reduce(f32::max)
    }
}

impl PhysicsBackend for DropSolver {
    fn name(&self) -> &str {
        "drop-solver"
    }

    fn initialize(&mut self) -> Result<(), String> {
        if !self.available {
            return Err("no rigid-body engine is linked into this build".into());
        }
        self.initialized = true;
        Ok(())
    }

    fn clear_cache(&mut self) {
        self.bodies.clear();
        self.tracks.clear();
    }

    fn register_body(&mut self, body: BodyDesc) -> Result<(), String> {
        if !self.initialized {
            return Err("solver not initialised".into());
        }
        if self.bodies.iter().any(|b| b.id == body.id) {
            return Err(format!("body {} registered twice", body.id));
        }
        self.bodies.push(body);
        Ok(())
    }

    fn bake_to_frame(&mut self, start: u32, end: u32) -> Result<(), String> {
        if end < start {
            return Err(format!("empty frame range {}..={}", start, end));
        }
        self.first_frame = start;
        self.tracks.clear();

        let mut resting: Vec<Aabb> = self
            .bodies
            .iter()
            .filter(|b| b.kind == BodyKind::Static)
            .map(BodyDesc::world_bounds)
            .collect();

        // lower bodies land first so they can support the ones above
        let mut dynamic: Vec<&BodyDesc> = self
            .bodies
            .iter()
            .filter(|b| b.kind == BodyKind::Dynamic)
            .collect();
        dynamic.sort_by(|a, b| a.world_bounds().min.z.total_cmp(&b.world_bounds().min.z));

        for body in dynamic {
            let bounds = body.world_bounds();
            let start_z = body.transform.position.z;
            let rest_z = Self::support_height(&resting, bounds.center().truncate(), bounds.min.z)
                .map(|top| start_z - (bounds.min.z - top));

            let track: Vec<Transform> = (start..=end)
                .map(|frame| {
                    let t = (frame - start) as f32 / self.fps;
                    let mut z = start_z - 0.5 * self.gravity * t * t;
                    if let Some(rest) = rest_z {
                        z = z.max(rest);
                    }
                    let mut pose = body.transform;
                    pose.position.z = z;
                    pose
                })
                .collect();

            if let Some(last) = track.last() {
                if rest_z.is_some() {
                    resting.push(body.local_bounds.transform(&last.matrix()));
                }
                debug!("body {} ends at z={:.3}", body.id, last.position.z);
            }
            self.tracks.insert(body.id, track);
        }
        Ok(())
    }

    fn body_transform(&self, id: u32, frame: u32) -> Option<Transform> {
        if let Some(track) = self.tracks.get(&id) {
            let i = frame.saturating_sub(self.first_frame) as usize;
            return track.get(i.min(track.len().saturating_sub(1))).copied();
        }
        self.bodies
            .iter()
            .find(|b| b.id == id && b.kind == BodyKind::Static)
            .map(|b| b.transform)
    }
}
