//! Scene context, the explicit container for one generation run.
//!
//! `SceneContext` owns the template pool, the static surface, the camera and
//! every placed [`Instance`].  Instances are keyed by their instance index in
//! a `BTreeMap`, so iteration always follows placement order and indices
//! stay stable when other instances are removed.
//!
//! # Quick start
//! ```rust,ignore
//! use dropset_core::{Mesh, SceneContext, Template, Transform};
//! use glam::Vec3;
//!
//! let mut scene = SceneContext::new(vec![Template::new("Cube", Mesh::cube(0.5))])?;
//! let idx = scene.spawn(0)?
//!     .with_transform(Transform::from_position(Vec3::Z))
//!     .build();
//! scene.despawn(idx);
//! ```

use std::collections::BTreeMap;

use crate::aabb::Aabb;
use crate::camera::{CameraFrame, RenderSettings};
use crate::error::SceneError;
use crate::mesh::Mesh;
use crate::transform::Transform;

// ─── Templates ─────────────────────────────────────────────────────────────

/// Immutable prototype object.  Its name is the class label.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub mesh: Mesh,
}

impl Template {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
        }
    }
}

/// Part of an object name before the first `.`; copies are named
/// `<base>.<NNN>`.
pub fn base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

// ─── Scene objects ─────────────────────────────────────────────────────────

/// A named mesh with a world transform, used for the static surface.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub transform: Transform,
    pub mesh: Mesh,
}

impl Element {
    pub fn new(name: impl Into<String>, transform: Transform, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh,
        }
    }

    /// World-space bounds from the eight transformed local bound corners.
    pub fn world_bounds(&self) -> Aabb {
        self.mesh.local_bounds().transform(&self.transform.matrix())
    }
}

/// One placed copy of a [`Template`].
#[derive(Debug, Clone)]
pub struct Instance {
    index: u32,
    template: usize,
    name: String,
    transform: Transform,
    mesh: Mesh,
    bounds: Aabb,
}

impl Instance {
    /// Unique, monotonically assigned instance index (starts at 1).
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Position of the originating template in the pool.
    #[inline]
    pub fn template(&self) -> usize {
        self.template
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Cached world-space AABB for the current transform.
    #[inline]
    pub fn world_bounds(&self) -> Aabb {
        self.bounds
    }

    /// Replace the transform and refresh the cached bounds.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.bounds = self.mesh.local_bounds().transform(&transform.matrix());
    }
}

// ─── Instance builder ──────────────────────────────────────────────────────

/// Fluent builder returned by [`SceneContext::spawn`].
///
/// Call `.build()` to insert the instance and receive its index.
pub struct InstanceBuilder<'a> {
    scene: &'a mut SceneContext,
    template: usize,
    transform: Transform,
}

impl<'a> InstanceBuilder<'a> {
    pub fn with_transform(mut self, t: Transform) -> Self {
        self.transform = t;
        self
    }

    /// Assign the next index, name the copy and insert it.
    pub fn build(self) -> u32 {
        let scene = self.scene;
        let index = scene.next_index;
        scene.next_index += 1;

        scene.copies[self.template] += 1;
        let tpl = &scene.templates[self.template];
        let name = format!("{}.{:03}", tpl.name, scene.copies[self.template]);

        let mut instance = Instance {
            index,
            template: self.template,
            name,
            transform: self.transform,
            mesh: tpl.mesh.clone(),
            bounds: tpl.mesh.local_bounds(),
        };
        instance.set_transform(self.transform);
        scene.instances.insert(index, instance);
        index
    }
}

// ─── SceneContext ──────────────────────────────────────────────────────────

/// Everything a generation run reads and mutates.
///
/// Owned by the run loop and passed explicitly to every stage.
#[derive(Debug)]
pub struct SceneContext {
    templates: Vec<Template>,
    copies: Vec<u32>,
    surface: Option<Element>,
    instances: BTreeMap<u32, Instance>,
    next_index: u32,
    pub camera: CameraFrame,
    pub render: RenderSettings,
}

impl SceneContext {
    /// Creates a scene around a fixed template pool.
    ///
    /// Pool order defines the class indices.  Two templates whose names
    /// share a base name would be indistinguishable after suffix stripping,
    /// so that is rejected here.
    pub fn new(templates: Vec<Template>) -> Result<Self, SceneError> {
        if templates.is_empty() {
            return Err(SceneError::NoTemplates);
        }
        for (i, t) in templates.iter().enumerate() {
            let base = base_name(&t.name);
            if templates[..i].iter().any(|o| base_name(&o.name) == base) {
                return Err(SceneError::DuplicateTemplate(t.name.clone()));
            }
        }
        Ok(Self {
            copies: vec![0; templates.len()],
            templates,
            surface: None,
            instances: BTreeMap::new(),
            next_index: 1,
            camera: CameraFrame::default(),
            render: RenderSettings::default(),
        })
    }

    pub fn with_camera(mut self, camera: CameraFrame) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_render(mut self, render: RenderSettings) -> Self {
        self.render = render;
        self
    }

    pub fn with_surface(mut self, surface: Element) -> Self {
        self.surface = Some(surface);
        self
    }

    // ── Templates ──────────────────────────────────────────────────────────

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Class labels in pool order.
    pub fn vocabulary(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.name.clone()).collect()
    }

    /// Resolve an object name to its class index by base name.
    pub fn class_index(&self, name: &str) -> Option<usize> {
        let base = base_name(name);
        self.templates
            .iter()
            .position(|t| base_name(&t.name) == base)
    }

    // ── Surface ────────────────────────────────────────────────────────────

    pub fn surface(&self) -> Option<&Element> {
        self.surface.as_ref()
    }

    // ── Instances ──────────────────────────────────────────────────────────

    /// Begin placing a copy of template `template`.
    pub fn spawn(&mut self, template: usize) -> Result<InstanceBuilder<'_>, SceneError> {
        if template >= self.templates.len() {
            return Err(SceneError::UnknownTemplate(template));
        }
        Ok(InstanceBuilder {
            scene: self,
            template,
            transform: Transform::IDENTITY,
        })
    }

    /// Remove an instance from the active set.  Returns `true` if it existed.
    pub fn despawn(&mut self, index: u32) -> bool {
        self.instances.remove(&index).is_some()
    }

    pub fn get(&self, index: u32) -> Option<&Instance> {
        self.instances.get(&index)
    }

    pub fn set_transform(&mut self, index: u32, transform: Transform) -> Result<(), SceneError> {
        self.instances
            .get_mut(&index)
            .map(|i| i.set_transform(transform))
            .ok_or(SceneError::UnknownInstance(index))
    }

    pub fn contains(&self, index: u32) -> bool {
        self.instances.contains_key(&index)
    }

    /// Active instances in index order.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    /// Indices of the active instances, in order.
    pub fn indices(&self) -> Vec<u32> {
        self.instances.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────
