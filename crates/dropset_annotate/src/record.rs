//! One annotation record per processed frame.

use dropset_core::SceneContext;
use serde::{Deserialize, Serialize};

use crate::bbox::PixelBox;
use crate::error::AnnotateError;
use crate::projection::camera_view_bounds;

/// Boxes, instance indices and class indices of every active instance at
/// one frame.  The three lists are parallel and follow instance index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(rename = "frame_id")]
    pub frame: u32,
    /// Class vocabulary of the run, in template order.
    pub classes: Vec<String>,
    pub boxes: Vec<PixelBox>,
    #[serde(rename = "index")]
    pub indices: Vec<u32>,
    #[serde(rename = "class")]
    pub class_ids: Vec<usize>,
}

impl FrameRecord {
    /// Project every active instance of `scene` with its current transform.
    ///
    /// Call after the scene has been moved to `frame` and rendered.
    pub fn capture(scene: &SceneContext, frame: u32) -> Result<Self, AnnotateError> {
        let size = scene.render.effective_size();

        let mut record = Self {
            frame,
            classes: scene.vocabulary(),
            boxes: Vec::with_capacity(scene.len()),
            indices: Vec::with_capacity(scene.len()),
            class_ids: Vec::with_capacity(scene.len()),
        };
        for inst in scene.instances() {
            let class = scene
                .class_index(inst.name())
                .ok_or_else(|| AnnotateError::UnknownClass(inst.name().to_string()))?;
            let normalized = camera_view_bounds(&scene.camera, &scene.render, inst);
            record.boxes.push(normalized.to_pixels(size));
            record.indices.push(inst.index());
            record.class_ids.push(class);
        }
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// `(class label, instance index, box)` triples in record order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32, PixelBox)> + '_ {
        self.class_ids
            .iter()
            .zip(&self.indices)
            .zip(&self.boxes)
            .map(|((&c, &i), &b)| (self.classes.get(c).map_or("?", String::as_str), i, b))
    }
}
