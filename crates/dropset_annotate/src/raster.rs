//! Reference render backend: flat-shaded projected boxes.
//!
//! Each active instance is drawn as a filled rectangle covering its
//! projected box, farthest first, coloured by class.  Useful to eyeball a
//! dataset's annotations without a full renderer attached.
//!
//! Mattes are binary masks of the same projected boxes, one per instance.

use std::path::{Path, PathBuf};

use dropset_core::{Instance, SceneContext};
use image::{GrayImage, Luma, Rgb, RgbImage};
use log::debug;

use crate::backend::RenderBackend;
use crate::bbox::PixelBox;
use crate::color::Color;
use crate::projection::{project_vertices, CameraSnapshot};

#[derive(Debug, Clone)]
pub struct BoxRasterizer {
    pub background: Color,
    /// Draw a darker one-pixel outline around every box.
    pub outline: bool,
}

impl Default for BoxRasterizer {
    fn default() -> Self {
        Self {
            background: Color::DARK_GRAY,
            outline: true,
        }
    }
}

impl BoxRasterizer {
    /// Rasterize `scene` into an in-memory image.
    pub fn draw(&self, scene: &SceneContext) -> RgbImage {
        let (w, h) = image_size(scene);
        let mut img = RgbImage::from_pixel(w, h, Rgb(self.background.to_array()));

        let snapshot = CameraSnapshot::new(&scene.camera, &scene.render);
        let mut layers: Vec<(f32, usize, _)> = scene
            .instances()
            .map(|inst| {
                let depth = -snapshot
                    .world_to_camera
                    .transform_point3(inst.transform().position)
                    .z;
                (depth, inst.template(), pixel_box(scene, &snapshot, inst))
            })
            .collect();
        layers.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, class, b) in layers {
            if b.is_degenerate() {
                continue;
            }
            let fill = Color::for_class(class);
            let edge = fill.brighten(0.5);
            let x1 = (b.x + b.width).min(w);
            let y1 = (b.y + b.height).min(h);
            for y in b.y.min(h)..y1 {
                for x in b.x.min(w)..x1 {
                    let border = x == b.x || y == b.y || x + 1 == x1 || y + 1 == y1;
                    let c = if self.outline && border { edge } else { fill };
                    img.put_pixel(x, y, Rgb(c.to_array()));
                }
            }
        }
        img
    }

    /// Binary mask of one instance's projected box.  Occlusion is ignored.
    pub fn draw_matte(&self, scene: &SceneContext, instance: &Instance) -> GrayImage {
        let (w, h) = image_size(scene);
        let snapshot = CameraSnapshot::new(&scene.camera, &scene.render);
        let b = pixel_box(scene, &snapshot, instance);
        GrayImage::from_fn(w, h, |x, y| {
            let inside = x >= b.x && x < b.x + b.width && y >= b.y && y < b.y + b.height;
            Luma([if inside { 255 } else { 0 }])
        })
    }
}

fn image_size(scene: &SceneContext) -> (u32, u32) {
    let size = scene.render.effective_size();
    (size.x.round() as u32, size.y.round() as u32)
}

fn pixel_box(scene: &SceneContext, snapshot: &CameraSnapshot, inst: &Instance) -> PixelBox {
    project_vertices(snapshot, &inst.transform().matrix(), inst.mesh().positions())
        .to_pixels(scene.render.effective_size())
}

impl RenderBackend for BoxRasterizer {
    fn name(&self) -> &str {
        "box-rasterizer"
    }

    fn render_frame(&mut self, scene: &SceneContext, frame: u32, path: &Path) -> Result<(), String> {
        let img = self.draw(scene);
        img.save(path).map_err(|e| e.to_string())?;
        debug!("frame {} rendered to {}", frame, path.display());
        Ok(())
    }

    fn render_mattes(
        &mut self,
        scene: &SceneContext,
        frame: u32,
        mattes: &[(u32, PathBuf)],
    ) -> Result<(), String> {
        for (index, path) in mattes {
            let inst = scene
                .get(*index)
                .ok_or_else(|| format!("no active instance {index}"))?;
            self.draw_matte(scene, inst)
                .save(path)
                .map_err(|e| format!("{}: {e}", path.display()))?;
        }
        debug!("frame {}: {} mattes written", frame, mattes.len());
        Ok(())
    }
}
