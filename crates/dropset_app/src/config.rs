//! Scene files.
//!
//! A scene file is TOML deserialized into [`GeneratorConfig`].  Only
//! `[camera]`, `[surface]` and at least one `[[templates]]` entry are
//! required; every other section falls back to its defaults.
//!
//! ```toml
//! [camera]
//! position = [0.0, 0.0, 10.0]
//! projection = { kind = "orthographic", scale = 4.0 }
//!
//! [surface]
//! position = [0.0, 0.0, -0.5]
//! size = [4.0, 4.0, 0.1]
//!
//! [[templates]]
//! name = "Cube"
//! mesh = { cuboid = [0.5, 0.5, 0.5] }
//! ```

use std::path::{Path, PathBuf};

use dropset_annotate::RecordFormat;
use dropset_core::{
    CameraFrame, Element, Mesh, Projection, RenderSettings, SceneContext, SceneError, SensorFit,
    Template, Transform,
};
use dropset_sim::{degrees_to_radians, PhysicsConfig, PlacementConfig};
use glam::{Vec2, Vec3};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read scene file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("invalid scene configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

// ─── Top level ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub placement: PlacementSection,
    #[serde(default)]
    pub physics: PhysicsSection,
    #[serde(default)]
    pub frames: FrameRange,
    #[serde(default)]
    pub render: RenderSection,
    pub camera: CameraSection,
    pub surface: SurfaceSection,
    pub templates: Vec<TemplateSection>,
    /// Directory relative mesh paths are resolved against.  Set by
    /// [`GeneratorConfig::load`] to the scene file's directory.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a scene file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut cfg = Self::from_toml_str(&text)?;
        cfg.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(cfg)
    }

    /// Reject settings the run loop cannot work with.
    ///
    /// A surface with zero footprint is caught later, when the support
    /// region is derived.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.templates.is_empty() {
            return invalid("at least one [[templates]] entry is required".into());
        }
        if self.output.format == RecordFormat::Legacy {
            // bare labels in a comma separated, bracket closed list
            let unreadable = |name: &str| name.contains(|c: char| c == ',' || c == ']');
            if let Some(t) = self.templates.iter().find(|t| unreadable(&t.name)) {
                return invalid(format!(
                    "template name '{}' cannot be written to a legacy annotation file",
                    t.name
                ));
            }
        }
        if self.frames.step == 0 {
            return invalid("frames.step must be at least 1".into());
        }
        if self.frames.end < self.frames.start {
            return invalid(format!(
                "frames.end ({}) is before frames.start ({})",
                self.frames.end, self.frames.start
            ));
        }
        let [w, h] = self.render.resolution;
        if w == 0 || h == 0 || self.render.percentage == 0 {
            return invalid(format!(
                "render size {}x{} at {}% is empty",
                w, h, self.render.percentage
            ));
        }
        if self.placement.drop_height < 0.0 {
            return invalid("placement.drop_height must not be negative".into());
        }
        for (axis, [lo, hi]) in ["x", "y", "z"].iter().zip(self.placement.rotation_range) {
            if lo > hi {
                return invalid(format!("placement.rotation_range {axis}: {lo} > {hi}"));
            }
        }
        if self.physics.settle_frame == 0 {
            return invalid("physics.settle_frame must be at least 1".into());
        }
        match self.camera.projection {
            ProjectionSection::Perspective {
                lens,
                sensor_width,
                sensor_height,
            } if lens <= 0.0 || sensor_width <= 0.0 || sensor_height <= 0.0 => {
                return invalid("camera lens and sensor sizes must be positive".into());
            }
            ProjectionSection::Orthographic { scale } if scale <= 0.0 => {
                return invalid("camera orthographic scale must be positive".into());
            }
            _ => {}
        }
        Ok(())
    }

    /// Build the scene the run starts from: templates, surface, camera and
    /// render settings, no instances yet.
    pub fn build_scene(&self) -> Result<SceneContext, ConfigError> {
        let templates = self
            .templates
            .iter()
            .map(|t| Ok(Template::new(&t.name, t.mesh.load(&self.base_dir)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(SceneContext::new(templates)?
            .with_surface(self.surface.element())
            .with_camera(self.camera.frame())
            .with_render(self.render.settings()))
    }

    pub fn placement_config(&self) -> PlacementConfig {
        let p = &self.placement;
        PlacementConfig {
            count: p.count,
            retry_budget: p.retry_budget,
            drop_height: p.drop_height,
            rotation_range: degrees_to_radians(p.rotation_range),
        }
    }

    pub fn physics_config(&self) -> PhysicsConfig {
        PhysicsConfig {
            settle_frame: self.physics.settle_frame,
            margin: self.physics.margin,
            floor_z: self.physics.floor_z,
        }
    }

    /// Where the annotation stream goes.
    pub fn annotation_path(&self) -> PathBuf {
        let name = match &self.output.annotations {
            Some(name) => name.clone(),
            None => format!("bounds_2d.{}", self.output.format.extension()),
        };
        self.output.directory.join(name)
    }

    /// Image path for `frame`: `<prefix><frame>.<ext>`.
    pub fn image_path(&self, frame: u32) -> PathBuf {
        self.output.directory.join(format!(
            "{}{}.{}",
            self.output.image_prefix,
            self.padded_frame(frame),
            self.output.image_extension
        ))
    }

    /// Matte path of the instance called `object` at `frame`.
    pub fn matte_path(&self, object: &str, frame: u32) -> PathBuf {
        self.output
            .directory
            .join(format!("{}_matte{}.png", object, self.padded_frame(frame)))
    }

    /// Frame number zero-padded to one digit more than it needs, or than
    /// the last frame needs when `pad_to_last_frame` is set.
    fn padded_frame(&self, frame: u32) -> String {
        let digits = if self.output.pad_to_last_frame {
            self.frames.end.max(frame)
        } else {
            frame
        };
        let width = digits.to_string().len() + 1;
        format!("{:0width$}", frame)
    }
}

// ─── Sections ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Annotation file name inside `directory`; derived from the format
    /// when absent.
    pub annotations: Option<String>,
    pub format: RecordFormat,
    pub image_prefix: String,
    pub image_extension: String,
    /// Pad every frame number to the width of the last one, so file names
    /// sort in frame order.
    pub pad_to_last_frame: bool,
    /// Write one matte per active instance next to every image.
    pub mattes: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            annotations: None,
            format: RecordFormat::Legacy,
            image_prefix: "frame_".into(),
            image_extension: "png".into(),
            pad_to_last_frame: false,
            mattes: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementSection {
    pub count: usize,
    pub retry_budget: u32,
    pub drop_height: f32,
    /// Per-axis `[min, max]` in degrees.
    pub rotation_range: [[f32; 2]; 3],
    pub seed: Option<u64>,
}

impl Default for PlacementSection {
    fn default() -> Self {
        let d = PlacementConfig::default();
        Self {
            count: d.count,
            retry_budget: d.retry_budget,
            drop_height: d.drop_height,
            rotation_range: [[-90.0, 90.0]; 3],
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsSection {
    pub settle_frame: u32,
    pub margin: f32,
    pub floor_z: f32,
    /// Keep the settled poses for every frame instead of replaying the
    /// simulation frame by frame.
    pub freeze_after_settle: bool,
}

impl Default for PhysicsSection {
    fn default() -> Self {
        let d = PhysicsConfig::default();
        Self {
            settle_frame: d.settle_frame,
            margin: d.margin,
            floor_z: d.floor_z,
            freeze_after_settle: true,
        }
    }
}

/// Inclusive frame range walked by the annotation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameRange {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl Default for FrameRange {
    fn default() -> Self {
        Self {
            start: 1,
            end: 1,
            step: 1,
        }
    }
}

impl FrameRange {
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        (self.start..=self.end).step_by(self.step.max(1) as usize)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub resolution: [u32; 2],
    pub percentage: u32,
}

impl Default for RenderSection {
    fn default() -> Self {
        let d = RenderSettings::default();
        Self {
            resolution: [d.resolution_x, d.resolution_y],
            percentage: d.percentage,
        }
    }
}

impl RenderSection {
    pub fn settings(&self) -> RenderSettings {
        RenderSettings {
            resolution_x: self.resolution[0],
            resolution_y: self.resolution[1],
            percentage: self.percentage,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraSection {
    pub position: [f32; 3],
    /// XYZ Euler angles in degrees.  Ignored when `target` is set.
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Point the camera at this location instead (world +Z up).
    #[serde(default)]
    pub target: Option<[f32; 3]>,
    #[serde(default)]
    pub projection: ProjectionSection,
    #[serde(default)]
    pub sensor_fit: SensorFitSection,
    #[serde(default)]
    pub shift: [f32; 2],
}

impl CameraSection {
    pub fn frame(&self) -> CameraFrame {
        let position = Vec3::from(self.position);
        let transform = match self.target {
            Some(target) => Transform::looking_at(position, Vec3::from(target), Vec3::Z),
            None => Transform::from_euler_xyz(
                position,
                Vec3::from(self.rotation.map(f32::to_radians)),
            ),
        };
        CameraFrame {
            transform,
            projection: self.projection.into(),
            sensor_fit: self.sensor_fit.into(),
            shift: Vec2::from(self.shift),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionSection {
    Perspective {
        #[serde(default = "default_lens")]
        lens: f32,
        #[serde(default = "default_sensor_width")]
        sensor_width: f32,
        #[serde(default = "default_sensor_height")]
        sensor_height: f32,
    },
    Orthographic {
        scale: f32,
    },
}

fn default_lens() -> f32 {
    50.0
}

fn default_sensor_width() -> f32 {
    36.0
}

fn default_sensor_height() -> f32 {
    24.0
}

impl Default for ProjectionSection {
    fn default() -> Self {
        ProjectionSection::Perspective {
            lens: default_lens(),
            sensor_width: default_sensor_width(),
            sensor_height: default_sensor_height(),
        }
    }
}

impl From<ProjectionSection> for Projection {
    fn from(p: ProjectionSection) -> Self {
        match p {
            ProjectionSection::Perspective {
                lens,
                sensor_width,
                sensor_height,
            } => Projection::Perspective {
                lens,
                sensor_width,
                sensor_height,
            },
            ProjectionSection::Orthographic { scale } => Projection::Orthographic { scale },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFitSection {
    #[default]
    Auto,
    Horizontal,
    Vertical,
}

impl From<SensorFitSection> for SensorFit {
    fn from(s: SensorFitSection) -> Self {
        match s {
            SensorFitSection::Auto => SensorFit::Auto,
            SensorFitSection::Horizontal => SensorFit::Horizontal,
            SensorFitSection::Vertical => SensorFit::Vertical,
        }
    }
}

/// The static support object, modelled as a box.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceSection {
    #[serde(default = "default_surface_name")]
    pub name: String,
    pub position: [f32; 3],
    /// Full extents along X, Y, Z.
    pub size: [f32; 3],
}

fn default_surface_name() -> String {
    "Surface".into()
}

impl SurfaceSection {
    pub fn element(&self) -> Element {
        Element::new(
            &self.name,
            Transform::from_position(Vec3::from(self.position)),
            Mesh::cuboid(Vec3::from(self.size) * 0.5),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateSection {
    pub name: String,
    pub mesh: MeshSource,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshSource {
    /// Axis-aligned box given by its half extents.
    Cuboid([f32; 3]),
    /// Raw vertex positions.
    Vertices(Vec<[f32; 3]>),
    /// Wavefront OBJ file, relative to the scene file.
    Obj(PathBuf),
}

impl MeshSource {
    pub fn load(&self, base_dir: &Path) -> Result<Mesh, ConfigError> {
        match self {
            MeshSource::Cuboid(half) => Ok(Mesh::cuboid(Vec3::from(*half))),
            MeshSource::Vertices(points) => Ok(Mesh::from_positions(
                points.iter().copied().map(Vec3::from).collect(),
            )?),
            #[cfg(feature = "obj")]
            MeshSource::Obj(path) => Ok(Mesh::load_obj(&base_dir.join(path))?),
            #[cfg(not(feature = "obj"))]
            MeshSource::Obj(path) => Err(ConfigError::Invalid(format!(
                "{} needs the `obj` feature",
                base_dir.join(path).display()
            ))),
        }
    }
}
