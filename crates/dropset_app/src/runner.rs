use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use dropset_annotate::{AnnotateError, AnnotationWriter, FrameRecord, RenderBackend};
use dropset_sim::{place, PhysicsAdapter, PhysicsBackend, SupportRegion};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GeneratorConfig;

/// What a finished (or interrupted) run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Instances created by placement.
    pub placed: usize,
    /// Instances that kept a colliding pose.
    pub exhausted: Vec<u32>,
    /// Instances removed after settling.
    pub culled: Vec<u32>,
    pub frames_written: usize,
    /// Set when the interrupt flag stopped the frame loop early.
    pub interrupted: bool,
    pub annotation_path: PathBuf,
}

/// The whole run: scene build, placement, settling, then one render and
/// one annotation record per frame.  Any error aborts the run; records
/// already written stay valid because the writer closes the stream on drop.
pub(crate) fn run_internal(
    config: &GeneratorConfig,
    physics: &mut dyn PhysicsBackend,
    renderer: &mut dyn RenderBackend,
    interrupt: Option<&AtomicBool>,
) -> anyhow::Result<RunSummary> {
    config.validate()?;
    let mut scene = config.build_scene().context("building scene")?;
    let region = SupportRegion::from_scene(&scene).context("deriving support region")?;

    let mut rng = match config.placement.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let placement =
        place(&mut scene, &region, &config.placement_config(), &mut rng).context("placing")?;

    let mut adapter = PhysicsAdapter::new(physics, config.physics_config());
    let settled = adapter.settle(&mut scene, &region).context("settling")?;
    info!(
        "{} instances placed, {} settled, {} removed",
        placement.placed.len(),
        settled.settled.len(),
        settled.culled.len()
    );

    let out_dir = &config.output.directory;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let annotation_path = config.annotation_path();
    let mut writer = AnnotationWriter::create(&annotation_path, config.output.format)
        .with_context(|| format!("opening {}", annotation_path.display()))?;

    let mut summary = RunSummary {
        placed: placement.placed.len(),
        exhausted: placement.exhausted,
        culled: settled.culled,
        annotation_path,
        ..RunSummary::default()
    };

    info!(
        "rendering frames {}..={} step {} with {}",
        config.frames.start,
        config.frames.end,
        config.frames.step,
        renderer.name()
    );
    for frame in config.frames.iter() {
        if interrupt.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            info!("interrupted before frame {}", frame);
            summary.interrupted = true;
            break;
        }
        if !config.physics.freeze_after_settle {
            adapter
                .sync_frame(&mut scene, frame)
                .with_context(|| format!("moving scene to frame {frame}"))?;
        }

        let image = config.image_path(frame);
        renderer
            .render_frame(&scene, frame, &image)
            .map_err(|reason| AnnotateError::RenderFailure {
                frame,
                path: image.display().to_string(),
                reason,
            })?;
        if config.output.mattes {
            let mattes: Vec<(u32, PathBuf)> = scene
                .instances()
                .map(|inst| (inst.index(), config.matte_path(inst.name(), frame)))
                .collect();
            renderer
                .render_mattes(&scene, frame, &mattes)
                .map_err(|reason| AnnotateError::RenderFailure {
                    frame,
                    path: out_dir.display().to_string(),
                    reason,
                })?;
        }

        let record = FrameRecord::capture(&scene, frame)?;
        writer.append(&record)?;
        summary.frames_written += 1;
        debug!("frame {}: {} boxes", frame, record.len());
    }

    writer.finish()?;
    info!(
        "{} records written to {}",
        summary.frames_written,
        summary.annotation_path.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropset_annotate::{BoxRasterizer, PixelBox, RecordFormat};
    use dropset_core::{SceneContext, Transform};
    use dropset_sim::{BodyDesc, DropSolver, SimError};
    use glam::Vec3;
    use std::collections::HashMap;
    use std::path::Path;

    /// Puts every dynamic body at a scripted position (origin by default).
    #[derive(Default)]
    struct Pinned {
        positions: HashMap<u32, Vec3>,
        bodies: Vec<u32>,
    }

    impl PhysicsBackend for Pinned {
        fn name(&self) -> &str {
            "pinned"
        }
        fn initialize(&mut self) -> Result<(), String> {
            Ok(())
        }
        fn clear_cache(&mut self) {
            self.bodies.clear();
        }
        fn register_body(&mut self, body: BodyDesc) -> Result<(), String> {
            self.bodies.push(body.id);
            Ok(())
        }
        fn bake_to_frame(&mut self, _start: u32, _end: u32) -> Result<(), String> {
            Ok(())
        }
        fn body_transform(&self, id: u32, _frame: u32) -> Option<Transform> {
            self.bodies.contains(&id).then(|| {
                Transform::from_position(self.positions.get(&id).copied().unwrap_or(Vec3::ZERO))
            })
        }
    }

    /// Records which frames were rendered and how many instances they had.
    #[derive(Default)]
    struct Recorder {
        frames: Vec<(u32, usize)>,
        mattes: Vec<(u32, Vec<u32>)>,
        fail_at: Option<u32>,
        fail_mattes_at: Option<u32>,
    }

    impl RenderBackend for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn render_frame(&mut self, scene: &SceneContext, frame: u32, _path: &Path) -> Result<(), String> {
            if self.fail_at == Some(frame) {
                return Err("disk full".into());
            }
            self.frames.push((frame, scene.len()));
            Ok(())
        }
        fn render_mattes(
            &mut self,
            _scene: &SceneContext,
            frame: u32,
            mattes: &[(u32, PathBuf)],
        ) -> Result<(), String> {
            if self.fail_mattes_at == Some(frame) {
                return Err("matte pass failed".into());
            }
            self.mattes
                .push((frame, mattes.iter().map(|(i, _)| *i).collect()));
            Ok(())
        }
    }

    fn out_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dropset_app_runner_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn top_down(dir: &Path, count: usize, frames: u32) -> GeneratorConfig {
        let text = format!(
            r#"
            [output]
            directory = "{}"

            [placement]
            count = {count}
            seed = 3

            [frames]
            start = 1
            end = {frames}

            [render]
            resolution = [200, 200]

            [camera]
            position = [0.0, 0.0, 10.0]
            projection = {{ kind = "orthographic", scale = 4.0 }}

            [surface]
            name = "Table"
            position = [0.0, 0.0, -0.55]
            size = [4.0, 4.0, 0.1]

            [[templates]]
            name = "Cube"
            mesh = {{ cuboid = [0.5, 0.5, 0.5] }}
            "#,
            dir.display().to_string().replace('\\', "/")
        );
        GeneratorConfig::from_toml_str(&text).unwrap()
    }

    fn read_records(path: &Path) -> Vec<FrameRecord> {
        let text = std::fs::read_to_string(path).unwrap();
        RecordFormat::sniff(&text).parse(&text).unwrap()
    }

    #[test]
    fn cube_under_orthographic_camera_fills_centre_quarter() {
        let dir = out_dir("ortho");
        let cfg = top_down(&dir, 1, 3);
        let mut physics = Pinned::default();
        let mut renderer = Recorder::default();

        let summary = run_internal(&cfg, &mut physics, &mut renderer, None).unwrap();
        assert_eq!(summary.placed, 1);
        assert_eq!(summary.frames_written, 3);
        assert_eq!(renderer.frames, vec![(1, 1), (2, 1), (3, 1)]);

        let records = read_records(&summary.annotation_path);
        assert_eq!(records.len(), 3);
        for (rec, frame) in records.iter().zip(1..) {
            assert_eq!(rec.frame, frame);
            assert_eq!(rec.classes, vec!["Cube".to_string()]);
            assert_eq!(rec.boxes, vec![PixelBox::from([75, 75, 50, 50])]);
            assert_eq!(rec.indices, vec![1]);
            assert_eq!(rec.class_ids, vec![0]);
        }
    }

    #[test]
    fn instance_below_floor_is_absent_from_every_record() {
        let dir = out_dir("fell_through");
        let mut cfg = top_down(&dir, 3, 4);
        cfg.physics.freeze_after_settle = false;
        let mut physics = Pinned::default();
        physics.positions.insert(2, Vec3::new(0.0, 0.0, -1.0));
        let mut renderer = Recorder::default();

        let summary = run_internal(&cfg, &mut physics, &mut renderer, None).unwrap();
        assert_eq!(summary.placed, 3);
        assert_eq!(summary.culled, vec![2]);

        let records = read_records(&summary.annotation_path);
        assert_eq!(records.len(), 4);
        for rec in &records {
            assert_eq!(rec.indices, vec![1, 3]);
            assert_eq!(rec.class_ids, vec![0, 0]);
        }
    }

    #[test]
    fn culled_instance_gets_no_matte() {
        let dir = out_dir("mattes");
        let cfg = top_down(&dir, 3, 1);
        let mut physics = Pinned::default();
        physics.positions.insert(2, Vec3::new(0.0, 0.0, -1.0));

        let summary =
            run_internal(&cfg, &mut physics, &mut BoxRasterizer::default(), None).unwrap();
        assert_eq!(summary.culled, vec![2]);
        assert!(dir.join("frame_01.png").exists());
        assert!(dir.join("Cube.001_matte01.png").exists());
        assert!(!dir.join("Cube.002_matte01.png").exists());
        assert!(dir.join("Cube.003_matte01.png").exists());
    }

    #[test]
    fn matte_pass_lists_active_instances_and_can_be_disabled() {
        let dir = out_dir("matte_list");
        let mut cfg = top_down(&dir, 3, 2);
        let mut physics = Pinned::default();
        physics.positions.insert(1, Vec3::new(0.0, 0.0, -1.0));
        let mut renderer = Recorder::default();

        run_internal(&cfg, &mut physics, &mut renderer, None).unwrap();
        assert_eq!(renderer.mattes, vec![(1, vec![2, 3]), (2, vec![2, 3])]);

        cfg.output.mattes = false;
        let mut renderer = Recorder::default();
        run_internal(&cfg, &mut Pinned::default(), &mut renderer, None).unwrap();
        assert!(renderer.mattes.is_empty());
        assert_eq!(renderer.frames.len(), 2);
    }

    #[test]
    fn matte_failure_aborts_the_run() {
        let dir = out_dir("matte_failure");
        let cfg = top_down(&dir, 1, 3);
        let mut renderer = Recorder {
            fail_mattes_at: Some(2),
            ..Recorder::default()
        };

        let err = run_internal(&cfg, &mut Pinned::default(), &mut renderer, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnnotateError>(),
            Some(AnnotateError::RenderFailure { frame: 2, .. })
        ));
        let records = read_records(&cfg.annotation_path());
        assert_eq!(records.len(), 1);
        assert_eq!(renderer.frames, vec![(1, 1), (2, 1)]);
    }

    #[test]
    fn render_failure_aborts_and_keeps_earlier_records() {
        let dir = out_dir("render_failure");
        let cfg = top_down(&dir, 1, 3);
        let mut physics = Pinned::default();
        let mut renderer = Recorder {
            fail_at: Some(2),
            ..Recorder::default()
        };

        let err = run_internal(&cfg, &mut physics, &mut renderer, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnnotateError>(),
            Some(AnnotateError::RenderFailure { frame: 2, .. })
        ));

        let records = read_records(&cfg.annotation_path());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].frame, 1);
    }

    #[test]
    fn missing_physics_engine_fails_before_output_is_created() {
        let dir = out_dir("no_physics");
        let cfg = top_down(&dir, 2, 1);
        let mut physics = DropSolver::unavailable();
        let mut renderer = Recorder::default();

        let err = run_internal(&cfg, &mut physics, &mut renderer, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::PhysicsUnavailable(_))
        ));
        assert!(!dir.exists());
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn flat_surface_is_a_configuration_error() {
        let dir = out_dir("flat_surface");
        let mut cfg = top_down(&dir, 2, 1);
        cfg.surface.size = [0.0, 4.0, 0.1];
        let err = run_internal(&cfg, &mut Pinned::default(), &mut Recorder::default(), None)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::Configuration(_))
        ));
    }

    #[test]
    fn raised_interrupt_stops_before_the_first_frame() {
        let dir = out_dir("interrupt");
        let cfg = top_down(&dir, 1, 5);
        let stop = AtomicBool::new(true);
        let mut renderer = Recorder::default();

        let summary =
            run_internal(&cfg, &mut Pinned::default(), &mut renderer, Some(&stop)).unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.frames_written, 0);
        assert!(renderer.frames.is_empty());
        assert_eq!(std::fs::read_to_string(&summary.annotation_path).unwrap(), "");
    }

    #[test]
    fn reference_backends_write_images_and_json_lines() {
        let dir = out_dir("reference");
        let mut cfg = top_down(&dir, 4, 2);
        cfg.output.format = RecordFormat::JsonLines;
        cfg.physics.settle_frame = 48;
        cfg.physics.floor_z = -1.0;

        let summary = run_internal(
            &cfg,
            &mut DropSolver::default(),
            &mut BoxRasterizer::default(),
            None,
        )
        .unwrap();
        assert_eq!(summary.frames_written, 2);
        assert!(dir.join("frame_01.png").exists());
        assert!(dir.join("frame_02.png").exists());
        assert_eq!(summary.annotation_path, dir.join("bounds_2d.jsonl"));

        let records = read_records(&summary.annotation_path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].indices, records[1].indices);
        assert_eq!(records[0].len(), 4 - summary.culled.len());
    }
}
