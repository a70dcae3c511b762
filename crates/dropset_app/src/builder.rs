use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use dropset_annotate::{BoxRasterizer, RecordFormat, RenderBackend};
use dropset_sim::{DropSolver, PhysicsBackend};

use crate::config::GeneratorConfig;
use crate::runner::RunSummary;

/// Entry point of a generation run.  Configured with the builder pattern.
///
/// ```rust,ignore
/// let summary = Generator::new(GeneratorConfig::load(path)?)
///     .with_seed(7)
///     .with_interrupt(stop.clone())
///     .run()?;
/// ```
///
/// Without explicit backends the run uses [`DropSolver`] and
/// [`BoxRasterizer`].
pub struct Generator {
    config: GeneratorConfig,
    physics: Box<dyn PhysicsBackend>,
    renderer: Box<dyn RenderBackend>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            physics: Box::new(DropSolver::default()),
            renderer: Box::new(BoxRasterizer::default()),
            interrupt: None,
        }
    }

    pub fn with_physics(mut self, backend: impl PhysicsBackend + 'static) -> Self {
        self.physics = Box::new(backend);
        self
    }

    pub fn with_renderer(mut self, backend: impl RenderBackend + 'static) -> Self {
        self.renderer = Box::new(backend);
        self
    }

    /// Flag checked between frames; setting it ends the run after the
    /// current record.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output.directory = dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.placement.seed = Some(seed);
        self
    }

    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Run placement, settling and the annotation loop.
    pub fn run(mut self) -> anyhow::Result<RunSummary> {
        crate::runner::run_internal(
            &self.config,
            self.physics.as_mut(),
            self.renderer.as_mut(),
            self.interrupt.as_deref(),
        )
    }
}
