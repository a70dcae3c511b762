//! dropset_app: everything needed to turn a scene file into a dataset.
//!
//! | Module    | Responsibility                                         |
//! |-----------|--------------------------------------------------------|
//! | `config`  | TOML scene files, validation, scene construction       |
//! | `logging` | `fern` dispatcher for the binary                       |
//! | `builder` | `Generator`, the run builder                           |
//! | `runner`  | Placement → settling → per-frame render and annotation |

pub mod builder;
pub mod config;
pub mod logging;
mod runner;

pub use builder::Generator;
pub use config::{ConfigError, FrameRange, GeneratorConfig, MeshSource};
pub use runner::RunSummary;

// Re-export the pieces callers plug into a `Generator`.
pub use dropset_annotate::{BoxRasterizer, RecordFormat, RenderBackend};
pub use dropset_sim::{DropSolver, PhysicsBackend};
