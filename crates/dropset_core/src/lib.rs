//! dropset_core: scene data model shared by every stage of a generation run.
//!
//! | Module      | Responsibility                                        |
//! |-------------|-------------------------------------------------------|
//! | `transform` | `Transform` (TRS) and Euler helpers                   |
//! | `aabb`      | `Aabb` and the placement collision predicate          |
//! | `mesh`      | Template vertex positions                             |
//! | `camera`    | `CameraFrame`, projection kind, view-frame corners    |
//! | `scene`     | `SceneContext`, `Template`, `Instance`, `Element`     |

pub mod aabb;
pub mod camera;
pub mod error;
pub mod mesh;
pub mod scene;
pub mod transform;

pub use aabb::Aabb;
pub use camera::{CameraFrame, Projection, RenderSettings, SensorFit};
pub use error::SceneError;
pub use mesh::Mesh;
pub use scene::{base_name, Element, Instance, SceneContext, Template};
pub use transform::Transform;

// glam is part of the public API; re-export so callers share the version.
pub use glam;
