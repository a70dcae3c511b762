use thiserror::Error;

/// Errors raised while assembling a [`SceneContext`](crate::SceneContext).
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("mesh has no vertices")]
    EmptyMesh,
    #[error("could not load mesh {path}: {reason}")]
    MeshLoad { path: String, reason: String },
    #[error("template pool is empty")]
    NoTemplates,
    #[error("no template at pool position {0}")]
    UnknownTemplate(usize),
    #[error("duplicate template name '{0}'")]
    DuplicateTemplate(String),
    #[error("no instance with index {0}")]
    UnknownInstance(u32),
}
