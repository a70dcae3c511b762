use dropset_core::SceneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// The support region or placement parameters are unusable.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The rigid-body engine is missing or refused to initialise.
    #[error("physics engine unavailable: {0}")]
    PhysicsUnavailable(String),
    #[error("bake to frame {frame} failed: {reason}")]
    BakeFailed { frame: u32, reason: String },
    #[error("physics engine has no transform for instance {index} at frame {frame}")]
    MissingBody { index: u32, frame: u32 },
    #[error(transparent)]
    Scene(#[from] SceneError),
}
