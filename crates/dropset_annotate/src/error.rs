use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotateError {
    /// The external render step failed; the whole run must stop.
    #[error("render of frame {frame} to {path} failed: {reason}")]
    RenderFailure {
        frame: u32,
        path: String,
        reason: String,
    },
    #[error("object '{0}' has no class in the template vocabulary")]
    UnknownClass(String),
    #[error("malformed annotation at byte {pos}: {reason}")]
    Parse { pos: usize, reason: String },
    #[error("annotation writer already finished")]
    Finished,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
