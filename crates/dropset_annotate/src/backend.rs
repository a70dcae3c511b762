//! Render engine boundary.

use std::path::{Path, PathBuf};

use dropset_core::SceneContext;

/// External renderer that rasterizes the current scene state to an image.
///
/// Implementations are stateful and single-threaded.  The run loop calls
/// `render_frame` and then `render_mattes` once per processed frame, always
/// before the frame's boxes are computed.
pub trait RenderBackend {
    /// Short human-readable label used in logs.
    fn name(&self) -> &str;

    /// Render `scene` as it stands at `frame` and write the image to `path`.
    fn render_frame(&mut self, scene: &SceneContext, frame: u32, path: &Path) -> Result<(), String>;

    /// Write one single-channel matte per `(instance index, path)` entry,
    /// white where that instance covers the frame.  Only active instances
    /// are listed.
    ///
    /// The default writes nothing, for backends without a matte pass.
    fn render_mattes(
        &mut self,
        scene: &SceneContext,
        frame: u32,
        mattes: &[(u32, PathBuf)],
    ) -> Result<(), String> {
        let _ = (scene, frame, mattes);
        Ok(())
    }
}
