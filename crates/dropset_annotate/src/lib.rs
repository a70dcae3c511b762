//! dropset_annotate: per-frame 2D annotations.
//!
//! # Module layout
//!
//! | Module       | Responsibility                                        |
//! |--------------|-------------------------------------------------------|
//! | `projection` | Camera-space bounding box of a mesh                   |
//! | `bbox`       | `NormalizedBox` / `PixelBox` and pixel conversion      |
//! | `record`     | `FrameRecord` capture                                 |
//! | `format`     | Legacy bracketed and JSON-lines encodings + parsers   |
//! | `writer`     | Record-atomic `AnnotationWriter`                      |
//! | `backend`    | `RenderBackend` trait                                 |
//! | `raster`     | `BoxRasterizer`, the built-in reference renderer      |

pub mod backend;
pub mod bbox;
pub mod color;
pub mod error;
pub mod format;
pub mod projection;
pub mod raster;
pub mod record;
pub mod writer;

pub use backend::RenderBackend;
pub use bbox::{NormalizedBox, PixelBox};
pub use error::AnnotateError;
pub use format::RecordFormat;
pub use projection::{camera_view_bounds, project_point, project_vertices, CameraSnapshot};
pub use raster::BoxRasterizer;
pub use record::FrameRecord;
pub use writer::AnnotationWriter;
