//! quill-surface: raster and PDF draw targets, image export and vertical flipping.

pub mod pdf;
mod skia;
pub mod surface;
mod text;

pub use pdf::{PdfContext, PdfSurface};
pub use quill_config::FlipMode;
pub use surface::{RasterContext, Surface, SurfaceOptions};
