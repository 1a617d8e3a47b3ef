//! quill-core: affine algebra, paint sources, paths and the drawing-context traits
//! shared by the scene and surface crates.

pub mod color;
pub mod context;
pub mod error;
pub mod geometry;
pub mod path;
pub mod raster;
pub mod source;
pub mod transform;

/// A point or vector in user space.
pub type Point = [f64; 2];

pub use color::{Color, html_color};
pub use context::{
    DrawTarget, DrawingContext, FontDescriptor, FontSlant, FontWeight, GraphicsState, LineCap,
    LineJoin, TextExtents, YOrigin,
};
pub use error::{Error, Result};
pub use geometry::{PolarSample, polar_polygon, polar_to_cartesian};
pub use path::{Path, PathBuilder, PathCmd};
pub use source::{
    ColorGradient, GradientGeometry, GradientKind, GradientStop, ImagePattern, PatternExtend,
    PatternFilter, Source,
};
pub use transform::{Transform2D, Transformable};

pub use tiny_skia::Pixmap;
