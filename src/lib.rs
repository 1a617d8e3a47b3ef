//! quill: declarative 2D vector drawing.
//!
//! Build elements with the shape constructors, combine them with [`group`], move them
//! around with the [`Transformable`] operations and draw them onto a [`Surface`] or a
//! [`PdfSurface`].
//!
//! ```no_run
//! use quill::prelude::*;
//!
//! let mut surface = Surface::with_background(200, 200, Color::WHITE)?;
//! let style = ShapeStyle::new()
//!     .xy([100.0, 100.0])
//!     .fill((1.0, 0.0, 0.0))
//!     .stroke(Color::BLACK, 2.0);
//! circle(70.0, &style).draw(&mut surface)?;
//! surface.write_to_png("circle.png", YOrigin::Top)?;
//! # Ok::<(), quill::Error>(())
//! ```

pub use quill_config::{FlipMode, QuillConfig};
pub use quill_core::{
    Color, ColorGradient, DrawTarget, DrawingContext, Error, ImagePattern, PatternExtend,
    PatternFilter, Point, Result, Source, Transform2D, Transformable, YOrigin, html_color,
    polar_polygon, polar_to_cartesian,
};
pub use quill_scene::{
    Element, HAlign, ShapeStyle, TextStyle, VAlign, arc, bezier_curve, circle, ellipse, group,
    polyline, rectangle, regular_polygon, shape_element, square, star, text,
};
pub use quill_surface::{PdfSurface, Surface, SurfaceOptions};
pub use quill_text::FontLibrary;

pub mod prelude {
    pub use crate::{
        Color, ColorGradient, DrawTarget, Element, ImagePattern, PdfSurface, ShapeStyle, Source,
        Surface, TextStyle, Transform2D, Transformable, YOrigin, arc, bezier_curve, circle,
        ellipse, group, polyline, rectangle, regular_polygon, square, star, text,
    };
}
