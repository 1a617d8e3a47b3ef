//! quill-scene: immutable elements, groups and the shape and text constructors.

pub mod element;
pub mod shapes;
pub mod text;

#[cfg(test)]
pub(crate) mod testing;

pub use element::{DrawProc, Element, ElementKind, group};
pub use shapes::{
    ShapeStyle, arc, bezier_curve, circle, ellipse, polyline, rectangle, regular_polygon,
    shape_element, square, star,
};
pub use text::{HAlign, TextStyle, VAlign, text};
