//! quill-text: font lookup and glyph outlines for text elements.

mod face;
mod library;

pub use face::FontFace;
pub use library::FontLibrary;
