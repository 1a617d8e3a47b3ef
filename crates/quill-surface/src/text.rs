//! Text support shared by the raster and PDF contexts.

use quill_core::{GraphicsState, Result, TextExtents};
use quill_text::FontLibrary;

pub(crate) fn extents(fonts: &FontLibrary, state: &GraphicsState, text: &str) -> Result<TextExtents> {
    fonts.resolve(&state.font)?.text_extents(text, state.font_size)
}

/// Append the outlines of `text` to the state's path, pen on the current point.
pub(crate) fn append_path(fonts: &FontLibrary, state: &mut GraphicsState, text: &str) -> Result<()> {
    let face = fonts.resolve(&state.font)?;
    let origin = state.path.current_point().unwrap_or([0.0, 0.0]);
    let outline = face.text_path(text, state.font_size, origin)?;
    state.path.extend(&outline);
    Ok(())
}
