use std::sync::Arc;

use quill_core::{Error, Path, PathBuilder, Point, Result, TextExtents};

/// A loaded font face that owns its file data.
///
/// Text is laid out on a single line by horizontal advance only; there is no shaping,
/// kerning or bidi reordering.
#[derive(Debug, Clone)]
pub struct FontFace {
    data: Arc<[u8]>,
    index: u32,
    units_per_em: u16,
}

impl FontFace {
    /// Create a font face from raw bytes and a font index within the file.
    pub fn from_bytes(data: Arc<[u8]>, index: u32) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, index)
            .map_err(|e| Error::FontNotFound(format!("invalid font data: {e}")))?;
        let units_per_em = face.units_per_em();
        Ok(Self {
            data,
            index,
            units_per_em,
        })
    }

    pub fn from_vec(data: Vec<u8>, index: u32) -> Result<Self> {
        Self::from_bytes(Arc::from(data), index)
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn parse(&self) -> Result<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index)
            .map_err(|e| Error::FontNotFound(format!("invalid font data: {e}")))
    }

    /// Glyph outlines of `text` at `size` user units per em, with the pen starting on
    /// the baseline at `origin`. The y axis points down.
    pub fn text_path(&self, text: &str, size: f64, origin: Point) -> Result<Path> {
        let mut builder = PathBuilder::new();
        self.layout(text, size, origin, &mut builder)?;
        Ok(builder.take())
    }

    /// Ink extents and advance of `text` at `size`.
    pub fn text_extents(&self, text: &str, size: f64) -> Result<TextExtents> {
        let mut builder = PathBuilder::new();
        let advance = self.layout(text, size, [0.0, 0.0], &mut builder)?;
        let (x_bearing, y_bearing, width, height) = match builder.path().bounds() {
            Some([x0, y0, x1, y1]) => (x0, y0, x1 - x0, y1 - y0),
            None => (0.0, 0.0, 0.0, 0.0),
        };
        Ok(TextExtents {
            x_bearing,
            y_bearing,
            width,
            height,
            x_advance: advance,
            y_advance: 0.0,
        })
    }

    /// Append outlines to `builder`; returns the total advance.
    fn layout(&self, text: &str, size: f64, origin: Point, builder: &mut PathBuilder) -> Result<f64> {
        let face = self.parse()?;
        let scale = size / f64::from(self.units_per_em.max(1));
        let mut pen_x = origin[0];
        for ch in text.chars() {
            // Missing glyphs render as .notdef.
            let glyph = face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
            let mut outline = GlyphOutline {
                builder: &mut *builder,
                origin: [pen_x, origin[1]],
                scale,
            };
            face.outline_glyph(glyph, &mut outline);
            let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
            pen_x += f64::from(advance) * scale;
        }
        Ok(pen_x - origin[0])
    }
}

/// Maps font units (y up) into user space (y down) around a pen position.
struct GlyphOutline<'a> {
    builder: &'a mut PathBuilder,
    origin: Point,
    scale: f64,
}

impl GlyphOutline<'_> {
    fn map(&self, x: f32, y: f32) -> Point {
        [
            self.origin[0] + f64::from(x) * self.scale,
            self.origin[1] - f64::from(y) * self.scale,
        ]
    }
}

impl ttf_parser::OutlineBuilder for GlyphOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.builder.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.builder.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.map(x1, y1), self.map(x, y));
        self.builder.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.map(x1, y1), self.map(x2, y2), self.map(x, y));
        self.builder.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.builder.close_path();
    }
}
