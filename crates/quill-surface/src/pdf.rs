//! Single-page PDF output through `pdf-writer`.
//!
//! Drawing accumulates a content stream in memory; nothing touches the disk until
//! [`PdfSurface::finish`].

use std::collections::HashMap;
use std::path::{Path as FsPath, PathBuf};

use pdf_writer::types::{ColorSpaceOperand, FunctionShadingType, LineCapStyle, LineJoinStyle};
use pdf_writer::{Content, Name, Pdf, Rect, Ref};
use quill_core::{
    Color, ColorGradient, DrawTarget, DrawingContext, Error, GradientGeometry, GraphicsState,
    LineCap, LineJoin, Path, PathCmd, Result, Source, TextExtents, Transform2D,
};
use quill_text::FontLibrary;

use crate::text;

const CATALOG: Ref = Ref::new(1);
const PAGE_TREE: Ref = Ref::new(2);
const PAGE: Ref = Ref::new(3);
const CONTENTS: Ref = Ref::new(4);

/// A vector surface that writes a one-page PDF document.
pub struct PdfSurface {
    path: PathBuf,
    width: u32,
    height: u32,
    doc: Option<Document>,
}

struct Document {
    pdf: Pdf,
    content: Content,
    next_ref: i32,
    ext_states: Vec<(String, Ref)>,
    alpha_states: HashMap<u8, usize>,
    patterns: Vec<(String, Ref)>,
}

impl Document {
    fn new(height: u32) -> Self {
        let mut content = Content::new();
        // PDF user space is y-up from the bottom-left corner.
        content.transform(to_pdf_matrix(&page_flip(height)));
        Self {
            pdf: Pdf::new(),
            content,
            next_ref: CONTENTS.get() + 1,
            ext_states: Vec::new(),
            alpha_states: HashMap::new(),
            patterns: Vec::new(),
        }
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_ref);
        self.next_ref += 1;
        r
    }

    /// Resource name of a graphics state setting both alphas to `alpha`.
    fn alpha_state(&mut self, alpha: f64) -> String {
        let key = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        if let Some(&i) = self.alpha_states.get(&key) {
            return self.ext_states[i].0.clone();
        }
        let id = self.alloc();
        let a = f32::from(key) / 255.0;
        self.pdf
            .ext_graphics(id)
            .non_stroking_alpha(a)
            .stroking_alpha(a);
        let name = format!("G{}", self.ext_states.len());
        self.alpha_states.insert(key, self.ext_states.len());
        self.ext_states.push((name.clone(), id));
        name
    }

    /// Write a shading pattern for `gradient` seen through `matrix` (user space to
    /// page space) and return its resource name. `None` without stops.
    fn gradient_pattern(&mut self, gradient: &ColorGradient, matrix: &Transform2D) -> Option<String> {
        use pdf_writer::Finish;

        let stops = gradient.sorted_stops();
        if stops.is_empty() {
            return None;
        }
        if stops.iter().any(|s| !s.color.is_opaque()) {
            log::debug!("gradient stop alpha is not supported in PDF output, painting opaque");
        }

        // Constant ends before the first and after the last stop, one linear segment
        // between each pair of neighbouring stops; zero-width pieces are dropped.
        let first = stops[0].color;
        let last = stops[stops.len() - 1].color;
        let knots: Vec<(f64, Color)> = std::iter::once((0.0, first))
            .chain(stops.iter().map(|s| (s.offset.clamp(0.0, 1.0), s.color)))
            .chain(std::iter::once((1.0, last)))
            .collect();
        let pieces: Vec<((f64, Color), (f64, Color))> = knots
            .windows(2)
            .filter(|w| w[1].0 > w[0].0)
            .map(|w| (w[0], w[1]))
            .collect();
        let segments: Vec<Ref> = pieces
            .iter()
            .map(|&((_, c0), (_, c1))| self.exponential(c0, c1))
            .collect();
        let bounds: Vec<f32> = pieces[..pieces.len() - 1]
            .iter()
            .map(|&(_, (end, _))| end as f32)
            .collect();
        let function = self.alloc();
        self.pdf
            .stitching_function(function)
            .domain([0.0, 1.0])
            .functions(segments.iter().copied())
            .bounds(bounds)
            .encode(segments.iter().flat_map(|_| [0.0, 1.0]));

        let (shading_type, coords) = match gradient.geometry {
            GradientGeometry::Linear { start, end } => (
                FunctionShadingType::Axial,
                vec![start[0], start[1], end[0], end[1]],
            ),
            GradientGeometry::Radial {
                start_center,
                start_radius,
                end_center,
                end_radius,
            } => (
                FunctionShadingType::Radial,
                vec![
                    start_center[0],
                    start_center[1],
                    start_radius,
                    end_center[0],
                    end_center[1],
                    end_radius,
                ],
            ),
        };

        let id = self.alloc();
        let mut pattern = self.pdf.shading_pattern(id);
        let mut shading = pattern.function_shading();
        shading.shading_type(shading_type);
        shading.color_space().device_rgb();
        shading.function(function);
        shading.coords(coords.into_iter().map(|v| v as f32));
        shading.extend([true, true]);
        shading.finish();
        pattern.matrix(to_pdf_matrix(matrix));
        pattern.finish();

        let name = format!("P{}", self.patterns.len());
        self.patterns.push((name.clone(), id));
        Some(name)
    }

    fn exponential(&mut self, c0: Color, c1: Color) -> Ref {
        let id = self.alloc();
        self.pdf
            .exponential_function(id)
            .domain([0.0, 1.0])
            .c0(rgb(c0))
            .c1(rgb(c1))
            .n(1.0);
        id
    }

    fn write(mut self, width: u32, height: u32) -> Vec<u8> {
        use pdf_writer::Finish;

        self.pdf.catalog(CATALOG).pages(PAGE_TREE);
        self.pdf.pages(PAGE_TREE).kids([PAGE]).count(1);

        let mut page = self.pdf.page(PAGE);
        page.media_box(Rect::new(0.0, 0.0, width as f32, height as f32));
        page.parent(PAGE_TREE);
        page.contents(CONTENTS);
        let mut resources = page.resources();
        {
            let mut states = resources.ext_g_states();
            for (name, id) in &self.ext_states {
                states.pair(Name(name.as_bytes()), *id);
            }
        }
        {
            let mut patterns = resources.patterns();
            for (name, id) in &self.patterns {
                patterns.pair(Name(name.as_bytes()), *id);
            }
        }
        resources.finish();
        page.finish();

        let stream = self.content.finish();
        self.pdf.stream(CONTENTS, &stream);
        self.pdf.finish()
    }
}

fn rgb(c: Color) -> [f32; 3] {
    let c = c.clamped();
    [c.r as f32, c.g as f32, c.b as f32]
}

fn to_pdf_matrix(m: &Transform2D) -> [f32; 6] {
    m.to_coefficients().map(|v| v as f32)
}

impl PdfSurface {
    /// Start a document of `width` by `height` points, to be written to `path`.
    pub fn new(path: impl AsRef<FsPath>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            doc: Some(Document::new(height)),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_finished(&self) -> bool {
        self.doc.is_none()
    }

    /// Check that the surface can still be drawn on.
    pub fn flush(&mut self) -> Result<()> {
        if self.doc.is_none() {
            return Err(Error::SurfaceFinished);
        }
        Ok(())
    }

    /// Write the document to disk. The surface cannot be used afterwards.
    pub fn finish(&mut self) -> Result<()> {
        let doc = self.doc.take().ok_or(Error::SurfaceFinished)?;
        let bytes = doc.write(self.width, self.height);
        std::fs::write(&self.path, &bytes)?;
        log::debug!("wrote {} bytes of PDF to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

impl Drop for PdfSurface {
    fn drop(&mut self) {
        if self.doc.is_some() {
            log::warn!(
                "PDF surface for {} dropped without finish(); nothing was written",
                self.path.display()
            );
        }
    }
}

impl DrawTarget for PdfSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn new_context(&mut self) -> Result<Box<dyn DrawingContext + '_>> {
        let height = self.height;
        let doc = self.doc.as_mut().ok_or(Error::SurfaceFinished)?;
        Ok(Box::new(PdfContext {
            state: GraphicsState::default(),
            doc,
            page: page_flip(height),
            fonts: FontLibrary::shared(),
        }))
    }
}

fn page_flip(height: u32) -> Transform2D {
    Transform2D::translation(0.0, height as f64).then(&Transform2D::scaling(1.0, -1.0))
}

/// Drawing context appending to a PDF content stream.
pub struct PdfContext<'a> {
    state: GraphicsState,
    doc: &'a mut Document,
    /// Top-left device space to PDF page space.
    page: Transform2D,
    fonts: &'static FontLibrary,
}

#[derive(Clone, Copy, PartialEq)]
enum Paint {
    Fill,
    Stroke,
}

impl PdfContext<'_> {
    fn set_paint(&mut self, paint: Paint) -> Result<bool> {
        match &self.state.source {
            Source::Solid(c) => {
                let [r, g, b] = rgb(*c);
                if !c.is_opaque() {
                    let name = self.doc.alpha_state(c.a);
                    self.doc.content.set_parameters(Name(name.as_bytes()));
                }
                match paint {
                    Paint::Fill => self.doc.content.set_fill_rgb(r, g, b),
                    Paint::Stroke => self.doc.content.set_stroke_rgb(r, g, b),
                };
                Ok(true)
            }
            Source::Gradient(gradient) => {
                let matrix = self.page.then(&self.state.matrix);
                let Some(name) = self.doc.gradient_pattern(gradient, &matrix) else {
                    return Ok(false);
                };
                let content = &mut self.doc.content;
                match paint {
                    Paint::Fill => {
                        content.set_fill_color_space(ColorSpaceOperand::Pattern);
                        content.set_fill_pattern(std::iter::empty::<f32>(), Name(name.as_bytes()));
                    }
                    Paint::Stroke => {
                        content.set_stroke_color_space(ColorSpaceOperand::Pattern);
                        content.set_stroke_pattern(std::iter::empty::<f32>(), Name(name.as_bytes()));
                    }
                }
                Ok(true)
            }
            Source::Pattern(_) => Err(Error::UnsupportedSource(
                "image patterns cannot be drawn on a PDF surface".to_string(),
            )),
        }
    }

    fn write_path(&mut self, path: &Path) {
        let content = &mut self.doc.content;
        let mut last = [0.0, 0.0];
        let f = |v: f64| v as f32;
        for cmd in &path.cmds {
            match *cmd {
                PathCmd::MoveTo(p) => {
                    content.move_to(f(p[0]), f(p[1]));
                    last = p;
                }
                PathCmd::LineTo(p) => {
                    content.line_to(f(p[0]), f(p[1]));
                    last = p;
                }
                PathCmd::QuadTo(c, p) => {
                    // degree elevation
                    let c1 = [last[0] + 2.0 / 3.0 * (c[0] - last[0]), last[1] + 2.0 / 3.0 * (c[1] - last[1])];
                    let c2 = [p[0] + 2.0 / 3.0 * (c[0] - p[0]), p[1] + 2.0 / 3.0 * (c[1] - p[1])];
                    content.cubic_to(f(c1[0]), f(c1[1]), f(c2[0]), f(c2[1]), f(p[0]), f(p[1]));
                    last = p;
                }
                PathCmd::CubicTo(c1, c2, p) => {
                    content.cubic_to(f(c1[0]), f(c1[1]), f(c2[0]), f(c2[1]), f(p[0]), f(p[1]));
                    last = p;
                }
                PathCmd::Close => {
                    content.close_path();
                }
            }
        }
    }

    fn paint_path(&mut self, paint: Paint) -> Result<()> {
        let path = self.state.path.path().clone();
        if path.vertices().len() < 2 {
            return Ok(());
        }
        self.doc.content.save_state();
        let result = self.paint_path_inner(&path, paint);
        self.doc.content.restore_state();
        result
    }

    fn paint_path_inner(&mut self, path: &Path, paint: Paint) -> Result<()> {
        if !self.set_paint(paint)? {
            return Ok(());
        }
        self.doc.content.transform(to_pdf_matrix(&self.state.matrix));
        if paint == Paint::Stroke {
            let content = &mut self.doc.content;
            content.set_line_width(self.state.line_width as f32);
            content.set_line_cap(match self.state.line_cap {
                LineCap::Butt => LineCapStyle::ButtCap,
                LineCap::Round => LineCapStyle::RoundCap,
                LineCap::Square => LineCapStyle::ProjectingSquareCap,
            });
            content.set_line_join(match self.state.line_join {
                LineJoin::Miter => LineJoinStyle::MiterJoin,
                LineJoin::Round => LineJoinStyle::RoundJoin,
                LineJoin::Bevel => LineJoinStyle::BevelJoin,
            });
            content.set_miter_limit(10.0);
        }
        self.write_path(path);
        match paint {
            Paint::Fill => self.doc.content.fill_nonzero(),
            Paint::Stroke => self.doc.content.stroke(),
        };
        Ok(())
    }
}

impl DrawingContext for PdfContext<'_> {
    fn state(&self) -> &GraphicsState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut GraphicsState {
        &mut self.state
    }

    fn fill_preserve(&mut self) -> Result<()> {
        self.paint_path(Paint::Fill)
    }

    fn stroke_preserve(&mut self) -> Result<()> {
        if self.state.line_width <= 0.0 {
            return Ok(());
        }
        self.paint_path(Paint::Stroke)
    }

    fn text_extents(&mut self, txt: &str) -> Result<TextExtents> {
        text::extents(self.fonts, &self.state, txt)
    }

    fn text_path(&mut self, txt: &str) -> Result<()> {
        text::append_path(self.fonts, &mut self.state, txt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{ImagePattern, Pixmap};
    use quill_scene::{ShapeStyle, circle, group, rectangle, square};
    use std::sync::Arc;

    fn read(path: &FsPath) -> String {
        String::from_utf8_lossy(&std::fs::read(path).unwrap()).into_owned()
    }

    #[test]
    fn test_finish_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scene.pdf");
        let mut pdf = PdfSurface::new(&file, 200, 100).unwrap();
        let style = ShapeStyle::new()
            .xy([100.0, 50.0])
            .fill((1.0, 0.0, 0.0, 0.5))
            .stroke((0.0, 0.0, 0.0), 2.0);
        group([circle(30.0, &style), rectangle(20.0, 10.0, &style)])
            .draw(&mut pdf)
            .unwrap();
        assert!(!file.exists());
        pdf.flush().unwrap();
        pdf.finish().unwrap();

        let text = read(&file);
        assert!(text.starts_with("%PDF-"));
        assert!(text.contains("/MediaBox [0 0 200 100]"));
        assert!(text.contains("/ca 0.5"));
        assert!(pdf.is_finished());
    }

    #[test]
    fn test_gradient_becomes_shading() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gradient.pdf");
        let mut pdf = PdfSurface::new(&file, 50, 50).unwrap();
        let gradient = ColorGradient::new(
            "radial",
            [(0.0, (1.0, 1.0, 1.0)), (0.6, (1.0, 0.0, 0.0)), (1.0, (0.0, 0.0, 0.0))],
            [25.0, 25.0],
            [0.0, 25.0],
            Some([25.0, 20.0]),
        )
        .unwrap();
        circle(20.0, &ShapeStyle::new().xy([25.0, 25.0]).fill(gradient))
            .draw(&mut pdf)
            .unwrap();
        pdf.finish().unwrap();
        let text = read(&file);
        assert!(text.contains("/ShadingType 3"));
        assert!(text.contains("/FunctionType 3"));
        assert!(text.contains("/P0"));
    }

    #[test]
    fn test_gradient_keeps_outer_stop_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("band.pdf");
        let mut pdf = PdfSurface::new(&file, 100, 20).unwrap();
        let gradient = ColorGradient::linear(
            [-50.0, 0.0],
            [50.0, 0.0],
            [(0.4, Color::BLACK), (0.6, Color::WHITE)],
        );
        rectangle(100.0, 20.0, &ShapeStyle::new().xy([50.0, 10.0]).fill(gradient))
            .draw(&mut pdf)
            .unwrap();
        pdf.finish().unwrap();
        let text = read(&file);
        // flat black, black to white, flat white
        assert!(text.contains("/Bounds [0.4 0.6]"));
        assert!(text.contains("/Encode [0 1 0 1 0 1]"));
    }

    #[test]
    fn test_single_stop_gradient_is_one_piece() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("flat.pdf");
        let mut pdf = PdfSurface::new(&file, 10, 10).unwrap();
        let gradient = ColorGradient::linear([0.0, 0.0], [10.0, 0.0], [(0.0, Color::BLACK)]);
        square(10.0, &ShapeStyle::new().xy([5.0, 5.0]).fill(gradient))
            .draw(&mut pdf)
            .unwrap();
        pdf.finish().unwrap();
        let text = read(&file);
        assert!(text.contains("/Bounds []"));
        assert!(text.contains("/Encode [0 1]"));
    }

    #[test]
    fn test_lifecycle_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut pdf = PdfSurface::new(dir.path().join("a.pdf"), 10, 10).unwrap();
        pdf.finish().unwrap();
        assert!(matches!(pdf.finish(), Err(Error::SurfaceFinished)));
        assert!(matches!(pdf.flush(), Err(Error::SurfaceFinished)));
        assert!(matches!(pdf.new_context(), Err(Error::SurfaceFinished)));
        assert!(matches!(
            PdfSurface::new(dir.path().join("b.pdf"), 0, 10),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_image_pattern_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut pdf = PdfSurface::new(dir.path().join("p.pdf"), 10, 10).unwrap();
        let pattern = ImagePattern::new(Arc::new(Pixmap::new(2, 2).unwrap()));
        let result = rectangle(4.0, 4.0, &ShapeStyle::new().fill(pattern)).draw(&mut pdf);
        assert!(matches!(result, Err(Error::UnsupportedSource(_))));
        pdf.finish().unwrap();
    }

    #[test]
    fn test_drop_without_finish_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dropped.pdf");
        {
            let _pdf = PdfSurface::new(&file, 10, 10).unwrap();
        }
        assert!(!file.exists());
    }
}
