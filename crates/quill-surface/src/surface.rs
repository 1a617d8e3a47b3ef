//! Raster surfaces backed by a tiny-skia pixmap.

use std::path::Path as FsPath;
use std::sync::Arc;

use base64::Engine;
use image::DynamicImage;
use quill_config::{FlipMode, QuillConfig};
use quill_core::raster::{flip_rows, image_from_pixmap, pixmap_from_image};
use quill_core::{
    DrawTarget, DrawingContext, Error, GraphicsState, ImagePattern, Result, Source,
    TextExtents, Transformable, YOrigin,
};
use quill_scene::{ShapeStyle, rectangle};
use quill_text::FontLibrary;
use tiny_skia::{FillRule, Pixmap, PixmapPaint, Stroke, Transform};

use crate::skia;
use crate::text;

/// Rendering options of a raster surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    pub anti_alias: bool,
    pub flip: FlipMode,
    /// Origin used by [`Surface::png_bytes`] and [`Surface::save_png`].
    pub y_origin: YOrigin,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            anti_alias: true,
            flip: FlipMode::Native,
            y_origin: YOrigin::Top,
        }
    }
}

impl SurfaceOptions {
    pub fn from_config(config: &QuillConfig) -> Self {
        Self {
            anti_alias: config.render.anti_alias,
            flip: config.export.flip,
            y_origin: config.export.y_origin,
        }
    }
}

/// An RGBA image that elements draw on; starts fully transparent.
#[derive(Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixmap: Arc<Pixmap>,
    options: SurfaceOptions,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_options(width, height, SurfaceOptions::default())
    }

    pub fn with_options(width: u32, height: u32, options: SurfaceOptions) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(Error::InvalidDimensions { width, height })?;
        log::debug!("created {width}x{height} surface");
        Ok(Self {
            width,
            height,
            pixmap: Arc::new(pixmap),
            options,
        })
    }

    /// A surface painted with `bg` by drawing a rectangle twice its size.
    pub fn with_background(width: u32, height: u32, bg: impl Into<Source>) -> Result<Self> {
        let mut surface = Self::new(width, height)?;
        let style = ShapeStyle::new().fill(bg);
        rectangle(2.0 * width as f64, 2.0 * height as f64, &style).draw(&mut surface)?;
        Ok(surface)
    }

    /// Surface holding a copy of a grayscale, RGB or RGBA image.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let pixmap = pixmap_from_image(image)?;
        Ok(Self {
            width: pixmap.width(),
            height: pixmap.height(),
            pixmap: Arc::new(pixmap),
            options: SurfaceOptions::default(),
        })
    }

    pub fn from_png(path: impl AsRef<FsPath>) -> Result<Self> {
        Self::from_image(&image::open(path)?)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn options(&self) -> SurfaceOptions {
        self.options
    }

    /// The premultiplied pixels.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// A pattern of the current pixels, placed with the top-left pixel at the origin.
    /// The pixels are shared until the surface is drawn on again.
    pub fn pattern(&self) -> ImagePattern {
        ImagePattern::new(Arc::clone(&self.pixmap))
    }

    /// A vertically mirrored copy, using the configured flip strategy.
    pub fn flipped(&self) -> Result<Surface> {
        self.flipped_with(self.options.flip)
    }

    pub fn flipped_with(&self, mode: FlipMode) -> Result<Surface> {
        let (w, h) = (self.width, self.height);
        let mut out = Surface::with_options(w, h, self.options)?;
        match mode {
            FlipMode::Native => {
                let ts = Transform::from_row(1.0, 0.0, 0.0, -1.0, 0.0, h as f32);
                Arc::make_mut(&mut out.pixmap).draw_pixmap(
                    0,
                    0,
                    (*self.pixmap).as_ref(),
                    &PixmapPaint::default(),
                    ts,
                    None,
                );
            }
            FlipMode::Repaint => {
                let style = ShapeStyle::new().fill(self.pattern());
                rectangle(2.0 * w as f64, 2.0 * h as f64, &style)
                    .scale_xy(1.0, -1.0)
                    .translate([0.0, h as f64])
                    .draw(&mut out)?;
            }
        }
        Ok(out)
    }

    /// Straight-alpha copy of the pixels: RGBA when `transparent`, otherwise RGB.
    pub fn get_image(&self, transparent: bool, y_origin: YOrigin) -> DynamicImage {
        match y_origin {
            YOrigin::Top => image_from_pixmap(&self.pixmap, transparent),
            YOrigin::Bottom => {
                let mut rows = (*self.pixmap).clone();
                flip_rows(&mut rows);
                image_from_pixmap(&rows, transparent)
            }
        }
    }

    /// PNG-encoded pixels.
    pub fn to_png(&self, y_origin: YOrigin) -> Result<Vec<u8>> {
        let encoded = match y_origin {
            YOrigin::Top => self.pixmap.encode_png(),
            YOrigin::Bottom => self.flipped()?.pixmap.encode_png(),
        };
        encoded.map_err(|e| Error::Encode(e.to_string()))
    }

    pub fn write_to_png(&self, path: impl AsRef<FsPath>, y_origin: YOrigin) -> Result<()> {
        let png = self.to_png(y_origin)?;
        std::fs::write(path, png)?;
        Ok(())
    }

    /// PNG-encoded pixels, using the configured y origin.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        self.to_png(self.options.y_origin)
    }

    /// Write a PNG file using the configured y origin.
    pub fn save_png(&self, path: impl AsRef<FsPath>) -> Result<()> {
        self.write_to_png(path, self.options.y_origin)
    }

    /// An `<img>` tag with the PNG inlined as a data URI.
    pub fn html_embed(&self, y_origin: YOrigin) -> Result<String> {
        let png = self.to_png(y_origin)?;
        let data = base64::engine::general_purpose::STANDARD.encode(png);
        Ok(format!("<img  src=\"data:image/png;base64,{data}\">"))
    }
}

impl DrawTarget for Surface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn new_context(&mut self) -> Result<Box<dyn DrawingContext + '_>> {
        Ok(Box::new(RasterContext {
            state: GraphicsState::default(),
            size: (self.width, self.height),
            anti_alias: self.options.anti_alias,
            pixmap: Arc::make_mut(&mut self.pixmap),
            fonts: FontLibrary::shared(),
        }))
    }
}

/// Drawing context painting straight into a surface's pixmap.
pub struct RasterContext<'a> {
    state: GraphicsState,
    size: (u32, u32),
    anti_alias: bool,
    pixmap: &'a mut Pixmap,
    fonts: &'static FontLibrary,
}

impl DrawingContext for RasterContext<'_> {
    fn state(&self) -> &GraphicsState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut GraphicsState {
        &mut self.state
    }

    fn fill_preserve(&mut self) -> Result<()> {
        let Some(path) = skia::path(self.state.path.path()) else {
            return Ok(());
        };
        let ctm = self.state.matrix;
        let Some((paint, mask)) = skia::paint(&self.state.source, &ctm, self.size, self.anti_alias)
        else {
            return Ok(());
        };
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, skia::transform(&ctm), mask.as_ref());
        Ok(())
    }

    fn stroke_preserve(&mut self) -> Result<()> {
        if self.state.line_width <= 0.0 {
            return Ok(());
        }
        let Some(path) = skia::path(self.state.path.path()) else {
            return Ok(());
        };
        let ctm = self.state.matrix;
        let Some((paint, mask)) = skia::paint(&self.state.source, &ctm, self.size, self.anti_alias)
        else {
            return Ok(());
        };
        let stroke = Stroke {
            width: self.state.line_width as f32,
            miter_limit: 10.0,
            line_cap: skia::line_cap(self.state.line_cap),
            line_join: skia::line_join(self.state.line_join),
            dash: None,
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, skia::transform(&ctm), mask.as_ref());
        Ok(())
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
    use image::{Rgba, RgbaImage};
    use quill_core::Color;
    use quill_scene::{circle, group, square};

    fn rgba(s: &Surface, x: u32, y: u32) -> [u8; 4] {
        s.get_image(true, YOrigin::Top).to_rgba8().get_pixel(x, y).0
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Surface::new(0, 10),
            Err(Error::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let s = Surface::new(4, 4).unwrap();
        assert_eq!(rgba(&s, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn test_background() {
        let s = Surface::with_background(10, 6, Color::rgb(0.0, 0.0, 1.0)).unwrap();
        for (x, y) in [(0, 0), (9, 0), (0, 5), (9, 5)] {
            assert_eq!(rgba(&s, x, y), [0, 0, 255, 255]);
        }
    }

    #[test]
    fn test_red_circle() {
        let mut s = Surface::with_background(200, 200, Color::WHITE).unwrap();
        let style = ShapeStyle::new()
            .xy([100.0, 100.0])
            .fill((1.0, 0.0, 0.0))
            .stroke((0.0, 0.0, 0.0), 2.0);
        circle(70.0, &style).draw(&mut s).unwrap();
        assert_eq!(rgba(&s, 100, 100), [255, 0, 0, 255]);
        assert_eq!(rgba(&s, 0, 0), [255, 255, 255, 255]);
        // on the outline
        let [r, g, b, a] = rgba(&s, 170, 100);
        assert!(r < 64 && g < 64 && b < 64 && a == 255);
    }

    #[test]
    fn test_later_children_paint_over() {
        let mut s = Surface::new(20, 20).unwrap();
        let red = square(10.0, &ShapeStyle::new().xy([10.0, 10.0]).fill((1.0, 0.0, 0.0)));
        let green = square(10.0, &ShapeStyle::new().xy([10.0, 10.0]).fill((0.0, 1.0, 0.0)));
        group([red, green]).draw(&mut s).unwrap();
        assert_eq!(rgba(&s, 10, 10), [0, 255, 0, 255]);
    }

    #[test]
    fn test_translucent_fill_is_straight_on_export() {
        let mut s = Surface::new(10, 10).unwrap();
        square(20.0, &ShapeStyle::new().fill((0.0, 0.0, 1.0, 0.5)))
            .draw(&mut s)
            .unwrap();
        let [r, g, b, a] = rgba(&s, 2, 2);
        assert_eq!((r, g), (0, 0));
        assert!(b >= 254);
        assert!((127..=128).contains(&a));
        let rgb = s.get_image(false, YOrigin::Top).to_rgb8();
        assert_eq!(rgb.get_pixel(2, 2).0[0], 0);
    }

    #[test]
    fn test_pattern_snapshot_survives_drawing() {
        let mut s = Surface::with_background(4, 4, Color::WHITE).unwrap();
        let pattern = s.pattern();
        square(10.0, &ShapeStyle::new().fill(Color::BLACK)).draw(&mut s).unwrap();
        let p = pattern.image().pixel(0, 0).unwrap();
        assert_eq!((p.red(), p.alpha()), (255, 255));
        assert_eq!(rgba(&s, 0, 0), [0, 0, 0, 255]);
    }

    fn striped() -> Surface {
        // top half red, bottom half blue
        let mut img = RgbaImage::new(6, 4);
        for (_, y, px) in img.enumerate_pixels_mut() {
            *px = if y < 2 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) };
        }
        Surface::from_image(&DynamicImage::ImageRgba8(img)).unwrap()
    }

    #[test]
    fn test_flip_strategies_agree() {
        let s = striped();
        let native = s.flipped_with(FlipMode::Native).unwrap();
        let repaint = s.flipped_with(FlipMode::Repaint).unwrap();
        assert_eq!(rgba(&native, 0, 0), [0, 0, 255, 255]);
        assert_eq!(rgba(&native, 5, 3), [255, 0, 0, 255]);
        assert_eq!(native.pixmap().data(), repaint.pixmap().data());
    }

    #[test]
    fn test_get_image_bottom_origin() {
        let s = striped();
        let img = s.get_image(false, YOrigin::Bottom).to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(0, 3).0, [255, 0, 0]);
    }

    #[test]
    fn test_image_roundtrip() {
        let mut s = Surface::with_background(30, 20, Color::rgb(0.2, 0.4, 0.6)).unwrap();
        circle(6.0, &ShapeStyle::new().xy([15.0, 10.0]).fill((1.0, 1.0, 0.0)))
            .draw(&mut s)
            .unwrap();
        let img = s.get_image(true, YOrigin::Top);
        let back = Surface::from_image(&img).unwrap();
        assert_eq!(back.pixmap().data(), s.pixmap().data());
    }

    #[test]
    fn test_png_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out.png");
        let s = striped();
        s.write_to_png(&file, YOrigin::Bottom).unwrap();
        let back = Surface::from_png(&file).unwrap();
        assert_eq!((back.width(), back.height()), (6, 4));
        assert_eq!(rgba(&back, 0, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn test_configured_y_origin_drives_default_export() {
        let mut config = QuillConfig::default();
        config.export.y_origin = YOrigin::Bottom;
        let options = SurfaceOptions::from_config(&config);
        assert_eq!(options.y_origin, YOrigin::Bottom);

        let mut s = Surface::with_options(6, 4, options).unwrap();
        rectangle(6.0, 2.0, &ShapeStyle::new().xy([3.0, 1.0]).fill((1.0, 0.0, 0.0)))
            .draw(&mut s)
            .unwrap();
        assert_eq!(s.png_bytes().unwrap(), s.to_png(YOrigin::Bottom).unwrap());
        assert_ne!(s.png_bytes().unwrap(), s.to_png(YOrigin::Top).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("default.png");
        s.save_png(&file).unwrap();
        let back = Surface::from_png(&file).unwrap();
        assert_eq!(rgba(&back, 0, 3), [255, 0, 0, 255]);
        assert_eq!(rgba(&back, 0, 0)[3], 0);
    }

    #[test]
    fn test_html_embed() {
        let html = striped().html_embed(YOrigin::Top).unwrap();
        assert!(html.starts_with("<img  src=\"data:image/png;base64,iVBORw0KGgo"));
        assert!(html.ends_with("\">"));
    }

    #[test]
    fn test_zero_line_width_strokes_nothing() {
        let mut s = Surface::new(10, 10).unwrap();
        {
            let mut ctx = s.new_context().unwrap();
            ctx.rectangle(2.0, 2.0, 6.0, 6.0);
            ctx.set_line_width(0.0);
            ctx.stroke().unwrap();
        }
        assert!(s.pixmap().pixels().iter().all(|p| p.alpha() == 0));
    }
}
