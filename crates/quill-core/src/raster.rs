//! Conversions between `image` buffers and premultiplied tiny-skia pixmaps.

use image::{DynamicImage, RgbImage, RgbaImage};
use tiny_skia::{ColorU8, Pixmap};

use crate::error::{Error, Result};

/// Copy a grayscale, RGB or RGBA image into a new premultiplied pixmap.
pub fn pixmap_from_image(image: &DynamicImage) -> Result<Pixmap> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap =
        Pixmap::new(width, height).ok_or(Error::InvalidDimensions { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Straight-alpha copy of a pixmap: RGBA8 when `transparent`, otherwise RGB8 with the
/// alpha channel dropped.
pub fn image_from_pixmap(pixmap: &Pixmap, transparent: bool) -> DynamicImage {
    let (width, height) = (pixmap.width(), pixmap.height());
    let straight = pixmap.pixels().iter().map(|p| p.demultiply());
    if transparent {
        let mut out = RgbaImage::new(width, height);
        for (dst, c) in out.pixels_mut().zip(straight) {
            dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
        }
        DynamicImage::ImageRgba8(out)
    } else {
        let mut out = RgbImage::new(width, height);
        for (dst, c) in out.pixels_mut().zip(straight) {
            dst.0 = [c.red(), c.green(), c.blue()];
        }
        DynamicImage::ImageRgb8(out)
    }
}

/// Mirror a pixmap's rows in place.
pub fn flip_rows(pixmap: &mut Pixmap) {
    let stride = pixmap.width() as usize * 4;
    let height = pixmap.height() as usize;
    let data = pixmap.data_mut();
    for y in 0..height / 2 {
        let (top, bottom) = data.split_at_mut((height - 1 - y) * stride);
        top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
    }
}
