use std::str::FromStr;

use palette::{Srgb, Srgba};

use crate::error::{Error, Result};

/// Straight (non-premultiplied) sRGB color with components in `[0, 1]`.
///
/// Colors are handed to the backend as-is, without linearization, so `(1, 0, 0)`
/// paints pixels of exactly `#ff0000`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[inline]
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Components clamped to `[0, 1]`.
    pub fn clamped(&self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Convert to sRGB u8 RGBA (unpremultiplied).
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            (c.a * 255.0).round() as u8,
        ]
    }

    pub fn from_rgba8(c: [u8; 4]) -> Self {
        Self::rgba(
            c[0] as f64 / 255.0,
            c[1] as f64 / 255.0,
            c[2] as f64 / 255.0,
            c[3] as f64 / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<(f64, f64, f64)> for Color {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<(f64, f64, f64, f64)> for Color {
    fn from((r, g, b, a): (f64, f64, f64, f64)) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl From<[f64; 3]> for Color {
    fn from([r, g, b]: [f64; 3]) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<[f64; 4]> for Color {
    fn from([r, g, b, a]: [f64; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

impl From<Srgb<f64>> for Color {
    fn from(c: Srgb<f64>) -> Self {
        Self::rgb(c.red, c.green, c.blue)
    }
}

impl From<Srgba<f64>> for Color {
    fn from(c: Srgba<f64>) -> Self {
        Self::rgba(c.red, c.green, c.blue, c.alpha)
    }
}

/// Parse an HTML color of the exact form `#RRGGBB`.
pub fn html_color(s: &str) -> Result<Color> {
    if !(s.starts_with('#') && s.len() == 7) {
        return Err(Error::invalid(format!(
            "bad html color format {s:?}, expected '#RRGGBB'"
        )));
    }
    let parsed = Srgb::<u8>::from_str(s)
        .map_err(|e| Error::invalid(format!("bad html color {s:?}: {e}")))?;
    Ok(parsed.into_format::<f64>().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_color() {
        assert_eq!(html_color("#ff0000").unwrap(), Color::rgb(1.0, 0.0, 0.0));
        let c = html_color("#0080ff").unwrap();
        assert_eq!(c.to_rgba8(), [0, 128, 255, 255]);
    }

    #[test]
    fn test_html_color_invalid() {
        assert!(html_color("ff0000").is_err());
        assert!(html_color("#fff").is_err());
        assert!(html_color("#gggggg").is_err());
    }

    #[test]
    fn test_rgba8_clamps() {
        assert_eq!(Color::rgba(1.5, -0.2, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
        assert_eq!(Color::from_rgba8([255, 0, 0, 255]), Color::rgb(1.0, 0.0, 0.0));
    }
}
