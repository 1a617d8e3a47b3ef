//! Fill and stroke sources: solid colors, gradients and image patterns.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::raster;
use crate::transform::{Transform2D, Transformable};
use crate::Point;

/// What a path is filled or stroked with.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Solid(Color),
    Gradient(ColorGradient),
    Pattern(ImagePattern),
}

impl Source {
    /// Build a solid source from a numeric sequence: 4 values are RGBA, 3 values RGB.
    pub fn from_components(components: &[f64]) -> Result<Self> {
        match *components {
            [r, g, b, a] => Ok(Source::Solid(Color::rgba(r, g, b, a))),
            [r, g, b] => Ok(Source::Solid(Color::rgb(r, g, b))),
            _ => Err(Error::invalid(format!(
                "a color needs 3 (RGB) or 4 (RGBA) components, got {}",
                components.len()
            ))),
        }
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Source::Solid(Color::rgb(r, g, b))
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Source::Solid(Color::rgba(r, g, b, a))
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Solid(Color::BLACK)
    }
}

impl From<Color> for Source {
    fn from(c: Color) -> Self {
        Source::Solid(c)
    }
}

impl From<(f64, f64, f64)> for Source {
    fn from(c: (f64, f64, f64)) -> Self {
        Source::Solid(c.into())
    }
}

impl From<(f64, f64, f64, f64)> for Source {
    fn from(c: (f64, f64, f64, f64)) -> Self {
        Source::Solid(c.into())
    }
}

impl From<[f64; 3]> for Source {
    fn from(c: [f64; 3]) -> Self {
        Source::Solid(c.into())
    }
}

impl From<[f64; 4]> for Source {
    fn from(c: [f64; 4]) -> Self {
        Source::Solid(c.into())
    }
}

impl From<ColorGradient> for Source {
    fn from(g: ColorGradient) -> Self {
        Source::Gradient(g)
    }
}

impl From<ImagePattern> for Source {
    fn from(p: ImagePattern) -> Self {
        Source::Pattern(p)
    }
}

// --- Gradients ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

impl FromStr for GradientKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(GradientKind::Linear),
            "radial" => Ok(GradientKind::Radial),
            other => Err(Error::invalid(format!("unknown gradient type {other:?}"))),
        }
    }
}

/// Control geometry of a gradient, in the user space of the shape it paints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientGeometry {
    Linear {
        start: Point,
        end: Point,
    },
    /// Two-circle radial gradient from the start circle to the end circle.
    Radial {
        start_center: Point,
        start_radius: f64,
        end_center: Point,
        end_radius: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, in `[0, 1]`.
    pub offset: f64,
    pub color: Color,
}

/// A linear or radial color gradient.
///
/// Stops are kept in the order they were given; backends read them through
/// [`ColorGradient::sorted_stops`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColorGradient {
    pub geometry: GradientGeometry,
    pub stops: Vec<GradientStop>,
}

fn collect_stops<C: Into<Color>>(stops: impl IntoIterator<Item = (f64, C)>) -> Vec<GradientStop> {
    stops
        .into_iter()
        .map(|(offset, color)| GradientStop {
            offset,
            color: color.into(),
        })
        .collect()
}

impl ColorGradient {
    /// Gradient along the segment `start -> end`.
    pub fn linear<C: Into<Color>>(
        start: Point,
        end: Point,
        stops: impl IntoIterator<Item = (f64, C)>,
    ) -> Self {
        Self {
            geometry: GradientGeometry::Linear { start, end },
            stops: collect_stops(stops),
        }
    }

    /// Gradient between two circles.
    pub fn radial<C: Into<Color>>(
        start_center: Point,
        start_radius: f64,
        end_center: Point,
        end_radius: f64,
        stops: impl IntoIterator<Item = (f64, C)>,
    ) -> Self {
        Self {
            geometry: GradientGeometry::Radial {
                start_center,
                start_radius,
                end_center,
                end_radius,
            },
            stops: collect_stops(stops),
        }
    }

    /// Build a gradient from a kind keyword and two or three coordinate pairs.
    ///
    /// For `"linear"`, `xy1` and `xy2` are the end points and `xy3` is ignored. For
    /// `"radial"` the three pairs are read as the flat sequence
    /// `(cx0, cy0, r0, cx1, cy1, r1)`: `xy1` is the start center, `xy2` holds the start
    /// radius and the end center x, `xy3` holds the end center y and the end radius.
    pub fn new<C: Into<Color>>(
        kind: &str,
        stops: impl IntoIterator<Item = (f64, C)>,
        xy1: Point,
        xy2: Point,
        xy3: Option<Point>,
    ) -> Result<Self> {
        match kind.parse::<GradientKind>()? {
            GradientKind::Linear => Ok(Self::linear(xy1, xy2, stops)),
            GradientKind::Radial => {
                let xy3 = xy3.ok_or_else(|| {
                    Error::invalid("a radial gradient needs three coordinate pairs")
                })?;
                Ok(Self::radial(xy1, xy2[0], [xy2[1], xy3[0]], xy3[1], stops))
            }
        }
    }

    pub fn kind(&self) -> GradientKind {
        match self.geometry {
            GradientGeometry::Linear { .. } => GradientKind::Linear,
            GradientGeometry::Radial { .. } => GradientKind::Radial,
        }
    }

    /// Stops ordered by offset; stops with equal offsets keep the order they were
    /// added in.
    pub fn sorted_stops(&self) -> Vec<GradientStop> {
        let mut stops = self.stops.clone();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        stops
    }

    /// Append a stop after the existing ones.
    pub fn with_stop(mut self, offset: f64, color: impl Into<Color>) -> Self {
        self.stops.push(GradientStop {
            offset,
            color: color.into(),
        });
        self
    }
}

// --- Image patterns ---

/// Resampling filter used when a pattern is drawn under a non-identity transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternFilter {
    #[default]
    Best,
    Nearest,
    Good,
    Bilinear,
    Fast,
    Gaussian,
}

impl FromStr for PatternFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "best" => PatternFilter::Best,
            "nearest" => PatternFilter::Nearest,
            "good" => PatternFilter::Good,
            "bilinear" => PatternFilter::Bilinear,
            "fast" => PatternFilter::Fast,
            "gaussian" => PatternFilter::Gaussian,
            other => return Err(Error::invalid(format!("unknown pattern filter {other:?}"))),
        })
    }
}

/// What a pattern paints outside the bounds of its image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternExtend {
    /// Transparent outside the image.
    #[default]
    None,
    Repeat,
    Reflect,
    /// Repeat the nearest edge pixel.
    Pad,
}

impl FromStr for PatternExtend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "none" => PatternExtend::None,
            "repeat" => PatternExtend::Repeat,
            "reflect" => PatternExtend::Reflect,
            "pad" => PatternExtend::Pad,
            other => return Err(Error::invalid(format!("unknown pattern extend {other:?}"))),
        })
    }
}

/// An image used as a fill or stroke source.
///
/// The placement matrix maps user space to image pixel space. It starts as
/// `translation(pixel_zero)`, so the pixel at `pixel_zero` lands on the user-space
/// origin, and can be rotated, translated and scaled like an element.
///
/// The pixels are shared, never copied: a pattern built from a surface keeps the pixels
/// the surface had at that moment, even if the surface is drawn on afterwards.
#[derive(Clone)]
pub struct ImagePattern {
    image: Arc<Pixmap>,
    matrix: Transform2D,
    filter: PatternFilter,
    extend: PatternExtend,
}

impl ImagePattern {
    pub fn new(image: Arc<Pixmap>) -> Self {
        Self {
            image,
            matrix: Transform2D::identity(),
            filter: PatternFilter::default(),
            extend: PatternExtend::default(),
        }
    }

    /// Build a pattern from a decoded image (grayscale, RGB or RGBA).
    pub fn from_image(image: &image::DynamicImage) -> Result<Self> {
        Ok(Self::new(Arc::new(raster::pixmap_from_image(image)?)))
    }

    /// Place the image so that `pixel_zero` maps to the user-space origin.
    pub fn with_pixel_zero(self, pixel_zero: Point) -> Self {
        Self {
            matrix: Transform2D::translation(pixel_zero[0], pixel_zero[1]),
            ..self
        }
    }

    pub fn with_filter(self, filter: PatternFilter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_extend(self, extend: PatternExtend) -> Self {
        Self { extend, ..self }
    }

    pub fn image(&self) -> &Pixmap {
        &self.image
    }

    pub fn filter(&self) -> PatternFilter {
        self.filter
    }

    pub fn extend(&self) -> PatternExtend {
        self.extend
    }
}

impl Transformable for ImagePattern {
    fn matrix(&self) -> Transform2D {
        self.matrix
    }

    fn set_matrix(&self, matrix: Transform2D) -> Self {
        Self {
            image: Arc::clone(&self.image),
            matrix,
            filter: self.filter,
            extend: self.extend,
        }
    }
}

impl PartialEq for ImagePattern {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
            && self.matrix == other.matrix
            && self.filter == other.filter
            && self.extend == other.extend
    }
}

impl fmt::Debug for ImagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePattern")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("matrix", &self.matrix)
            .field("filter", &self.filter)
            .field("extend", &self.extend)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_components() {
        assert_eq!(
            Source::from_components(&[1.0, 0.0, 0.0]).unwrap(),
            Source::Solid(Color::rgb(1.0, 0.0, 0.0))
        );
        assert_eq!(
            Source::from_components(&[0.0, 1.0, 0.0, 0.5]).unwrap(),
            Source::Solid(Color::rgba(0.0, 1.0, 0.0, 0.5))
        );
        assert!(matches!(
            Source::from_components(&[1.0, 0.0]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(Source::from_components(&[0.0; 5]).is_err());
    }

    #[test]
    fn test_gradient_kind_parsing() {
        assert_eq!("linear".parse::<GradientKind>().unwrap(), GradientKind::Linear);
        assert_eq!("radial".parse::<GradientKind>().unwrap(), GradientKind::Radial);
        assert!("conic".parse::<GradientKind>().is_err());
    }

    #[test]
    fn test_gradient_new() {
        let stops = [(0.0, (1.0, 0.0, 0.0)), (1.0, (0.0, 0.0, 1.0))];
        let lin = ColorGradient::new("linear", stops, [0.0, 0.0], [10.0, 0.0], None).unwrap();
        assert_eq!(lin.kind(), GradientKind::Linear);
        assert_eq!(lin.stops.len(), 2);

        let rad = ColorGradient::new("radial", stops, [1.0, 2.0], [3.0, 4.0], Some([5.0, 6.0]))
            .unwrap();
        assert_eq!(
            rad.geometry,
            GradientGeometry::Radial {
                start_center: [1.0, 2.0],
                start_radius: 3.0,
                end_center: [4.0, 5.0],
                end_radius: 6.0,
            }
        );

        assert!(ColorGradient::new("radial", stops, [0.0, 0.0], [1.0, 1.0], None).is_err());
        assert!(matches!(
            ColorGradient::new("spiral", stops, [0.0, 0.0], [1.0, 1.0], None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_gradient_keeps_stop_order() {
        let g = ColorGradient::linear([0.0, 0.0], [1.0, 0.0], [(0.8, Color::WHITE)])
            .with_stop(0.2, (0.0, 0.0, 0.0, 0.5));
        let offsets: Vec<f64> = g.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.8, 0.2]);
        let sorted: Vec<f64> = g.sorted_stops().iter().map(|s| s.offset).collect();
        assert_eq!(sorted, vec![0.2, 0.8]);
    }

    #[test]
    fn test_pattern_keywords() {
        assert_eq!("gaussian".parse::<PatternFilter>().unwrap(), PatternFilter::Gaussian);
        assert_eq!("reflect".parse::<PatternExtend>().unwrap(), PatternExtend::Reflect);
        assert!("blurry".parse::<PatternFilter>().is_err());
        assert!("mirror".parse::<PatternExtend>().is_err());
    }

    #[test]
    fn test_pattern_is_transformable() {
        let pixmap = Arc::new(Pixmap::new(4, 4).unwrap());
        let pattern = ImagePattern::new(pixmap).with_pixel_zero([2.0, 1.0]);
        let moved = pattern.translate([1.0, 1.0]).scale(2.0);
        assert_eq!(pattern.matrix(), Transform2D::translation(2.0, 1.0));
        assert_eq!(moved.matrix().apply_point([0.0, 0.0]), [6.0, 4.0]);
    }
}
