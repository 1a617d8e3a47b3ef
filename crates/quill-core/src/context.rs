//! The drawing-context capability that backends implement.
//!
//! A context keeps a [`GraphicsState`]: current transform, path under construction,
//! source, line and font parameters. Path construction is shared; backends only provide
//! painting and text metrics.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::{Path, PathBuilder};
use crate::source::Source;
use crate::transform::Transform2D;
use crate::Point;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl FromStr for LineCap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "butt" => Ok(LineCap::Butt),
            "round" => Ok(LineCap::Round),
            "square" => Ok(LineCap::Square),
            other => Err(Error::invalid(format!("unknown line cap {other:?}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl FromStr for LineJoin {
    type Err = Error;

    /// Accepts the shape keywords `cut`, `square` and `round` as well as the backend
    /// names `bevel` and `miter`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cut" | "bevel" => Ok(LineJoin::Bevel),
            "square" | "miter" => Ok(LineJoin::Miter),
            "round" => Ok(LineJoin::Round),
            other => Err(Error::invalid(format!("unknown line join {other:?}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FromStr for FontWeight {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(FontWeight::Normal),
            "bold" => Ok(FontWeight::Bold),
            other => Err(Error::invalid(format!("unknown font weight {other:?}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FromStr for FontSlant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(FontSlant::Normal),
            "italic" => Ok(FontSlant::Italic),
            "oblique" => Ok(FontSlant::Oblique),
            other => Err(Error::invalid(format!("unknown font slant {other:?}"))),
        }
    }
}

/// Which corner the y axis starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YOrigin {
    /// Top-left origin, y pointing down.
    #[default]
    Top,
    /// Bottom-left origin, y pointing up.
    Bottom,
}

impl FromStr for YOrigin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(YOrigin::Top),
            "bottom" => Ok(YOrigin::Bottom),
            other => Err(Error::invalid(format!("unknown y origin {other:?}"))),
        }
    }
}

/// Family name plus style, resolved against the font database when text is drawn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
        }
    }
}

/// Ink box and advance of a laid-out string, in user units.
///
/// The bearings are measured from the pen origin to the top-left of the ink box, so for
/// ordinary text `y_bearing` is negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtents {
    pub x_bearing: f64,
    pub y_bearing: f64,
    pub width: f64,
    pub height: f64,
    pub x_advance: f64,
    pub y_advance: f64,
}

/// Mutable state of one drawing context.
#[derive(Clone, Debug)]
pub struct GraphicsState {
    pub matrix: Transform2D,
    pub path: PathBuilder,
    pub source: Source,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub font: FontDescriptor,
    pub font_size: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            matrix: Transform2D::identity(),
            path: PathBuilder::new(),
            source: Source::default(),
            line_width: 2.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            font: FontDescriptor::default(),
            font_size: 10.0,
        }
    }
}

/// A context that draws one leaf element onto a target.
///
/// Paths are built in user space. The current transform is read when the path is
/// painted, so stroke widths are in user units too.
pub trait DrawingContext {
    fn state(&self) -> &GraphicsState;
    fn state_mut(&mut self) -> &mut GraphicsState;

    /// Paint the interior of the current path (non-zero winding), keeping the path.
    fn fill_preserve(&mut self) -> Result<()>;

    /// Stroke the current path with the current line parameters, keeping the path.
    fn stroke_preserve(&mut self) -> Result<()>;

    /// Ink extents of `text` set in the current font and size.
    fn text_extents(&mut self, text: &str) -> Result<TextExtents>;

    /// Append the glyph outlines of `text` to the path, with the pen at the current point.
    fn text_path(&mut self, text: &str) -> Result<()>;

    fn matrix(&self) -> Transform2D {
        self.state().matrix
    }

    fn set_matrix(&mut self, matrix: Transform2D) {
        self.state_mut().matrix = matrix;
    }

    fn set_source(&mut self, source: Source) {
        self.state_mut().source = source;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state_mut().line_width = width;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state_mut().line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state_mut().line_join = join;
    }

    fn select_font_face(&mut self, font: FontDescriptor) {
        self.state_mut().font = font;
    }

    fn set_font_size(&mut self, size: f64) {
        self.state_mut().font_size = size;
    }

    fn current_point(&self) -> Option<Point> {
        self.state().path.current_point()
    }

    fn path(&self) -> &Path {
        self.state().path.path()
    }

    fn new_path(&mut self) {
        self.state_mut().path.clear();
    }

    fn move_to(&mut self, p: Point) {
        self.state_mut().path.move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        self.state_mut().path.line_to(p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.state_mut().path.curve_to(c1, c2, p);
    }

    fn arc(&mut self, center: Point, radius: f64, angle1: f64, angle2: f64) {
        self.state_mut().path.arc(center, radius, angle1, angle2);
    }

    fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.state_mut().path.rectangle(x, y, width, height);
    }

    fn close_path(&mut self) {
        self.state_mut().path.close_path();
    }

    fn fill(&mut self) -> Result<()> {
        self.fill_preserve()?;
        self.new_path();
        Ok(())
    }

    fn stroke(&mut self) -> Result<()> {
        self.stroke_preserve()?;
        self.new_path();
        Ok(())
    }
}

/// Something elements can be drawn onto.
pub trait DrawTarget {
    /// Width and height in device units.
    fn size(&self) -> (u32, u32);

    /// Open a fresh context with default state.
    fn new_context(&mut self) -> Result<Box<dyn DrawingContext + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullContext {
        state: GraphicsState,
        fills: usize,
    }

    impl DrawingContext for NullContext {
        fn state(&self) -> &GraphicsState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut GraphicsState {
            &mut self.state
        }
        fn fill_preserve(&mut self) -> Result<()> {
            self.fills += 1;
            Ok(())
        }
        fn stroke_preserve(&mut self) -> Result<()> {
            Ok(())
        }
        fn text_extents(&mut self, _text: &str) -> Result<TextExtents> {
            Ok(TextExtents::default())
        }
        fn text_path(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults() {
        let state = GraphicsState::default();
        assert_eq!(state.line_width, 2.0);
        assert_eq!(state.font_size, 10.0);
        assert_eq!(state.source, Source::rgb(0.0, 0.0, 0.0));
        assert!(state.matrix.is_identity(1e-12));
    }

    #[test]
    fn test_fill_clears_path() {
        let mut ctx = NullContext {
            state: GraphicsState::default(),
            fills: 0,
        };
        ctx.rectangle(0.0, 0.0, 1.0, 1.0);
        ctx.fill_preserve().unwrap();
        assert!(!ctx.path().is_empty());
        ctx.fill().unwrap();
        assert!(ctx.path().is_empty());
        assert_eq!(ctx.fills, 2);
        assert_eq!(ctx.current_point(), None);
    }

    #[test]
    fn test_keyword_parsing() {
        assert_eq!("cut".parse::<LineJoin>().unwrap(), LineJoin::Bevel);
        assert_eq!("square".parse::<LineJoin>().unwrap(), LineJoin::Miter);
        assert_eq!("square".parse::<LineCap>().unwrap(), LineCap::Square);
        assert_eq!("oblique".parse::<FontSlant>().unwrap(), FontSlant::Oblique);
        assert_eq!("bold".parse::<FontWeight>().unwrap(), FontWeight::Bold);
        assert!(matches!(
            "pointy".parse::<LineCap>(),
            Err(Error::InvalidArgument(_))
        ));
        assert!("zigzag".parse::<LineJoin>().is_err());
        assert!("heavy".parse::<FontWeight>().is_err());
        assert_eq!("bottom".parse::<YOrigin>().unwrap(), YOrigin::Bottom);
        assert!("left".parse::<YOrigin>().is_err());
    }
}
