//! Text elements: a single line of glyph outlines, aligned on its ink box.

use std::str::FromStr;

use quill_core::{
    Error, FontDescriptor, FontSlant, FontWeight, Point, Result, Source, Transformable, YOrigin,
};

use crate::element::Element;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for HAlign {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(HAlign::Left),
            "center" => Ok(HAlign::Center),
            "right" => Ok(HAlign::Right),
            other => Err(Error::invalid(format!("unknown horizontal alignment {other:?}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

impl FromStr for VAlign {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(VAlign::Top),
            "center" => Ok(VAlign::Center),
            "bottom" => Ok(VAlign::Bottom),
            other => Err(Error::invalid(format!("unknown vertical alignment {other:?}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontDescriptor,
    pub font_size: f64,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub fill: Source,
    pub stroke: Source,
    pub stroke_width: f64,
    pub angle: f64,
    /// Anchor point the ink box is aligned to.
    pub xy: Point,
    /// Set to `Bottom` when the surface will be exported bottom-up, so the glyphs come
    /// out upright.
    pub y_origin: YOrigin,
}

impl TextStyle {
    pub fn new(family: impl Into<String>, font_size: f64) -> Self {
        Self {
            font: FontDescriptor {
                family: family.into(),
                ..FontDescriptor::default()
            },
            font_size,
            h_align: HAlign::default(),
            v_align: VAlign::default(),
            fill: Source::default(),
            stroke: Source::default(),
            stroke_width: 0.0,
            angle: 0.0,
            xy: [0.0, 0.0],
            y_origin: YOrigin::Top,
        }
    }

    /// `normal` or `bold`.
    pub fn weight(mut self, weight: &str) -> Result<Self> {
        self.font.weight = weight.parse::<FontWeight>()?;
        Ok(self)
    }

    /// `normal`, `italic` or `oblique`.
    pub fn slant(mut self, slant: &str) -> Result<Self> {
        self.font.slant = slant.parse::<FontSlant>()?;
        Ok(self)
    }

    pub fn h_align(mut self, align: &str) -> Result<Self> {
        self.h_align = align.parse()?;
        Ok(self)
    }

    pub fn v_align(mut self, align: &str) -> Result<Self> {
        self.v_align = align.parse()?;
        Ok(self)
    }

    pub fn y_origin(mut self, origin: &str) -> Result<Self> {
        self.y_origin = origin.parse()?;
        Ok(self)
    }

    pub fn fill(mut self, fill: impl Into<Source>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn stroke(mut self, source: impl Into<Source>, width: f64) -> Self {
        self.stroke = source.into();
        self.stroke_width = width;
        self
    }

    pub fn angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn xy(mut self, xy: Point) -> Self {
        self.xy = xy;
        self
    }
}

/// A text element: `txt` is measured, aligned around `style.xy`, filled, and
/// optionally stroked.
pub fn text(txt: impl Into<String>, style: &TextStyle) -> Element {
    let txt: String = txt.into();
    let s = style.clone();
    let element = Element::new(move |ctx| {
        ctx.select_font_face(s.font.clone());
        ctx.set_font_size(s.font_size);
        let ext = ctx.text_extents(&txt)?;
        let xshift = match s.h_align {
            HAlign::Left => 0.0,
            HAlign::Center => -ext.width / 2.0,
            HAlign::Right => -ext.width,
        } - ext.x_bearing;
        let yshift = match s.v_align {
            VAlign::Bottom => 0.0,
            VAlign::Center => -ext.height / 2.0,
            VAlign::Top => -ext.height,
        } - ext.y_bearing;
        let origin = [s.xy[0] + xshift, s.xy[1] + yshift];

        ctx.move_to(origin);
        ctx.text_path(&txt)?;
        ctx.set_source(s.fill.clone());
        ctx.fill()?;
        if s.stroke_width > 0.0 {
            ctx.move_to(origin);
            ctx.text_path(&txt)?;
            ctx.set_source(s.stroke.clone());
            ctx.set_line_width(s.stroke_width);
            ctx.stroke()?;
        }
        Ok(())
    });

    let flip = match style.y_origin {
        YOrigin::Top => 1.0,
        YOrigin::Bottom => -1.0,
    };
    element.scale_xy(1.0, flip).rotate(style.angle)
}
