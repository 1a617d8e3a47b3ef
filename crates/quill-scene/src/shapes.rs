//! Shape constructors.
//!
//! Every shape is built around the origin and then placed with the style's `angle` and
//! `xy`: first rotated about the origin, then translated.

use std::f64::consts::TAU;

use quill_core::geometry::{regular_polygon_points, star_points};
use quill_core::{
    DrawingContext, Error, LineCap, LineJoin, Point, Result, Source, Transformable,
};

use crate::element::Element;

/// Placement and paint parameters shared by all shape constructors.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeStyle {
    pub xy: Point,
    pub angle: f64,
    /// Interior paint; `None` leaves the shape unfilled.
    pub fill: Option<Source>,
    pub stroke: Source,
    /// `0` disables stroking.
    pub stroke_width: f64,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            xy: [0.0, 0.0],
            angle: 0.0,
            fill: None,
            stroke: Source::default(),
            stroke_width: 0.0,
            line_cap: None,
            line_join: None,
        }
    }
}

impl ShapeStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn xy(mut self, xy: Point) -> Self {
        self.xy = xy;
        self
    }

    pub fn angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn fill(mut self, fill: impl Into<Source>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Stroke with `source` at `width` user units.
    pub fn stroke(mut self, source: impl Into<Source>, width: f64) -> Self {
        self.stroke = source.into();
        self.stroke_width = width;
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Set the line cap from one of `butt`, `round` or `square`.
    pub fn line_cap(mut self, cap: &str) -> Result<Self> {
        self.line_cap = Some(cap.parse()?);
        Ok(self)
    }

    /// Set the line join from one of `cut`, `square` or `round`.
    pub fn line_join(mut self, join: &str) -> Result<Self> {
        self.line_join = Some(join.parse()?);
        Ok(self)
    }
}

/// Wrap a path procedure into a painted, placed element.
///
/// The path is filled first (if a fill is set), then stroked over the same path when
/// `stroke_width > 0`.
pub fn shape_element<F>(draw_path: F, style: &ShapeStyle) -> Element
where
    F: Fn(&mut dyn DrawingContext) + Send + Sync + 'static,
{
    let paint = style.clone();
    let mut element = Element::new(move |ctx| {
        draw_path(ctx);
        if let Some(fill) = &paint.fill {
            ctx.set_source(fill.clone());
            ctx.fill_preserve()?;
        }
        if paint.stroke_width > 0.0 {
            ctx.set_line_width(paint.stroke_width);
            if let Some(cap) = paint.line_cap {
                ctx.set_line_cap(cap);
            }
            if let Some(join) = paint.line_join {
                ctx.set_line_join(join);
            }
            ctx.set_source(paint.stroke.clone());
            ctx.stroke_preserve()?;
        }
        Ok(())
    });

    if style.angle != 0.0 {
        element = element.rotate(style.angle);
    }
    if style.xy != [0.0, 0.0] {
        element = element.translate(style.xy);
    }
    element
}

/// Rectangle of size `lx` by `ly` centered on the origin.
pub fn rectangle(lx: f64, ly: f64, style: &ShapeStyle) -> Element {
    shape_element(
        move |ctx| ctx.rectangle(-lx / 2.0, -ly / 2.0, lx, ly),
        style,
    )
}

pub fn square(l: f64, style: &ShapeStyle) -> Element {
    rectangle(l, l, style)
}

/// Arc of radius `r` around the origin from `a1` to `a2` (radians).
pub fn arc(r: f64, a1: f64, a2: f64, style: &ShapeStyle) -> Element {
    shape_element(move |ctx| ctx.arc([0.0, 0.0], r, a1, a2), style)
}

pub fn circle(r: f64, style: &ShapeStyle) -> Element {
    arc(r, 0.0, TAU, style)
}

/// Open or closed polyline through `points`.
pub fn polyline(points: Vec<Point>, close_path: bool, style: &ShapeStyle) -> Result<Element> {
    if points.is_empty() {
        return Err(Error::invalid("a polyline needs at least one point"));
    }
    Ok(shape_element(
        move |ctx| {
            ctx.move_to(points[0]);
            for &p in &points[1..] {
                ctx.line_to(p);
            }
            if close_path {
                ctx.close_path();
            }
        },
        style,
    ))
}

/// Regular polygon with `n` vertices on a circle of radius `r`, the first at angle 0.
pub fn regular_polygon(r: f64, n: usize, style: &ShapeStyle) -> Result<Element> {
    if n < 3 {
        return Err(Error::invalid(format!(
            "a regular polygon needs at least 3 sides, got {n}"
        )));
    }
    polyline(regular_polygon_points(r, n), true, style)
}

/// Cubic Bezier curve from four points: start, two controls, end.
pub fn bezier_curve(points: &[Point], style: &ShapeStyle) -> Result<Element> {
    let &[p0, p1, p2, p3] = points else {
        return Err(Error::invalid(format!(
            "a bezier curve needs exactly 4 points, got {}",
            points.len()
        )));
    };
    Ok(shape_element(
        move |ctx| {
            ctx.move_to(p0);
            ctx.curve_to(p1, p2, p3);
        },
        style,
    ))
}

/// Ellipse of width `w` and height `h` centered on the origin.
pub fn ellipse(w: f64, h: f64, style: &ShapeStyle) -> Element {
    // Control point offset of a quarter circle approximated by one cubic.
    let k = 4.0 / 3.0 * (2f64.sqrt() - 1.0);
    let (rx, ry) = (w / 2.0, h / 2.0);
    shape_element(
        move |ctx| {
            ctx.move_to([rx, 0.0]);
            ctx.curve_to([rx, -ry * k], [rx * k, -ry], [0.0, -ry]);
            ctx.curve_to([-rx * k, -ry], [-rx, -ry * k], [-rx, 0.0]);
            ctx.curve_to([-rx, ry * k], [-rx * k, ry], [0.0, ry]);
            ctx.curve_to([rx * k, ry], [rx, ry * k], [rx, 0.0]);
            ctx.close_path();
        },
        style,
    )
}

/// Star with `nbranches` points of radius `radius` and inner vertices at
/// `radius * ratio`.
pub fn star(nbranches: usize, radius: f64, ratio: f64, style: &ShapeStyle) -> Result<Element> {
    if nbranches == 0 {
        return Err(Error::invalid("a star needs at least one branch"));
    }
    polyline(star_points(nbranches, radius, ratio), true, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PaintOp, RecordingTarget};
    use quill_core::{Color, Path, PathCmd, Transform2D};
    use std::f64::consts::{FRAC_PI_4, PI};

    const EPSILON: f64 = 1e-9;

    fn approx_pt(a: Point, b: Point) -> bool {
        (a[0] - b[0]).abs() < EPSILON && (a[1] - b[1]).abs() < EPSILON
    }

    fn render(e: &Element) -> RecordingTarget {
        let mut target = RecordingTarget::default();
        e.draw(&mut target).unwrap();
        target
    }

    fn only_path(e: &Element) -> Path {
        render(e).ops[0].path.clone()
    }

    #[test]
    fn test_fill_then_stroke_same_path() {
        let style = ShapeStyle::new()
            .fill((1.0, 0.0, 0.0))
            .stroke(Color::BLACK, 3.0)
            .line_join("round")
            .unwrap();
        let target = render(&circle(10.0, &style));
        assert_eq!(target.ops.len(), 2);
        assert_eq!(target.ops[0].op, PaintOp::Fill);
        assert_eq!(target.ops[0].source, Source::rgb(1.0, 0.0, 0.0));
        assert_eq!(target.ops[1].op, PaintOp::Stroke);
        assert_eq!(target.ops[1].line_width, 3.0);
        assert_eq!(target.ops[1].line_join, LineJoin::Round);
        assert_eq!(target.ops[0].path, target.ops[1].path);
        assert_eq!(target.fills().len(), 1);
        assert_eq!(target.strokes().len(), 1);
        assert_eq!(target.strokes()[0].source, Source::Solid(Color::BLACK));
    }

    #[test]
    fn test_defaults_paint_nothing() {
        let target = render(&square(5.0, &ShapeStyle::default()));
        assert!(target.ops.is_empty());
        assert_eq!(target.contexts_opened, 1);
    }

    #[test]
    fn test_rectangle_rotated_corners() {
        let style = ShapeStyle::new()
            .fill(Color::BLACK)
            .xy([50.0, 50.0])
            .angle(FRAC_PI_4);
        let target = render(&rectangle(40.0, 40.0, &style));
        let corners = target.ops[0].device_vertices();
        let axis_aligned = [[30.0, 30.0], [70.0, 30.0], [70.0, 70.0], [30.0, 70.0]];
        let rot = Transform2D::rotation(FRAC_PI_4).around([50.0, 50.0]);
        assert_eq!(corners.len(), 4);
        for (got, corner) in corners.iter().zip(axis_aligned) {
            assert!(approx_pt(*got, rot.apply_point(corner)));
        }
    }

    #[test]
    fn test_placement_order() {
        // rotate about the origin first, then translate
        let style = ShapeStyle::new().xy([10.0, 0.0]).angle(PI / 2.0);
        let e = square(1.0, &style);
        let expected = Transform2D::translation(10.0, 0.0).then(&Transform2D::rotation(PI / 2.0));
        assert!(e.matrix().approx_eq(&expected, EPSILON));
        assert!(square(1.0, &ShapeStyle::default()).matrix().is_identity(EPSILON));
    }

    #[test]
    fn test_star_vertices() {
        let style = ShapeStyle::new().fill(Color::BLACK);
        let path = only_path(&star(5, 10.0, 0.5, &style).unwrap());
        let vertices = path.vertices();
        assert_eq!(vertices.len(), 10);
        for (k, p) in vertices.iter().enumerate() {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            assert!((r - if k % 2 == 0 { 10.0 } else { 5.0 }).abs() < EPSILON);
            let angle = p[1].atan2(p[0]).rem_euclid(2.0 * PI);
            assert!((angle - PI * k as f64 / 5.0).abs() < 1e-6);
        }
        assert_eq!(path.cmds.last(), Some(&PathCmd::Close));
    }

    #[test]
    fn test_regular_polygon() {
        let style = ShapeStyle::new().fill(Color::BLACK);
        let path = only_path(&regular_polygon(2.0, 4, &style).unwrap());
        let v = path.vertices();
        assert_eq!(v.len(), 4);
        assert!(approx_pt(v[1], [0.0, 2.0]));
        assert!(matches!(
            regular_polygon(2.0, 2, &style),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_polyline_open_and_closed() {
        let style = ShapeStyle::new().stroke(Color::BLACK, 1.0);
        let pts = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let open = only_path(&polyline(pts.clone(), false, &style).unwrap());
        assert_eq!(open.cmds.len(), 3);
        let closed = only_path(&polyline(pts, true, &style).unwrap());
        assert_eq!(closed.cmds.last(), Some(&PathCmd::Close));
        assert!(polyline(vec![], false, &style).is_err());
    }

    #[test]
    fn test_bezier_arity() {
        let style = ShapeStyle::new().stroke(Color::BLACK, 1.0);
        let pts = [[0.0, 0.0], [1.0, 2.0], [3.0, 2.0], [4.0, 0.0]];
        let path = only_path(&bezier_curve(&pts, &style).unwrap());
        assert_eq!(
            path.cmds,
            vec![
                PathCmd::MoveTo([0.0, 0.0]),
                PathCmd::CubicTo([1.0, 2.0], [3.0, 2.0], [4.0, 0.0])
            ]
        );
        assert!(bezier_curve(&pts[..3], &style).is_err());
    }

    #[test]
    fn test_ellipse_extent() {
        let style = ShapeStyle::new().fill(Color::BLACK);
        let path = only_path(&ellipse(40.0, 20.0, &style));
        let [x0, y0, x1, y1] = path.bounds().unwrap();
        assert!((x0 + 20.0).abs() < EPSILON && (x1 - 20.0).abs() < EPSILON);
        assert!((y0 + 10.0).abs() < EPSILON && (y1 - 10.0).abs() < EPSILON);
        assert_eq!(path.vertices()[0], [20.0, 0.0]);
    }

    #[test]
    fn test_star_needs_branches() {
        assert!(star(0, 1.0, 0.5, &ShapeStyle::default()).is_err());
    }

    #[test]
    fn test_unknown_keywords() {
        assert!(ShapeStyle::new().line_cap("pointy").is_err());
        assert!(ShapeStyle::new().line_join("mitre").is_err());
        let style = ShapeStyle::new().line_cap("square").unwrap();
        assert_eq!(style.line_cap, Some(LineCap::Square));
    }
}
