//! Conversions from quill's geometry and sources to tiny-skia paint.

use quill_core::{
    Color, ColorGradient, GradientGeometry, ImagePattern, LineCap, LineJoin, Path, PathCmd,
    PatternExtend, PatternFilter, Source, Transform2D, Transformable,
};
use tiny_skia::{
    FilterQuality, GradientStop, LinearGradient, Mask, Paint, Point, RadialGradient, Shader,
    SpreadMode, Transform,
};

pub(crate) fn transform(m: &Transform2D) -> Transform {
    Transform::from_row(
        m.a as f32,
        m.b as f32,
        m.c as f32,
        m.d as f32,
        m.tx as f32,
        m.ty as f32,
    )
}

pub(crate) fn color(c: Color) -> tiny_skia::Color {
    let [r, g, b, a] = c.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn point(p: [f64; 2]) -> Point {
    Point::from_xy(p[0] as f32, p[1] as f32)
}

/// `None` for paths with nothing to paint (empty or a lone move).
pub(crate) fn path(path: &Path) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for cmd in &path.cmds {
        match *cmd {
            PathCmd::MoveTo([x, y]) => pb.move_to(x as f32, y as f32),
            PathCmd::LineTo([x, y]) => pb.line_to(x as f32, y as f32),
            PathCmd::QuadTo([cx, cy], [x, y]) => {
                pb.quad_to(cx as f32, cy as f32, x as f32, y as f32)
            }
            PathCmd::CubicTo([c1x, c1y], [c2x, c2y], [x, y]) => pb.cubic_to(
                c1x as f32, c1y as f32, c2x as f32, c2y as f32, x as f32, y as f32,
            ),
            PathCmd::Close => pb.close(),
        }
    }
    pb.finish()
}

pub(crate) fn line_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

pub(crate) fn line_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

/// A paint for `source` plus, for non-repeating image patterns, a clip mask covering
/// the image in device space. `None` when the source paints nothing.
pub(crate) fn paint<'a>(
    source: &'a Source,
    ctm: &Transform2D,
    size: (u32, u32),
    anti_alias: bool,
) -> Option<(Paint<'a>, Option<Mask>)> {
    let (shader, mask) = match source {
        Source::Solid(c) => (Shader::SolidColor(color(*c)), None),
        Source::Gradient(g) => (gradient_shader(g)?, None),
        Source::Pattern(p) => pattern_shader(p, ctm, size, anti_alias)?,
    };
    let paint = Paint {
        shader,
        anti_alias,
        ..Paint::default()
    };
    Some((paint, mask))
}

fn gradient_shader(g: &ColorGradient) -> Option<Shader<'static>> {
    let stops = g.sorted_stops();
    let shader = match g.geometry {
        GradientGeometry::Linear { start, end } => LinearGradient::new(
            point(start),
            point(end),
            skia_stops(stops.iter().map(|s| (s.offset, s.color))),
            SpreadMode::Pad,
            Transform::identity(),
        ),
        GradientGeometry::Radial {
            start_center,
            start_radius,
            end_center,
            end_radius,
        } if start_center == end_center && start_radius > 0.0 => {
            let outer = start_radius.max(end_radius);
            if start_radius == end_radius {
                log::debug!("skipping radial gradient between two equal circles");
                return None;
            }
            // Concentric circles: re-express each stop as a fraction of the outer radius.
            let mut remapped: Vec<(f64, Color)> = stops
                .iter()
                .map(|s| {
                    let r = start_radius + s.offset * (end_radius - start_radius);
                    (r / outer, s.color)
                })
                .collect();
            if end_radius < start_radius {
                remapped.reverse();
            }
            RadialGradient::new(
                point(start_center),
                point(end_center),
                outer as f32,
                skia_stops(remapped),
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
        GradientGeometry::Radial {
            start_center,
            start_radius,
            end_center,
            end_radius,
        } => {
            if start_radius > 0.0 {
                log::debug!("radial gradient start radius {start_radius} reduced to its center");
            }
            RadialGradient::new(
                point(start_center),
                point(end_center),
                end_radius as f32,
                skia_stops(stops.iter().map(|s| (s.offset, s.color))),
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
    };
    if shader.is_none() {
        log::debug!("skipping degenerate {:?} gradient", g.kind());
    }
    shader
}

fn skia_stops(stops: impl IntoIterator<Item = (f64, Color)>) -> Vec<GradientStop> {
    stops
        .into_iter()
        .map(|(offset, c)| GradientStop::new(offset as f32, color(c)))
        .collect()
}

/// Sampling quality for a pattern drawn with the combined user-to-device transform
/// `total`. Pixel-exact placements (unit scale, possibly mirrored, integer offset)
/// always sample nearest.
fn filter_quality(filter: PatternFilter, total: &Transform2D) -> FilterQuality {
    let pixel_exact = total.b == 0.0
        && total.c == 0.0
        && total.a.abs() == 1.0
        && total.d.abs() == 1.0
        && total.tx.fract() == 0.0
        && total.ty.fract() == 0.0;
    if pixel_exact {
        return FilterQuality::Nearest;
    }
    match filter {
        PatternFilter::Best | PatternFilter::Gaussian => FilterQuality::Bicubic,
        PatternFilter::Good | PatternFilter::Bilinear => FilterQuality::Bilinear,
        PatternFilter::Nearest | PatternFilter::Fast => FilterQuality::Nearest,
    }
}

fn pattern_shader<'a>(
    p: &'a ImagePattern,
    ctm: &Transform2D,
    size: (u32, u32),
    anti_alias: bool,
) -> Option<(Shader<'a>, Option<Mask>)> {
    // The placement matrix maps user space to image pixels; the shader wants the
    // opposite direction.
    let Some(image_to_user) = p.matrix().inverse() else {
        log::debug!("skipping image pattern with a singular matrix");
        return None;
    };
    let image_to_device = ctm.then(&image_to_user);
    let spread = match p.extend() {
        PatternExtend::None | PatternExtend::Pad => SpreadMode::Pad,
        PatternExtend::Repeat => SpreadMode::Repeat,
        PatternExtend::Reflect => SpreadMode::Reflect,
    };
    let shader = tiny_skia::Pattern::new(
        p.image().as_ref(),
        spread,
        filter_quality(p.filter(), &image_to_device),
        1.0,
        transform(&image_to_user),
    );

    let mask = match p.extend() {
        PatternExtend::None => {
            let mut mask = Mask::new(size.0, size.1)?;
            let bounds = tiny_skia::Rect::from_xywh(
                0.0,
                0.0,
                p.image().width() as f32,
                p.image().height() as f32,
            )?;
            mask.fill_path(
                &tiny_skia::PathBuilder::from_rect(bounds),
                tiny_skia::FillRule::Winding,
                anti_alias,
                transform(&image_to_device),
            );
            Some(mask)
        }
        _ => None,
    };
    Some((shader, mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_coefficients() {
        let m = Transform2D::rotation(0.3).then(&Transform2D::translation(4.0, -2.0));
        let ts = transform(&m);
        let mut pts = [Point::from_xy(1.0, 2.0)];
        ts.map_points(&mut pts);
        let expected = m.apply_point([1.0, 2.0]);
        assert!((pts[0].x as f64 - expected[0]).abs() < 1e-5);
        assert!((pts[0].y as f64 - expected[1]).abs() < 1e-5);
    }

    #[test]
    fn test_lone_move_has_no_path() {
        let mut p = Path::new();
        p.cmds.push(PathCmd::MoveTo([1.0, 1.0]));
        assert!(path(&p).is_none());
        assert!(path(&Path::new()).is_none());
    }

    #[test]
    fn test_filter_quality() {
        let flip = Transform2D::translation(0.0, 10.0).then(&Transform2D::scaling(1.0, -1.0));
        assert_eq!(filter_quality(PatternFilter::Best, &flip), FilterQuality::Nearest);
        let zoom = Transform2D::scaling(2.0, 2.0);
        assert_eq!(filter_quality(PatternFilter::Best, &zoom), FilterQuality::Bicubic);
        assert_eq!(filter_quality(PatternFilter::Good, &zoom), FilterQuality::Bilinear);
        assert_eq!(filter_quality(PatternFilter::Fast, &zoom), FilterQuality::Nearest);
    }

    fn sample(g: ColorGradient, x: u32, y: u32) -> [u8; 4] {
        let mut pixmap = tiny_skia::Pixmap::new(100, 100).unwrap();
        let source = Source::Gradient(g);
        let (paint, _) = paint(&source, &Transform2D::identity(), (100, 100), false).unwrap();
        let rect = tiny_skia::Rect::from_xywh(0.0, 0.0, 100.0, 100.0).unwrap();
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_concentric_radial_honors_start_radius() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let g = ColorGradient::radial([50.0, 50.0], 40.0, [50.0, 50.0], 50.0, [(0.0, red), (1.0, blue)]);
        // inside the start circle the first stop color is padded
        assert_eq!(sample(g.clone(), 70, 50), [255, 0, 0, 255]);
        // halfway between the circles
        let [r, _, b, _] = sample(g, 95, 50);
        assert!(r.abs_diff(128) < 25 && b.abs_diff(128) < 25);
    }

    #[test]
    fn test_shrinking_radial_runs_inward() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let g = ColorGradient::radial([50.0, 50.0], 50.0, [50.0, 50.0], 10.0, [(0.0, red), (1.0, blue)]);
        assert_eq!(sample(g.clone(), 52, 50), [0, 0, 255, 255]);
        let [r, _, b, _] = sample(g, 99, 50);
        assert!(r > 230 && b < 25);
    }

    #[test]
    fn test_equal_concentric_circles_paint_nothing() {
        let g = ColorGradient::radial([5.0, 5.0], 3.0, [5.0, 5.0], 3.0, [(0.0, Color::BLACK)]);
        let source = Source::Gradient(g);
        assert!(paint(&source, &Transform2D::identity(), (4, 4), true).is_none());
    }

    #[test]
    fn test_gradient_without_stops_paints_nothing() {
        let g = ColorGradient::linear([0.0, 0.0], [1.0, 1.0], Vec::<(f64, Color)>::new());
        let source = Source::Gradient(g);
        assert!(paint(&source, &Transform2D::identity(), (4, 4), true).is_none());
    }
}
