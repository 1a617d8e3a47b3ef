//! Path geometry shared by every backend.
//!
//! Paths are recorded in user space; backends apply the context transform when they
//! fill or stroke.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::transform::Transform2D;
use crate::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    pub cmds: Vec<PathCmd>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// A copy of this path with every point mapped through `transform`.
    pub fn transformed(&self, transform: &Transform2D) -> Path {
        let t = |p: &Point| transform.apply_point(*p);
        let cmds = self
            .cmds
            .iter()
            .map(|cmd| match cmd {
                PathCmd::MoveTo(p) => PathCmd::MoveTo(t(p)),
                PathCmd::LineTo(p) => PathCmd::LineTo(t(p)),
                PathCmd::QuadTo(c, p) => PathCmd::QuadTo(t(c), t(p)),
                PathCmd::CubicTo(c1, c2, p) => PathCmd::CubicTo(t(c1), t(c2), t(p)),
                PathCmd::Close => PathCmd::Close,
            })
            .collect();
        Path { cmds }
    }

    /// End points of every segment, in order (control points excluded).
    pub fn vertices(&self) -> Vec<Point> {
        self.cmds
            .iter()
            .filter_map(|cmd| match *cmd {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) => Some(p),
                PathCmd::QuadTo(_, p) | PathCmd::CubicTo(_, _, p) => Some(p),
                PathCmd::Close => None,
            })
            .collect()
    }

    /// Tight bounding box `[min_x, min_y, max_x, max_y]` of the drawn outline,
    /// including curve extrema. `None` for an empty path.
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let mut bounds: Option<[f64; 4]> = None;
        let mut add = |p: Point| {
            let b = bounds.get_or_insert([p[0], p[1], p[0], p[1]]);
            b[0] = b[0].min(p[0]);
            b[1] = b[1].min(p[1]);
            b[2] = b[2].max(p[0]);
            b[3] = b[3].max(p[1]);
        };
        let mut last = [0.0, 0.0];
        for cmd in &self.cmds {
            match *cmd {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) => {
                    add(p);
                    last = p;
                }
                PathCmd::QuadTo(c, p) => {
                    for t in quad_extrema(last, c, p) {
                        add(eval_quad(last, c, p, t));
                    }
                    add(p);
                    last = p;
                }
                PathCmd::CubicTo(c1, c2, p) => {
                    for t in cubic_extrema(last, c1, c2, p) {
                        add(eval_cubic(last, c1, c2, p, t));
                    }
                    add(p);
                    last = p;
                }
                PathCmd::Close => {}
            }
        }
        bounds
    }
}

fn eval_quad(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let f = |i: usize| mt * mt * p0[i] + 2.0 * mt * t * p1[i] + t * t * p2[i];
    [f(0), f(1)]
}

fn eval_cubic(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let f = |i: usize| {
        mt * mt * mt * p0[i] + 3.0 * mt * mt * t * p1[i] + 3.0 * mt * t * t * p2[i]
            + t * t * t * p3[i]
    };
    [f(0), f(1)]
}

fn quad_extrema(p0: Point, p1: Point, p2: Point) -> Vec<f64> {
    (0..2)
        .filter_map(|i| {
            let denom = p0[i] - 2.0 * p1[i] + p2[i];
            if denom.abs() < 1e-12 {
                return None;
            }
            let t = (p0[i] - p1[i]) / denom;
            (t > 0.0 && t < 1.0).then_some(t)
        })
        .collect()
}

fn cubic_extrema(p0: Point, p1: Point, p2: Point, p3: Point) -> Vec<f64> {
    let mut ts = Vec::new();
    for i in 0..2 {
        // derivative / 3 = a t^2 + b t + c
        let a = -p0[i] + 3.0 * p1[i] - 3.0 * p2[i] + p3[i];
        let b = 2.0 * (p0[i] - 2.0 * p1[i] + p2[i]);
        let c = p1[i] - p0[i];
        if a.abs() < 1e-12 {
            if b.abs() > 1e-12 {
                ts.push(-c / b);
            }
            continue;
        }
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            continue;
        }
        let sq = disc.sqrt();
        ts.push((-b + sq) / (2.0 * a));
        ts.push((-b - sq) / (2.0 * a));
    }
    ts.retain(|t| *t > 0.0 && *t < 1.0);
    ts
}

/// Upper bound on the full turns a single [`PathBuilder::arc`] call emits.
pub const MAX_ARC_TURNS: usize = 16;

/// Incremental path construction with a tracked current point.
///
/// Mirrors the usual 2D context semantics: `line_to` and `curve_to` without a current
/// point start a new sub-path, and `close_path` returns to the sub-path start.
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    path: Path,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the accumulated path, leaving the builder empty.
    pub fn take(&mut self) -> Path {
        self.current = None;
        self.subpath_start = None;
        std::mem::take(&mut self.path)
    }

    pub fn clear(&mut self) {
        self.take();
    }

    pub fn move_to(&mut self, p: Point) {
        // Consecutive moves collapse into the last one.
        if let Some(PathCmd::MoveTo(last)) = self.path.cmds.last_mut() {
            *last = p;
        } else {
            self.path.cmds.push(PathCmd::MoveTo(p));
        }
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    pub fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.path.cmds.push(PathCmd::LineTo(p));
        self.current = Some(p);
    }

    pub fn quad_to(&mut self, c: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(c);
        }
        self.path.cmds.push(PathCmd::QuadTo(c, p));
        self.current = Some(p);
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(c1);
        }
        self.path.cmds.push(PathCmd::CubicTo(c1, c2, p));
        self.current = Some(p);
    }

    pub fn close_path(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.path.cmds.push(PathCmd::Close);
        self.current = self.subpath_start;
    }

    /// Closed axis-aligned rectangle with its corner at `(x, y)`.
    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to([x, y]);
        self.line_to([x + width, y]);
        self.line_to([x + width, y + height]);
        self.line_to([x, y + height]);
        self.close_path();
    }

    /// Circular arc around `center`, sweeping in the direction of increasing angle
    /// from `angle1` to `angle2`.
    ///
    /// If `angle2 < angle1` it is advanced by whole turns until it is not, and sweeps of
    /// more than [`MAX_ARC_TURNS`] full turns are cut down to that many. The arc is
    /// joined to the current point with a straight line, or starts a new sub-path if
    /// there is none. It is emitted as cubic segments of at most a quarter turn each.
    /// Non-finite angles add nothing.
    pub fn arc(&mut self, center: Point, radius: f64, angle1: f64, mut angle2: f64) {
        if !angle1.is_finite() || !angle2.is_finite() {
            return;
        }
        if angle2 < angle1 {
            angle2 = angle1 + (angle2 - angle1).rem_euclid(TAU);
        }
        let max_sweep = MAX_ARC_TURNS as f64 * TAU;
        if angle2 - angle1 > max_sweep {
            angle2 = angle1 + max_sweep + (angle2 - angle1).rem_euclid(TAU);
        }
        let point_at = |a: f64| [center[0] + radius * a.cos(), center[1] + radius * a.sin()];
        self.line_to(point_at(angle1));

        let sweep = angle2 - angle1;
        if sweep <= 0.0 || radius == 0.0 {
            return;
        }
        let segments = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / segments as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan() * radius;
        for i in 0..segments {
            let a0 = angle1 + step * i as f64;
            let a1 = a0 + step;
            let p0 = point_at(a0);
            let p3 = point_at(a1);
            let c1 = [p0[0] - k * a0.sin(), p0[1] + k * a0.cos()];
            let c2 = [p3[0] + k * a1.sin(), p3[1] - k * a1.cos()];
            self.curve_to(c1, c2, p3);
        }
    }

    /// Append every command of `path`.
    pub fn extend(&mut self, path: &Path) {
        for cmd in &path.cmds {
            match *cmd {
                PathCmd::MoveTo(p) => self.move_to(p),
                PathCmd::LineTo(p) => self.line_to(p),
                PathCmd::QuadTo(c, p) => self.quad_to(c, p),
                PathCmd::CubicTo(c1, c2, p) => self.curve_to(c1, c2, p),
                PathCmd::Close => self.close_path(),
            }
        }
    }
}
