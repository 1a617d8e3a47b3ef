//! Small polar-coordinate helpers used to lay out shapes.

use std::f64::consts::{PI, TAU};

use crate::error::{Error, Result};
use crate::Point;

/// Point at distance `r` from the origin in direction `theta`.
pub fn polar_to_cartesian(r: f64, theta: f64) -> Point {
    [r * theta.cos(), r * theta.sin()]
}

/// One sample of a regular polygon outline, see [`polar_polygon`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarSample {
    pub radius: f64,
    pub angle: f64,
    /// Cumulative radial variation up to this sample, normalized to `[0, 1]`.
    pub progress: f64,
}

/// Sample the outline of a regular `nfaces`-gon (circumradius `radius`, first vertex at
/// angle 0) at `npoints - 1` evenly spaced angles over one turn.
pub fn polar_polygon(nfaces: usize, radius: f64, npoints: usize) -> Result<Vec<PolarSample>> {
    if nfaces < 3 {
        return Err(Error::invalid(format!(
            "a polygon needs at least 3 faces, got {nfaces}"
        )));
    }
    if npoints < 2 {
        return Err(Error::invalid(format!(
            "polar_polygon needs at least 2 points, got {npoints}"
        )));
    }
    let n = nfaces as f64;
    let sector = TAU / n;
    let step = TAU / (npoints - 1) as f64;
    let angles: Vec<f64> = (0..npoints - 1).map(|i| i as f64 * step).collect();
    let radii: Vec<f64> = angles
        .iter()
        .map(|theta| (PI / n).cos() / ((theta % sector) - PI / n).cos())
        .collect();

    let mut progress = Vec::with_capacity(radii.len());
    let mut total = 0.0;
    progress.push(0.0);
    for pair in radii.windows(2) {
        total += (pair[1] - pair[0]).abs();
        progress.push(total);
    }
    // A single sample or a perfectly flat outline has no variation to normalize.
    if total > 0.0 {
        progress.iter_mut().for_each(|d| *d /= total);
    }

    Ok(radii
        .into_iter()
        .zip(angles)
        .zip(progress)
        .map(|((r, angle), progress)| PolarSample {
            radius: radius * r,
            angle,
            progress,
        })
        .collect())
}

/// Vertices of a regular polygon, the first at angle 0.
pub fn regular_polygon_points(radius: f64, n: usize) -> Vec<Point> {
    (0..n)
        .map(|k| polar_to_cartesian(radius, TAU * k as f64 / n as f64))
        .collect()
}

/// The `2 * branches` vertices of a star, alternating `radius` and `radius * ratio`.
pub fn star_points(branches: usize, radius: f64, ratio: f64) -> Vec<Point> {
    (0..2 * branches)
        .map(|k| {
            let r = if k % 2 == 0 { radius } else { radius * ratio };
            polar_to_cartesian(r, PI * k as f64 / branches as f64)
        })
        .collect()
}
