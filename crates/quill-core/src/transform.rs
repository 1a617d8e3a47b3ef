//! 2D affine transforms and the copy-on-transform capability shared by drawable nodes.
//!
//! A [`Transform2D`] is a homogeneous 3x3 matrix whose bottom row is fixed to `[0, 0, 1]`.
//! Composition follows code order: `a.then(&b)` is the product `A·B`, so `b` is applied
//! first and `a` second.
//!
//! ```
//! use quill_core::Transform2D;
//!
//! let m = Transform2D::translation(10.0, 0.0).then(&Transform2D::scaling(2.0, 2.0));
//! assert_eq!(m.apply_point([1.0, 1.0]), [12.0, 2.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::Point;

/// A 2D affine transformation matrix.
///
/// Stored as the six free coefficients of:
/// ```text
/// | a  c  tx |
/// | b  d  ty |
/// | 0  0  1  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Create a translation transform.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    /// Create a (possibly non-uniform) scale transform.
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Create a rotation transform from radians.
    ///
    /// With the y axis pointing down, positive angles turn clockwise on screen.
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Compose this transform with another (`self · other`).
    ///
    /// The resulting transform applies `other` first, then `self`.
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// Conjugate this transform so that `pivot` is its fixed point:
    /// `T(pivot) · self · T(-pivot)`.
    pub fn around(&self, pivot: Point) -> Self {
        let [px, py] = pivot;
        Self::translation(px, py)
            .then(self)
            .then(&Self::translation(-px, -py))
    }

    /// Apply this transform to a point.
    pub fn apply_point(&self, p: Point) -> Point {
        let [x, y] = p;
        [
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        ]
    }

    /// Apply this transform to a vector (ignores translation).
    pub fn apply_vector(&self, v: Point) -> Point {
        let [x, y] = v;
        [self.a * x + self.c * y, self.b * x + self.d * y]
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Compute the inverse transform.
    ///
    /// Returns `None` if the transform is not invertible (determinant is zero).
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() <= f64::EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        Some(Self {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            tx: (self.c * self.ty - self.d * self.tx) * inv_det,
            ty: (self.b * self.tx - self.a * self.ty) * inv_det,
        })
    }

    /// Check if this is approximately an identity transform.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.approx_eq(&Self::IDENTITY, epsilon)
    }

    /// Coefficient-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.a - other.a).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.c - other.c).abs() < epsilon
            && (self.d - other.d).abs() < epsilon
            && (self.tx - other.tx).abs() < epsilon
            && (self.ty - other.ty).abs() < epsilon
    }

    /// Convert to a 3x3 matrix array (row-major).
    pub fn to_matrix3x3(&self) -> [[f64; 3]; 3] {
        [
            [self.a, self.c, self.tx],
            [self.b, self.d, self.ty],
            [0.0, 0.0, 1.0],
        ]
    }

    /// Build from a row-major 3x3 matrix. The bottom row must be `[0, 0, 1]`.
    pub fn from_matrix3x3(m: [[f64; 3]; 3]) -> Result<Self> {
        if m[2] != [0.0, 0.0, 1.0] {
            return Err(Error::invalid(format!(
                "affine matrix bottom row must be [0, 0, 1], got {:?}",
                m[2]
            )));
        }
        Ok(Self {
            a: m[0][0],
            c: m[0][1],
            tx: m[0][2],
            b: m[1][0],
            d: m[1][1],
            ty: m[1][2],
        })
    }

    /// Coefficients in `[a, b, c, d, tx, ty]` order, as expected by most backends.
    pub fn to_coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }
}

/// Values that carry an accumulated transform and can be re-transformed without mutation.
///
/// Every operation returns a new value whose matrix is `op · self.matrix()`: the new
/// operation is applied on top of everything the value already went through, and pivots
/// are expressed in that output frame.
pub trait Transformable: Sized {
    /// The accumulated transform.
    fn matrix(&self) -> Transform2D;

    /// A copy of `self` carrying `matrix` instead of its own.
    fn set_matrix(&self, matrix: Transform2D) -> Self;

    /// Apply `op` after the current transform.
    fn transform(&self, op: &Transform2D) -> Self {
        self.set_matrix(op.then(&self.matrix()))
    }

    /// Rotate by `angle` radians around the origin.
    fn rotate(&self, angle: f64) -> Self {
        self.transform(&Transform2D::rotation(angle))
    }

    /// Rotate by `angle` radians around `pivot`.
    fn rotate_around(&self, angle: f64, pivot: Point) -> Self {
        self.transform(&Transform2D::rotation(angle).around(pivot))
    }

    fn translate(&self, delta: Point) -> Self {
        self.transform(&Transform2D::translation(delta[0], delta[1]))
    }

    /// Uniform scale around the origin.
    fn scale(&self, factor: f64) -> Self {
        self.scale_xy(factor, factor)
    }

    fn scale_xy(&self, sx: f64, sy: f64) -> Self {
        self.transform(&Transform2D::scaling(sx, sy))
    }

    /// Scale with `pivot` as the fixed point.
    fn scale_around(&self, sx: f64, sy: f64, pivot: Point) -> Self {
        self.transform(&Transform2D::scaling(sx, sy).around(pivot))
    }
}
