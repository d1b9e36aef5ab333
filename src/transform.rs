//! Visual transform value types.
//!
//! [`Transform2D`] is a plain 2D affine matrix. [`Transformation`] pairs a
//! matrix with an opacity scalar and is the value an animation produces for a
//! frame: leaves write into it, and an animation set folds the values of all
//! of its children into one via [`Transformation::compose`]. Composition is
//! non-commutative, so the order of the fold is observable.

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

/// A 2D affine transform.
///
/// Stored as the six varying entries of a 3x3 matrix (bottom row implicit):
///
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
    pub fn identity() -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 }
    }

    /// A translation by `(tx, ty)`.
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self { tx, ty, ..Self::identity() }
    }

    /// A non-uniform scale about the origin.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self { a: sx, d: sy, ..Self::identity() }
    }

    /// A rotation about the origin, in radians.
    pub fn rotate(angle_rad: f64) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, tx: 0.0, ty: 0.0 }
    }

    /// Matrix product `self * other`.
    ///
    /// The result applies `other` first, then `self`.
    #[must_use]
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

    /// Transform a point.
    pub fn apply_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// Whether this is the identity transform, within `epsilon` per entry.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.a - 1.0).abs() < epsilon
            && self.b.abs() < epsilon
            && self.c.abs() < epsilon
            && (self.d - 1.0).abs() < epsilon
            && self.tx.abs() < epsilon
            && self.ty.abs() < epsilon
    }
}

/// The merged visual state an animation produces for one frame: an opacity
/// scalar in `[0, 1]` plus a geometric transform.
///
/// A pure value type with no identity beyond its contents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    /// Opacity, where `1.0` is fully opaque.
    pub alpha: f32,
    /// Geometric transform.
    pub matrix: Transform2D,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformation {
    /// The identity transformation: fully opaque, identity matrix.
    pub fn new() -> Self {
        Self { alpha: 1.0, matrix: Transform2D::identity() }
    }

    /// Reset to the identity transformation.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Fold `other` into this transformation.
    ///
    /// Opacities multiply; `other`'s matrix becomes the inner transform
    /// (applied before this one). Order-sensitive: `a.compose(b)` and
    /// `b.compose(a)` generally differ.
    pub fn compose(&mut self, other: &Transformation) {
        self.alpha *= other.alpha;
        self.matrix = self.matrix.then(&other.matrix);
    }
}

assert_impl_all!(Transformation: Send, Sync, Copy);
assert_impl_all!(Transform2D: Send, Sync, Copy);
