//! Affine view transformations
//!
//! A [`Transformation`] maps world (tile) coordinates to viewport pixels:
//! `[x', y'] = [a b; c d] · [x, y] + [tx, ty]`. Views are only ever built by
//! composing translations, rotations and non-zero uniform scales, so every
//! transformation in circulation is invertible and free of shear.

use crate::core::geo::Point;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transformation {
    pub const IDENTITY: Transformation = Transformation {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub fn translate(offset: Point) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, offset.x, offset.y)
    }

    pub fn scale(factor: f64) -> Self {
        Self::scale_rotate(factor, 0.0)
    }

    pub fn rotate(angle: f64) -> Self {
        Self::scale_rotate(1.0, angle)
    }

    /// Uniform scale combined with a rotation by `angle` radians.
    ///
    /// Positive angles turn +x towards +y, which is clockwise on screen.
    pub fn scale_rotate(scale: f64, angle: f64) -> Self {
        let (sin, cos) = if angle == 0.0 {
            (0.0, 1.0)
        } else {
            angle.sin_cos()
        };
        Self::new(scale * cos, -scale * sin, scale * sin, scale * cos, 0.0, 0.0)
    }

    /// Right-to-left product: the last transformation is applied first.
    pub fn compose<I>(transformations: I) -> Self
    where
        I: IntoIterator<Item = Transformation>,
        I::IntoIter: DoubleEndedIterator,
    {
        transformations
            .into_iter()
            .rev()
            .fold(Self::IDENTITY, |inner, outer| outer * inner)
    }

    /// Closed-form inverse. The determinant must be non-zero.
    pub fn inverse(&self) -> Self {
        let det = self.determinant();
        Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (-self.d * self.tx + self.b * self.ty) / det,
            ty: (self.c * self.tx - self.a * self.ty) / det,
        }
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            self.a * point.x + self.b * point.y + self.tx,
            self.c * point.x + self.d * point.y + self.ty,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Uniform scale recovered as `√determinant`
    pub fn scale_factor(&self) -> f64 {
        self.determinant().sqrt()
    }

    /// Rotation angle in the convention of [`Transformation::scale_rotate`]
    pub fn rotation(&self) -> f64 {
        self.c.atan2(self.a)
    }

    /// Components in canvas/CSS order `[a, b, c, d, e, f]` for the matrix
    /// `[a c e; b d f]`, i.e. with the off-diagonal slots swapped.
    pub fn to_device_matrix(&self) -> [f64; 6] {
        [self.a, self.c, self.b, self.d, self.tx, self.ty]
    }

    /// Component-wise comparison within `epsilon`
    pub fn approx_eq(&self, other: &Transformation, epsilon: f64) -> bool {
        [
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
            self.tx - other.tx,
            self.ty - other.ty,
        ]
        .iter()
        .all(|delta| delta.abs() <= epsilon)
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transformation {
    type Output = Transformation;

    /// `self * rhs` applies `rhs` first, then `self`.
    fn mul(self, m: Transformation) -> Transformation {
        Transformation {
            a: self.a * m.a + self.b * m.c,
            b: self.a * m.b + self.b * m.d,
            c: self.c * m.a + self.d * m.c,
            d: self.c * m.b + self.d * m.d,
            tx: self.a * m.tx + self.b * m.ty + self.tx,
            ty: self.c * m.tx + self.d * m.ty + self.ty,
        }
    }
}
