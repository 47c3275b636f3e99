//! 2D geometry primitives shared by the flattener, filler, stroker and style
//! sampler: points/vectors (re-exported from `kurbo`), a tiny 2x2 matrix for
//! arc-ellipse reduction, and the numeric helpers the rendering core needs.

pub use kurbo::{Point, Vec2};

/// Pixel-delta dedup threshold used by the flattener (spec: 0.25 in either axis).
pub const DEDUP_EPSILON: f64 = 0.25;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (a - b).hypot()
}

/// Dot product of two vectors.
pub fn dot(a: Vec2, b: Vec2) -> f64 {
    a.x * b.x + a.y * b.y
}

/// 2D cross product (z component of the 3D cross product).
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Scalar length of the projection of `v` onto `onto`.
pub fn project_scalar(v: Vec2, onto: Vec2) -> f64 {
    let len = onto.hypot();
    if len == 0.0 {
        0.0
    } else {
        dot(v, onto) / len
    }
}

/// Two points are the same pixel for dedup purposes if they differ by at
/// most `DEDUP_EPSILON` in both axes.
pub fn approx_eq_pixel(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= DEDUP_EPSILON && (a.y - b.y).abs() <= DEDUP_EPSILON
}

/// Clamp a float to the `[lo, hi]` range before truncating to an integer
/// pixel coordinate. Used at framebuffer boundary clipping.
pub fn clamp_to_i64(v: f64, lo: i64, hi: i64) -> i64 {
    if v.is_nan() {
        return lo;
    }
    let v = v.floor() as i64;
    v.clamp(lo, hi)
}

/// A 2x2 linear transform (no translation), used to reduce elliptical arcs
/// to circular ones. Row-major: `(x, y) -> (a*x + b*y, c*x + d*y)`.
#[derive(Debug, Clone, Copy)]
pub struct Mat2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Mat2 {
    /// Rotation matrix for `theta` radians.
    pub fn rotation(theta: f64) -> Mat2 {
        let (s, c) = theta.sin_cos();
        Mat2 {
            a: c,
            b: -s,
            c: s,
            d: c,
        }
    }

    /// Uniform scale on the y axis only: `diag(1, ratio)`.
    pub fn scale_y(ratio: f64) -> Mat2 {
        Mat2 {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: ratio,
        }
    }

    pub fn mul(self, rhs: Mat2) -> Mat2 {
        Mat2 {
            a: self.a * rhs.a + self.b * rhs.c,
            b: self.a * rhs.b + self.b * rhs.d,
            c: self.c * rhs.a + self.d * rhs.c,
            d: self.c * rhs.b + self.d * rhs.d,
        }
    }

    pub fn scaled(self, k: f64) -> Mat2 {
        Mat2 {
            a: self.a * k,
            b: self.b * k,
            c: self.c * k,
            d: self.d * k,
        }
    }

    pub fn apply(self, p: Point) -> Point {
        Point::new(self.a * p.x + self.b * p.y, self.c * p.x + self.d * p.y)
    }

    pub fn inverse(self) -> Mat2 {
        let det = self.a * self.d - self.b * self.c;
        let inv_det = if det == 0.0 { 0.0 } else { 1.0 / det };
        Mat2 {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
        }
    }
}
