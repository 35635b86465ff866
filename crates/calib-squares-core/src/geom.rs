//! Planar geometry used by the square graph: segments, side directions
//! and angle helpers. Everything is `f64` in image pixel coordinates.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Four ordered corners of a detected square. Side `i` runs from corner `i`
/// to corner `(i + 1) % 4`.
pub type Quad = [Point2<f64>; 4];

/// Line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
}

impl LineSegment {
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self { a, b }
    }

    /// Side `side` of `quad`, from corner `side` to the next corner.
    pub fn side_of(quad: &Quad, side: usize) -> Self {
        Self::new(quad[side % 4], quad[(side + 1) % 4])
    }

    pub fn direction(&self) -> Vector2<f64> {
        self.b - self.a
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }
}

#[inline]
fn cross(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Intersection point of two segments, endpoints included.
///
/// Returns `None` for parallel (or degenerate) segments and when the
/// crossing of the supporting lines falls outside either segment.
pub fn segment_intersection(s0: &LineSegment, s1: &LineSegment) -> Option<Point2<f64>> {
    let d0 = s0.direction();
    let d1 = s1.direction();
    let denom = cross(&d0, &d1);
    if denom.abs() <= f64::EPSILON * d0.norm() * d1.norm() {
        return None;
    }

    let w = s1.a - s0.a;
    let t = cross(&w, &d1) / denom;
    let u = cross(&w, &d0) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(s0.a + d0 * t)
}

/// Direction vector of side `side` of `quad`.
pub fn side_direction(quad: &Quad, side: usize) -> Vector2<f64> {
    quad[(side + 1) % 4] - quad[side % 4]
}

/// Angle between two undirected directions, in `[0, π/2]`.
///
/// The unsigned angle between the vectors (in `[0, π]`) is folded with its
/// supplement. A zero-length input yields `π/2`.
pub fn acute_angle(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    let norms = u.norm() * v.norm();
    if norms <= f64::MIN_POSITIVE {
        return FRAC_PI_2;
    }
    let angle = (u.dot(v) / norms).clamp(-1.0, 1.0).acos();
    angle.min(PI - angle)
}

/// Circular index arithmetic: `(index + offset) mod len`, for negative
/// offsets too.
#[inline]
pub fn add_offset(index: usize, offset: isize, len: usize) -> usize {
    (index as isize + offset).rem_euclid(len as isize) as usize
}
