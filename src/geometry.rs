//! Planar triangle tests and barycentric helpers.
//!
//! The UV lookup works on 2D texture coordinates, while attribute transfer
//! reuses the same weights for positions, normals, texture coordinates and
//! scalar vertex attributes.

use std::ops::{Add, Mul};

use glam::{Vec2, Vec3A};

use crate::interval::Interval;

/// Doubled signed area of `abc` and the three doubled sub-areas opposite each
/// vertex for the point `p`, all relative to `a`.
///
/// Returned as `(d, wa, wb, wc)` with `wa + wb + wc == d` up to rounding.
fn signed_areas(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> (f32, f32, f32, f32) {
    let b = b - a;
    let c = c - a;
    let p = p - a;

    let d = b.perp_dot(c);
    let wa = p.x * (b.y - c.y) + p.y * (c.x - b.x) + d;
    let wb = p.perp_dot(c);
    let wc = b.perp_dot(p);
    (d, wa, wb, wc)
}

/// Check whether `p` lies inside the triangle `abc` or on one of its edges.
///
/// Either winding is accepted. Degenerate triangles contain no points.
pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let (d, wa, wb, wc) = signed_areas(p, a, b, c);
    if d == 0.0 || !d.is_finite() {
        return false;
    }

    let range = if d > 0.0 {
        Interval::new(0.0, d)
    } else {
        Interval::new(d, 0.0)
    };
    range.contains(wa) && range.contains(wb) && range.contains(wc)
}

/// Barycentric weights of `p` with respect to the triangle `abc`.
///
/// Weights are ordered `(a, b, c)` and sum to one. Returns `None` for
/// degenerate triangles.
pub fn barycentric(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> Option<Vec3A> {
    let (d, wa, wb, wc) = signed_areas(p, a, b, c);
    if d == 0.0 || !d.is_finite() {
        return None;
    }
    Some(Vec3A::new(wa, wb, wc) / d)
}

/// Weighted sum of three vertex attributes.
///
/// Works for anything that scales by `f32` and adds: positions, normals,
/// texture coordinates and scalar attributes.
pub fn interpolate<T>(a: T, b: T, c: T, bar: Vec3A) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    a * bar.x + b * bar.y + c * bar.z
}
