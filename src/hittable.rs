//! Ray-object intersection system.
//!
//! Defines the Hittable trait for geometric primitives and HitRecord for
//! storing intersection data. Intersection never mutates the primitive: every
//! test produces a fresh record, so the same mesh can be queried from many
//! threads at once.

use glam::Vec3A;

use crate::interval::Interval;
use crate::ray::Ray;

/// Ray-object intersection information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Signed distance along the ray to the intersection point.
    ///
    /// Positive for rays cast on the front side. The baker negates it for
    /// back-side rays so both kinds share one ordering.
    pub t: f32,
    /// Barycentric coordinates of the hit point, ordered `(v0, v1, v2)`.
    pub barycentric: Vec3A,
}

impl HitRecord {
    /// Convert a front-side hit into the back-side convention by negating
    /// the distance.
    pub fn into_back_hit(self) -> Self {
        Self { t: -self.t, ..self }
    }
}

/// Trait for objects that can be intersected by rays.
///
/// Must be thread-safe (Sync + Send) for parallel baking.
pub trait Hittable: Sync + Send {
    /// Test for ray intersection with a parameter strictly inside `ray_t`.
    ///
    /// Returns the intersection record, or `None` on a miss.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_hit_flips_sign_only() {
        let hit = HitRecord {
            t: 2.5,
            barycentric: Vec3A::new(0.2, 0.3, 0.5),
        };
        let back = hit.into_back_hit();
        assert_eq!(back.t, -2.5);
        assert_eq!(back.barycentric, hit.barycentric);
    }
}
