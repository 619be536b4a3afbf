//! Ray representation for surface projection.
//!
//! A ray is defined as r(t) = origin + t * direction. Bake rays start on the
//! low-poly surface and run along its geometric normal, one per side.

use glam::Vec3A;

/// Ray in 3D space defined by origin and direction.
///
/// Mathematical representation: r(t) = origin + t * direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Starting point of the ray, a point on the low-poly surface.
    pub origin: Vec3A,

    /// Direction vector of the ray.
    ///
    /// Bake rays are built with unit directions so that hit parameters are
    /// world-space distances and comparable across rays.
    pub direction: Vec3A,
}

impl Ray {
    /// Create a new ray with origin and direction.
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self { origin, direction }
    }

    /// Create the pair of rays cast from `origin` along `normal`.
    ///
    /// Returns `(front, back)`: the front ray travels against the normal,
    /// the back ray along it. `normal` is expected to be unit length.
    pub fn pair(origin: Vec3A, normal: Vec3A) -> (Self, Self) {
        (Self::new(origin, -normal), Self::new(origin, normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_points_both_ways() {
        let (front, back) = Ray::pair(Vec3A::ZERO, Vec3A::Z);
        assert_eq!(front.direction, -Vec3A::Z);
        assert_eq!(back.direction, Vec3A::Z);
        assert_eq!(front.origin, back.origin);
    }
}
