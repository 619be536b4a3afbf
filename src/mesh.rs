//! Triangle meshes for the low-poly target and the high-poly source.
//!
//! Triangles own their vertices by value. The low-poly mesh only needs
//! positions and texture coordinates; the high-poly mesh also carries normals,
//! the per-vertex alpha attribute and a material.

use std::sync::Arc;

use glam::{Vec2, Vec3A};

use crate::geometry::{barycentric, interpolate, point_in_triangle};
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::material::Material;
use crate::ray::Ray;

/// Determinant threshold below which a ray counts as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-12;

/// Mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Object-space position.
    pub position: Vec3A,
    /// Texture coordinate.
    pub uv: Vec2,
    /// Shading normal, not necessarily unit length.
    pub normal: Vec3A,
    /// Per-vertex visibility weight applied to the ID map's blue channel.
    pub alpha: f32,
}

impl Vertex {
    /// Vertex with a position and texture coordinate, zero normal and alpha 1.
    pub fn new(position: Vec3A, uv: Vec2) -> Self {
        Self {
            position,
            uv,
            normal: Vec3A::ZERO,
            alpha: 1.0,
        }
    }

    /// Replace the shading normal.
    pub fn with_normal(mut self, normal: Vec3A) -> Self {
        self.normal = normal;
        self
    }

    /// Replace the alpha attribute.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Triangle with an optional material.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// First vertex
    pub v0: Vertex,
    /// Second vertex
    pub v1: Vertex,
    /// Third vertex
    pub v2: Vertex,
    /// Material used when this triangle is hit. Low-poly triangles have none.
    pub material: Option<Arc<Material>>,
}

impl Triangle {
    /// Create a triangle without material.
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            v0,
            v1,
            v2,
            material: None,
        }
    }

    /// Attach a material.
    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// Check whether the texture coordinate lies on this triangle's UV footprint.
    pub fn contains_uv(&self, uv: Vec2) -> bool {
        point_in_triangle(uv, self.v0.uv, self.v1.uv, self.v2.uv)
    }

    /// Barycentric weights of a texture coordinate, `None` for degenerate UVs.
    pub fn uv_barycentric(&self, uv: Vec2) -> Option<Vec3A> {
        barycentric(uv, self.v0.uv, self.v1.uv, self.v2.uv)
    }

    /// Unit normal of the triangle's plane, following `v0 -> v1 -> v2` winding.
    ///
    /// Returns `None` for triangles with zero area.
    pub fn geometric_normal(&self) -> Option<Vec3A> {
        let e1 = self.v1.position - self.v0.position;
        let e2 = self.v2.position - self.v0.position;
        e1.cross(e2).try_normalize()
    }

    /// Interpolated position.
    pub fn position_at(&self, bar: Vec3A) -> Vec3A {
        interpolate(self.v0.position, self.v1.position, self.v2.position, bar)
    }

    /// Interpolated texture coordinate.
    pub fn uv_at(&self, bar: Vec3A) -> Vec2 {
        interpolate(self.v0.uv, self.v1.uv, self.v2.uv, bar)
    }

    /// Interpolated shading normal, not renormalized.
    pub fn normal_at(&self, bar: Vec3A) -> Vec3A {
        interpolate(self.v0.normal, self.v1.normal, self.v2.normal, bar)
    }

    /// Interpolated alpha attribute.
    pub fn alpha_at(&self, bar: Vec3A) -> f32 {
        interpolate(self.v0.alpha, self.v1.alpha, self.v2.alpha, bar)
    }
}

impl Hittable for Triangle {
    /// Möller–Trumbore intersection without back-face culling.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let e1 = self.v1.position - self.v0.position;
        let e2 = self.v2.position - self.v0.position;

        let p = r.direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() < PARALLEL_EPSILON || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = r.origin - self.v0.position;
        let u = s.dot(p) * inv_det;
        if !Interval::UNIT.contains(u) {
            return None;
        }

        let q = s.cross(e1);
        let v = r.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(q) * inv_det;
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(HitRecord {
            t,
            barycentric: Vec3A::new(1.0 - u - v, u, v),
        })
    }
}

/// Ordered list of triangles.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Triangles in file order; order decides overlapping UV lookups.
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from an ordered triangle list.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Append a triangle.
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True when the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// First triangle, in mesh order, whose UV footprint contains `uv`,
    /// together with the barycentric weights of `uv` in it.
    pub fn locate_uv(&self, uv: Vec2) -> Option<(&Triangle, Vec3A)> {
        let triangle = self.triangles.iter().find(|t| t.contains_uv(uv))?;
        let bar = triangle.uv_barycentric(uv)?;
        Some((triangle, bar))
    }
}
