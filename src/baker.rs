//! Per-texel baking.
//!
//! For one output texel the baker finds the low-poly triangle under the
//! texel's UV center, casts a ray from that surface point in both normal
//! directions, and transfers the attributes of the chosen high-poly hit.

use glam::{Vec2, Vec3A};
use image::Rgba;
use smallvec::SmallVec;

use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::material::Material;
use crate::mesh::{Mesh, Triangle};
use crate::ray::Ray;
use crate::texture::Color;

/// Diffuse samples with alpha at or below this value are treated as holes.
pub const ALPHA_CUTOFF: u8 = 20;

/// Depth recorded for texels that received no color.
pub const UNBAKED: f32 = -1.0;

/// Sampled by triangles that carry no material.
static NO_MATERIAL: Material = Material {
    diffuse: None,
    normal: None,
    id: None,
};

/// Everything written for one baked texel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakedTexel {
    /// Diffuse color of the hit.
    pub diffuse: Color,
    /// ID color with blue scaled by the vertex alpha attribute.
    pub id: Color,
    /// Object-space normal remapped from [-1, 1] to [0, 255].
    pub object_normal: Color,
    /// Normal map sample at the hit.
    pub normal: Color,
    /// Signed hit distance; negative for hits found by the back ray.
    pub depth: f32,
}

/// A high-poly triangle hit by one of the texel's rays.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Triangle that was hit.
    pub triangle: &'a Triangle,
    /// Hit with the back-ray sign convention already applied.
    pub hit: HitRecord,
}

/// Mutable output slices covering one texture row.
pub(crate) struct RowTarget<'r> {
    pub depth: &'r mut [f32],
    pub diffuse: &'r mut [u8],
    pub id: &'r mut [u8],
    pub object_normal: &'r mut [u8],
    pub normal: &'r mut [u8],
}

/// Bakes texels of a square output texture.
#[derive(Debug, Clone, Copy)]
pub struct TexelBaker<'a> {
    lowpoly: &'a Mesh,
    highpoly: &'a Mesh,
    size: u32,
}

impl<'a> TexelBaker<'a> {
    /// Create a baker for an output texture of `size`×`size` texels.
    pub fn new(lowpoly: &'a Mesh, highpoly: &'a Mesh, size: u32) -> Self {
        Self {
            lowpoly,
            highpoly,
            size,
        }
    }

    /// Texture coordinate of the texel's center.
    pub fn texel_uv(&self, x: u32, y: u32) -> Vec2 {
        let size = self.size as f32;
        Vec2::new((x as f32 + 0.5) / size, (y as f32 + 0.5) / size)
    }

    /// Bake a single texel.
    ///
    /// Returns `None` when the texel is outside every low-poly UV triangle,
    /// when neither ray meets the high-poly mesh, or when every hit is
    /// transparent.
    pub fn process_pixel(&self, x: u32, y: u32) -> Option<BakedTexel> {
        let uv = self.texel_uv(x, y);
        let (source, bar) = self.lowpoly.locate_uv(uv)?;

        let origin = source.position_at(bar);
        let normal = source.geometric_normal()?;

        self.candidates(origin, normal).iter().find_map(transfer)
    }

    /// High-poly hits of the ray pair cast from `origin`, farthest first.
    ///
    /// Each triangle contributes its front-ray hit before its back-ray hit.
    /// Back-ray distances are negated, so they sort after every front hit.
    /// Ties keep discovery order.
    pub fn candidates(&self, origin: Vec3A, normal: Vec3A) -> SmallVec<[Candidate<'a>; 8]> {
        let (front, back) = Ray::pair(origin, normal);
        let mut hits: SmallVec<[Candidate<'a>; 8]> = SmallVec::new();

        let highpoly: &'a Mesh = self.highpoly;
        for triangle in &highpoly.triangles {
            if let Some(hit) = triangle.hit(&front, Interval::POSITIVE) {
                hits.push(Candidate { triangle, hit });
            }
            if let Some(hit) = triangle.hit(&back, Interval::POSITIVE) {
                hits.push(Candidate {
                    triangle,
                    hit: hit.into_back_hit(),
                });
            }
        }

        hits.sort_by(|a, b| b.hit.t.total_cmp(&a.hit.t));
        hits
    }

    /// Bake every texel of row `y` into the row's output slices.
    ///
    /// Returns the number of texels that received a color.
    pub(crate) fn bake_row(&self, y: u32, row: RowTarget<'_>) -> usize {
        let mut baked = 0;
        for x in 0..self.size {
            let i = x as usize;
            let Some(texel) = self.process_pixel(x, y) else {
                row.depth[i] = UNBAKED;
                continue;
            };

            let px = 4 * i..4 * i + 4;
            row.diffuse[px.clone()].copy_from_slice(&texel.diffuse.0);
            row.id[px.clone()].copy_from_slice(&texel.id.0);
            row.object_normal[px.clone()].copy_from_slice(&texel.object_normal.0);
            row.normal[px].copy_from_slice(&texel.normal.0);
            row.depth[i] = texel.depth;
            baked += 1;
        }
        baked
    }
}

/// Attribute transfer from one candidate, `None` when its diffuse is a hole.
fn transfer(candidate: &Candidate<'_>) -> Option<BakedTexel> {
    let Candidate { triangle, hit } = *candidate;
    let material = triangle.material.as_deref().unwrap_or(&NO_MATERIAL);
    let bar = hit.barycentric;
    let uv = triangle.uv_at(bar);

    let diffuse = material.sample_diffuse(uv.x, uv.y);
    if diffuse[3] <= ALPHA_CUTOFF {
        return None;
    }

    let mut id = material.sample_id(uv.x, uv.y);
    let blue = f32::from(id[2]) / 255.0 * triangle.alpha_at(bar);
    id[2] = (255.0 * blue) as u8;

    let object_normal = encode_normal(triangle.normal_at(bar).normalize_or_zero());

    Some(BakedTexel {
        diffuse,
        id,
        object_normal,
        normal: material.sample_normal(uv.x, uv.y),
        depth: hit.t,
    })
}

/// Remap a unit vector from [-1, 1] to an opaque RGBA8 color.
fn encode_normal(n: Vec3A) -> Color {
    let c = (n + Vec3A::ONE) / 2.0 * 255.0;
    Rgba([c.x as u8, c.y as u8, c.z as u8, 255])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mesh::Vertex;
    use crate::texture::Texture;

    /// Low-poly quad covering the whole UV square in the z = 0 plane, normal +Z.
    fn covering_lowpoly() -> Mesh {
        let v = |x: f32, y: f32| Vertex::new(Vec3A::new(x, y, 0.0), Vec2::new(x, y));
        Mesh::from_triangles(vec![
            Triangle::new(v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0)),
            Triangle::new(v(0.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)),
        ])
    }

    /// Large high-poly triangle at height `z` with a solid diffuse color.
    fn sheet(z: f32, color: Color) -> Triangle {
        let v = |x: f32, y: f32| {
            Vertex::new(Vec3A::new(x, y, z), Vec2::new(0.5, 0.5)).with_normal(Vec3A::Z)
        };
        Triangle::new(v(-10.0, -10.0), v(30.0, -10.0), v(-10.0, 30.0))
            .with_material(Arc::new(Material::with_diffuse(Texture::filled(2, 2, color))))
    }

    const RED: Color = Rgba([255, 0, 0, 255]);
    const GREEN: Color = Rgba([0, 255, 0, 255]);
    const HOLE: Color = Rgba([0, 0, 255, 20]);

    #[test]
    fn texel_centers() {
        let low = Mesh::new();
        let baker = TexelBaker::new(&low, &low, 4);
        assert_eq!(baker.texel_uv(0, 0), Vec2::new(0.125, 0.125));
        assert_eq!(baker.texel_uv(3, 1), Vec2::new(0.875, 0.375));
    }

    #[test]
    fn outside_uv_layout_is_unbaked() {
        let v = |x: f32, y: f32| Vertex::new(Vec3A::new(x, y, 0.0), Vec2::new(x, y));
        let low = Mesh::from_triangles(vec![Triangle::new(v(0.0, 0.0), v(0.5, 0.0), v(0.0, 0.5))]);
        let high = Mesh::from_triangles(vec![sheet(1.0, RED)]);
        let baker = TexelBaker::new(&low, &high, 4);

        assert!(baker.process_pixel(0, 0).is_some());
        assert!(baker.process_pixel(3, 3).is_none());
    }

    #[test]
    fn no_hit_is_unbaked() {
        let low = covering_lowpoly();
        let empty = Mesh::new();
        let baker = TexelBaker::new(&low, &empty, 4);
        assert!(baker.process_pixel(1, 1).is_none());
    }

    #[test]
    fn farthest_front_hit_wins() {
        let low = covering_lowpoly();
        // Front rays travel towards -Z.
        let high = Mesh::from_triangles(vec![sheet(-1.0, RED), sheet(-3.0, GREEN)]);
        let baker = TexelBaker::new(&low, &high, 8);

        let texel = baker.process_pixel(2, 5).unwrap();
        assert_eq!(texel.diffuse, GREEN);
        assert!((texel.depth - 3.0).abs() < 1e-5);
    }

    #[test]
    fn transparent_hit_falls_through() {
        let low = covering_lowpoly();
        let high = Mesh::from_triangles(vec![sheet(-3.0, HOLE), sheet(-1.0, RED)]);
        let baker = TexelBaker::new(&low, &high, 8);

        let texel = baker.process_pixel(4, 4).unwrap();
        assert_eq!(texel.diffuse, RED);
        assert!((texel.depth - 1.0).abs() < 1e-5);

        let only_holes = Mesh::from_triangles(vec![sheet(-3.0, HOLE)]);
        let baker = TexelBaker::new(&low, &only_holes, 8);
        assert!(baker.process_pixel(4, 4).is_none());
    }

    #[test]
    fn back_hits_sort_after_front_hits() {
        let low = covering_lowpoly();
        let high = Mesh::from_triangles(vec![sheet(2.0, GREEN), sheet(-0.5, RED), sheet(0.5, GREEN)]);
        let baker = TexelBaker::new(&low, &high, 8);

        let hits = baker.candidates(Vec3A::new(0.5, 0.5, 0.0), Vec3A::Z);
        let depths: Vec<f32> = hits.iter().map(|c| c.hit.t).collect();
        assert_eq!(depths.len(), 3);
        assert!((depths[0] - 0.5).abs() < 1e-5);
        assert!((depths[1] + 0.5).abs() < 1e-5);
        assert!((depths[2] + 2.0).abs() < 1e-5);

        // A back hit alone still bakes, with a negative depth.
        let high = Mesh::from_triangles(vec![sheet(2.0, GREEN)]);
        let baker = TexelBaker::new(&low, &high, 8);
        let texel = baker.process_pixel(1, 1).unwrap();
        assert_eq!(texel.diffuse, GREEN);
        assert!((texel.depth + 2.0).abs() < 1e-5);
    }

    #[test]
    fn attributes_are_transferred() {
        let low = covering_lowpoly();
        let id = Texture::filled(1, 1, Rgba([10, 20, 255, 255]));
        let material = Arc::new(Material {
            diffuse: None,
            normal: None,
            id: Some(Arc::new(id)),
        });
        let v = |x: f32, y: f32| {
            Vertex::new(Vec3A::new(x, y, -1.0), Vec2::ZERO)
                .with_normal(Vec3A::new(0.0, 0.0, 2.0))
                .with_alpha(0.5)
        };
        let high = Mesh::from_triangles(vec![
            Triangle::new(v(-10.0, -10.0), v(30.0, -10.0), v(-10.0, 30.0)).with_material(material),
        ]);
        let baker = TexelBaker::new(&low, &high, 2);

        let texel = baker.process_pixel(0, 0).unwrap();
        assert_eq!(texel.diffuse, crate::material::DEFAULT_DIFFUSE);
        assert_eq!(texel.normal, crate::material::DEFAULT_NORMAL);
        assert_eq!(texel.id, Rgba([10, 20, 127, 255]));
        let [x, y, z, a] = texel.object_normal.0;
        assert_eq!((x, y, a), (127, 127, 255));
        assert!(z >= 254);
    }

    #[test]
    fn bake_row_writes_only_baked_texels() {
        let v = |x: f32, y: f32| Vertex::new(Vec3A::new(x, y, 0.0), Vec2::new(x, y));
        // Covers only the left half of the UV square.
        let low = Mesh::from_triangles(vec![
            Triangle::new(v(0.0, 0.0), v(0.5, 0.0), v(0.5, 1.0)),
            Triangle::new(v(0.0, 0.0), v(0.5, 1.0), v(0.0, 1.0)),
        ]);
        let high = Mesh::from_triangles(vec![sheet(-1.0, RED)]);
        let baker = TexelBaker::new(&low, &high, 4);

        let mut depth = [0.0; 4];
        let mut diffuse = [0u8; 16];
        let (mut id, mut object_normal, mut normal) = ([0u8; 16], [0u8; 16], [0u8; 16]);
        let baked = baker.bake_row(
            1,
            RowTarget {
                depth: &mut depth,
                diffuse: &mut diffuse,
                id: &mut id,
                object_normal: &mut object_normal,
                normal: &mut normal,
            },
        );

        assert_eq!(baked, 2);
        assert_eq!(&diffuse[..8], &[255, 0, 0, 255, 255, 0, 0, 255]);
        assert_eq!(&diffuse[8..], &[0; 8]);
        assert!((depth[0] - 1.0).abs() < 1e-5);
        assert_eq!(&depth[2..], &[UNBAKED, UNBAKED]);
    }
}
