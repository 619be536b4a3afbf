//! Material system for baking.
//!
//! A material bundles the three textures the baker transfers: diffuse color,
//! tangent-space normal map and ID/mask. Any of them may be missing, in which
//! case sampling returns a neutral fallback.

use std::sync::Arc;

use image::Rgba;

use crate::texture::{Color, Texture};

/// Diffuse fallback: opaque white.
pub const DEFAULT_DIFFUSE: Color = Rgba([255, 255, 255, 255]);

/// Normal map fallback: the unperturbed tangent-space normal (0, 0, 1).
pub const DEFAULT_NORMAL: Color = Rgba([128, 128, 255, 255]);

/// ID fallback: opaque white so the vertex attribute alone drives blue.
pub const DEFAULT_ID: Color = Rgba([255, 255, 255, 255]);

/// Textures attached to high-poly triangles.
///
/// Textures are reference counted so materials can be shared between many
/// triangles and read from every worker thread.
#[derive(Debug, Clone, Default)]
pub struct Material {
    /// Base color with straight alpha.
    pub diffuse: Option<Arc<Texture>>,
    /// Tangent-space normal map.
    pub normal: Option<Arc<Texture>>,
    /// ID/mask map.
    pub id: Option<Arc<Texture>>,
}

impl Material {
    /// Material with only a diffuse texture.
    pub fn with_diffuse(diffuse: Texture) -> Self {
        Self {
            diffuse: Some(Arc::new(diffuse)),
            ..Self::default()
        }
    }

    /// Diffuse color at `(u, v)`.
    pub fn sample_diffuse(&self, u: f32, v: f32) -> Color {
        sample_or(self.diffuse.as_deref(), u, v, DEFAULT_DIFFUSE)
    }

    /// Normal map color at `(u, v)`.
    pub fn sample_normal(&self, u: f32, v: f32) -> Color {
        sample_or(self.normal.as_deref(), u, v, DEFAULT_NORMAL)
    }

    /// ID map color at `(u, v)`.
    pub fn sample_id(&self, u: f32, v: f32) -> Color {
        sample_or(self.id.as_deref(), u, v, DEFAULT_ID)
    }
}

fn sample_or(texture: Option<&Texture>, u: f32, v: f32, fallback: Color) -> Color {
    texture.map_or(fallback, |t| t.sample_pixel(u, v))
}
