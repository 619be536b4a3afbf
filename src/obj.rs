//! Wavefront OBJ loading.
//!
//! Faces are triangulated on load. Materials come from the referenced MTL
//! library: `map_Kd` is the diffuse texture, `norm`/`map_Bump`/`bump` the
//! normal map, and the non-standard `map_ID` key the ID map. Texture paths are
//! resolved relative to the OBJ file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Vec2, Vec3A};
use log::{debug, info, warn};

use crate::error::BakeError;
use crate::material::Material;
use crate::mesh::{Mesh, Triangle, Vertex};
use crate::texture::Texture;

/// MTL keys accepted for the ID map.
const ID_MAP_KEYS: [&str; 2] = ["map_ID", "map_id"];

impl Mesh {
    /// Load every object of an OBJ file into one mesh, in file order.
    ///
    /// With `load_materials` set, MTL materials and their textures are loaded
    /// and attached to the triangles. Missing or unreadable textures are
    /// logged and left out. OBJ vertex colors provide the per-vertex alpha
    /// attribute (red channel); without them alpha is 1. Missing normals fall
    /// back to the face normal.
    pub fn load_obj(path: impl AsRef<Path>, load_materials: bool) -> Result<Mesh, BakeError> {
        let path = path.as_ref();
        let (models, materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| BakeError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        let materials = if load_materials {
            match materials {
                Ok(materials) => {
                    let base = path.parent().unwrap_or_else(|| Path::new(""));
                    let mut cache = TextureCache::default();
                    materials
                        .iter()
                        .map(|m| Arc::new(convert_material(m, base, &mut cache)))
                        .collect()
                }
                Err(e) => {
                    warn!("No materials loaded for {}: {}", path.display(), e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut mesh = Mesh::new();
        for model in &models {
            let data = &model.mesh;
            let material = data.material_id.and_then(|id| materials.get(id));
            if load_materials && material.is_none() {
                debug!("Object '{}' has no material", model.name);
            }

            for face in data.indices.chunks_exact(3) {
                let [v0, v1, v2] = [face[0], face[1], face[2]].map(|i| read_vertex(data, i as usize));
                let mut triangle = Triangle::new(v0, v1, v2);
                if data.normals.is_empty() {
                    let n = triangle.geometric_normal().unwrap_or(Vec3A::ZERO);
                    triangle.v0.normal = n;
                    triangle.v1.normal = n;
                    triangle.v2.normal = n;
                }
                if let Some(material) = material {
                    triangle = triangle.with_material(Arc::clone(material));
                }
                mesh.push(triangle);
            }
            debug!("Object '{}': {} triangles", model.name, data.indices.len() / 3);
        }

        info!(
            "Loaded {} triangles and {} materials from {}",
            mesh.len(),
            materials.len(),
            path.display()
        );
        Ok(mesh)
    }
}

/// Read vertex `i` of a single-index tobj mesh.
fn read_vertex(data: &tobj::Mesh, i: usize) -> Vertex {
    let position = Vec3A::new(
        data.positions[3 * i],
        data.positions[3 * i + 1],
        data.positions[3 * i + 2],
    );
    let uv = match data.texcoords.get(2 * i..2 * i + 2) {
        Some(&[u, v]) => Vec2::new(u, v),
        _ => Vec2::ZERO,
    };

    let mut vertex = Vertex::new(position, uv);
    if let Some(&[x, y, z]) = data.normals.get(3 * i..3 * i + 3) {
        vertex.normal = Vec3A::new(x, y, z);
    }
    if let Some(&red) = data.vertex_color.get(3 * i) {
        vertex.alpha = red;
    }
    vertex
}

/// Textures already loaded for one MTL library, keyed by resolved path.
#[derive(Default)]
struct TextureCache {
    textures: HashMap<PathBuf, Option<Arc<Texture>>>,
}

impl TextureCache {
    fn get(&mut self, base: &Path, name: &str) -> Option<Arc<Texture>> {
        let path = base.join(name);
        self.textures
            .entry(path)
            .or_insert_with_key(|path| match Texture::load(path) {
                Ok(texture) => Some(Arc::new(texture)),
                Err(e) => {
                    warn!("Skipping texture: {}", e);
                    None
                }
            })
            .clone()
    }
}

fn convert_material(m: &tobj::Material, base: &Path, cache: &mut TextureCache) -> Material {
    let id_name = ID_MAP_KEYS.iter().find_map(|key| m.unknown_param.get(*key));
    let material = Material {
        diffuse: m.diffuse_texture.as_deref().and_then(|name| cache.get(base, name)),
        normal: m.normal_texture.as_deref().and_then(|name| cache.get(base, name)),
        id: id_name.and_then(|name| cache.get(base, name)),
    };
    debug!(
        "Material '{}': diffuse={} normal={} id={}",
        m.name,
        material.diffuse.is_some(),
        material.normal.is_some(),
        material.id.is_some()
    );
    material
}
