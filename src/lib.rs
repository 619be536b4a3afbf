//! ChromaBake texture baker
//!
//! Projects every texel of a low-poly mesh's UV layout onto its surface, casts
//! rays along the surface normal into a high-poly mesh, and transfers diffuse,
//! ID, object-space normal and normal-map data from the hits into four output
//! textures. Rows are baked in parallel on a fixed-size worker pool.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod baker;
pub mod error;
pub mod geometry;
pub mod hittable;
pub mod interval;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod output;
pub mod ray;
pub mod scene;
pub mod texture;

pub use error::BakeError;
pub use scene::{BakeOptions, BakeReport, BakedMap, Scene};
