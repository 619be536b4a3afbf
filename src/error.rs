//! Error type shared by scene setup, loading, baking and output.

use std::path::PathBuf;

/// Errors surfaced by the baker.
///
/// Texels that end up unbaked are not errors; they are a normal outcome of
/// a bake and only show up in [`crate::scene::BakeReport`].
#[derive(Debug, thiserror::Error)]
pub enum BakeError {
    /// Output textures need at least one texel per side.
    #[error("output size must be at least 1, got {0}")]
    InvalidSize(u32),

    /// A bake needs at least one worker thread.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The bake was cancelled before every row was processed.
    #[error("bake cancelled")]
    Cancelled,

    /// OBJ/MTL parsing failed.
    #[error("failed to load mesh {}: {source}", path.display())]
    Obj {
        /// Mesh file being read.
        path: PathBuf,
        /// Underlying loader error.
        #[source]
        source: tobj::LoadError,
    },

    /// Image decoding or encoding failed.
    #[error("image error for {}: {source}", path.display())]
    Image {
        /// Image file being read or written.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: image::ImageError,
    },

    /// EXR encoding failed.
    #[error("failed to write EXR {}: {source}", path.display())]
    Exr {
        /// Output file.
        path: PathBuf,
        /// Underlying EXR error.
        #[source]
        source: exr::error::Error,
    },

    /// File extension is not one the output module can write.
    #[error("unsupported output format '{0}'")]
    UnsupportedFormat(String),

    /// Generic I/O failure (network or filesystem).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
