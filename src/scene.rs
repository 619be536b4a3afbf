//! Bake orchestration.
//!
//! A [`Scene`] owns both meshes and the four output textures. Baking splits
//! every output buffer into disjoint rows, hands the rows to a fixed-size
//! worker pool, then turns the collected hit distances into the ID map's
//! alpha channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::baker::{RowTarget, TexelBaker};
use crate::error::BakeError;
use crate::mesh::Mesh;
use crate::texture::Texture;

/// The four textures produced by a bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BakedMap {
    /// Diffuse color
    Diffuse,
    /// ID/mask with depth-derived alpha
    Id,
    /// Normal map transferred from the high-poly materials
    Normal,
    /// Object-space normals of the high-poly surface
    ObjectNormal,
}

impl BakedMap {
    /// All maps in output order.
    pub const ALL: [BakedMap; 4] = [
        BakedMap::Diffuse,
        BakedMap::Id,
        BakedMap::Normal,
        BakedMap::ObjectNormal,
    ];

    /// File name suffix used when saving this map.
    pub fn suffix(self) -> &'static str {
        match self {
            BakedMap::Diffuse => "diff",
            BakedMap::Id => "id",
            BakedMap::Normal => "nrm",
            BakedMap::ObjectNormal => "obj_nrm",
        }
    }
}

/// Settings for a single bake.
#[derive(Debug, Clone)]
pub struct BakeOptions {
    /// Number of worker threads, at least 1.
    pub workers: usize,
    /// Show a progress bar on stderr.
    pub progress: bool,
    /// Checked before each row; once set, remaining rows are skipped.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for BakeOptions {
    /// Half the logical cores, no progress bar, not cancellable.
    fn default() -> Self {
        Self {
            workers: (available_cores() / 2).max(1),
            progress: false,
            cancel: None,
        }
    }
}

impl BakeOptions {
    /// Use every logical core.
    pub fn all_cores() -> Self {
        Self {
            workers: available_cores(),
            ..Self::default()
        }
    }

    /// Use exactly `workers` threads.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }
}

fn available_cores() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Summary of a finished bake.
#[derive(Debug, Clone, PartialEq)]
pub struct BakeReport {
    /// Texels that received a color.
    pub baked_texels: usize,
    /// Texels in each output texture.
    pub total_texels: usize,
    /// Largest front-side hit distance, `None` when nothing was hit from the
    /// front.
    pub max_distance: Option<f32>,
    /// Wall-clock time of the bake.
    pub elapsed: Duration,
}

/// Low-poly and high-poly meshes together with the bake outputs.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Mesh whose UV layout defines the output texture space.
    pub lowpoly: Mesh,
    /// Detailed mesh whose surface attributes are transferred.
    pub highpoly: Mesh,
    baked_diffuse: Texture,
    baked_normal: Texture,
    baked_object_normal: Texture,
    baked_id: Texture,
    output_size: u32,
}

impl Scene {
    /// Create an empty scene with four transparent `size`×`size` outputs.
    pub fn new(size: u32) -> Result<Self, BakeError> {
        if size == 0 {
            return Err(BakeError::InvalidSize(size));
        }
        Ok(Self {
            lowpoly: Mesh::new(),
            highpoly: Mesh::new(),
            baked_diffuse: Texture::new(size),
            baked_normal: Texture::new(size),
            baked_object_normal: Texture::new(size),
            baked_id: Texture::new(size),
            output_size: size,
        })
    }

    /// Side length of the output textures.
    pub fn output_size(&self) -> u32 {
        self.output_size
    }

    /// Baked diffuse color.
    pub fn baked_diffuse(&self) -> &Texture {
        &self.baked_diffuse
    }

    /// Baked normal map.
    pub fn baked_normal(&self) -> &Texture {
        &self.baked_normal
    }

    /// Baked object-space normals.
    pub fn baked_object_normal(&self) -> &Texture {
        &self.baked_object_normal
    }

    /// Baked ID map; alpha holds normalized hit distance.
    pub fn baked_id(&self) -> &Texture {
        &self.baked_id
    }

    /// Output texture for `map`.
    pub fn texture(&self, map: BakedMap) -> &Texture {
        match map {
            BakedMap::Diffuse => &self.baked_diffuse,
            BakedMap::Id => &self.baked_id,
            BakedMap::Normal => &self.baked_normal,
            BakedMap::ObjectNormal => &self.baked_object_normal,
        }
    }

    /// Bake every output texel.
    ///
    /// Rows are processed in parallel on `options.workers` threads. Texels
    /// with no accepted hit keep their previous content. After all rows are
    /// done, hit distances are normalized into the ID map's alpha channel.
    pub fn bake(&mut self, options: &BakeOptions) -> Result<BakeReport, BakeError> {
        let cancel = options.cancel.as_deref();
        self.bake_until(options, &|| cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)))
    }

    /// Bake, skipping every row that starts after `stop` returns true.
    ///
    /// The bake counts as cancelled only when at least one row was skipped.
    fn bake_until(
        &mut self,
        options: &BakeOptions,
        stop: &(dyn Fn() -> bool + Sync),
    ) -> Result<BakeReport, BakeError> {
        if options.workers == 0 {
            return Err(BakeError::InvalidWorkerCount);
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .thread_name(|i| format!("bake-worker-{i}"))
            .build()?;

        let size = self.output_size;
        let n = size as usize;
        info!(
            "Baking {}x{} on {} workers ({} low-poly, {} high-poly triangles)",
            size,
            size,
            options.workers,
            self.lowpoly.len(),
            self.highpoly.len()
        );
        if self.lowpoly.is_empty() || self.highpoly.is_empty() {
            warn!("Baking with an empty mesh, no texel will be baked");
        }
        let start = Instant::now();

        let progress = options.progress.then(|| {
            let pb = ProgressBar::new(u64::from(size));
            if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {pos}/{len} rows ETA: {eta}") {
                pb.set_style(style);
            }
            pb
        });
        let skipped_rows = AtomicBool::new(false);

        let mut depth = vec![0.0_f32; n * n];
        let Scene {
            lowpoly,
            highpoly,
            baked_diffuse,
            baked_normal,
            baked_object_normal,
            baked_id,
            ..
        } = self;
        let baker = TexelBaker::new(lowpoly, highpoly, size);

        let row_bytes = n * 4;
        let baked_texels: usize = pool.install(|| {
            depth
                .par_chunks_mut(n)
                .zip(baked_diffuse.as_raw_mut().par_chunks_mut(row_bytes))
                .zip(baked_id.as_raw_mut().par_chunks_mut(row_bytes))
                .zip(baked_object_normal.as_raw_mut().par_chunks_mut(row_bytes))
                .zip(baked_normal.as_raw_mut().par_chunks_mut(row_bytes))
                .enumerate()
                .map(|(y, ((((depth, diffuse), id), object_normal), normal))| {
                    if stop() {
                        skipped_rows.store(true, Ordering::Relaxed);
                        return 0;
                    }
                    let row = RowTarget {
                        depth,
                        diffuse,
                        id,
                        object_normal,
                        normal,
                    };
                    let baked = baker.bake_row(y as u32, row);
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    baked
                })
                .sum()
        });

        if skipped_rows.into_inner() {
            if let Some(pb) = &progress {
                pb.abandon();
            }
            warn!("Bake cancelled after {:.2?}", start.elapsed());
            return Err(BakeError::Cancelled);
        }
        if let Some(pb) = &progress {
            pb.finish();
        }

        let max_distance = clamp_depth(&mut depth);
        match max_distance {
            Some(max) => {
                debug!("Maximum hit distance {max}");
                write_depth_alpha(baked_id, &depth, max);
            }
            None => warn!("No texel was hit from the front side, ID alpha left untouched"),
        }

        let elapsed = start.elapsed();
        info!("Baking took {:.2?}", elapsed);
        info!("Baked {} of {} texels", baked_texels, n * n);

        Ok(BakeReport {
            baked_texels,
            total_texels: n * n,
            max_distance,
            elapsed,
        })
    }
}

/// Clamp non-positive depths to zero and return the largest positive depth.
fn clamp_depth(depth: &mut [f32]) -> Option<f32> {
    let mut max: Option<f32> = None;
    for d in depth.iter_mut() {
        if *d <= 0.0 {
            *d = 0.0;
        } else if max.map_or(true, |m| *d > m) {
            max = Some(*d);
        }
    }
    max
}

/// Store `depth / max` as the alpha of every ID texel.
fn write_depth_alpha(id: &mut Texture, depth: &[f32], max: f32) {
    for (pixel, d) in id.as_raw_mut().chunks_exact_mut(4).zip(depth) {
        pixel[3] = (d / max * 255.0) as u8;
    }
}
