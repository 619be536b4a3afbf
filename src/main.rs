use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, info, warn};

use chromabake::error::BakeError;
use chromabake::mesh::Mesh;
use chromabake::output::{save_texture, send_texture_to_tev};
use chromabake::scene::{BakeOptions, BakedMap, Scene};

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

fn main() -> ExitCode {
    let args = Args::parse();

    init_logger(args.debug_level.clone().into());

    // Log application startup with version information
    info!("ChromaBake - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), BakeError> {
    let start = Instant::now();

    let mut scene = Scene::new(args.size)?;
    scene.lowpoly = Mesh::load_obj(&args.lowpoly, false)?;
    scene.highpoly = Mesh::load_obj(&args.highpoly, true)?;
    info!("Meshes loaded in {:.2?}", start.elapsed());

    let mut options = if args.all_cores {
        BakeOptions::all_cores()
    } else {
        BakeOptions::default()
    };
    if let Some(workers) = args.workers {
        options.workers = workers;
    }
    options.progress = !args.no_progress;

    info!("Started baking in {}x{} resolution", args.size, args.size);
    let report = scene.bake(&options)?;
    if report.baked_texels == 0 {
        warn!("No texel was baked; check that the meshes overlap and the low-poly mesh has UVs");
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.lowpoly.parent().map(Path::to_path_buf).unwrap_or_default());
    let stem = args
        .lowpoly
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "baked".to_string());

    for map in BakedMap::ALL {
        let path = output_path(&output_dir, &stem, map, args.format.extension());
        save_texture(scene.texture(map), &path)?;
    }

    // Send to TEV if requested
    if args.tev || args.tev_address.is_some() {
        let address = args.tev_address.as_deref().unwrap_or("localhost");
        for map in BakedMap::ALL {
            let name = format!("{}_{}", stem, map.suffix());
            if let Err(e) = send_texture_to_tev(scene.texture(map), &name, address) {
                warn!("Failed to send {} to TEV: {}", name, e);
                break;
            }
        }
    }

    info!("Program finished in {:.2?}", start.elapsed());
    Ok(())
}

/// `<dir>/<stem>_<suffix>.<extension>`
fn output_path(dir: &Path, stem: &str, map: BakedMap, extension: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", stem, map.suffix(), extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_follow_map_suffix() {
        let path = output_path(Path::new("out"), "tree", BakedMap::ObjectNormal, "png");
        assert_eq!(path, Path::new("out").join("tree_obj_nrm.png"));
    }
}
