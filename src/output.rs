//! # Output Module
//!
//! Writes baked textures to disk and optionally shows them in TEV (The EXR
//! Viewer):
//! - PNG and TGA keep all four RGBA8 channels
//! - JPEG drops alpha
//! - EXR stores each channel as linear f32 in [0, 1]
//!
//! Textures are stored bottom-up in memory; every writer goes through
//! [`Texture::to_image`] so files come out top-down.

use std::ffi::OsStr;
use std::net::TcpStream;
use std::path::Path;
use std::time::Instant;

use exr::prelude::write_rgba_file;
use image::DynamicImage;
use log::{debug, info};
use tev_client::{PacketCreateImage, PacketUpdateImage, TevClient};

use crate::error::BakeError;
use crate::texture::Texture;

/// TEV's default listening port.
pub const TEV_DEFAULT_PORT: u16 = 14158;

/// Save a texture, choosing the encoder from the file extension.
///
/// Supported extensions: `png`, `tga`, `jpg`/`jpeg`, `exr`.
pub fn save_texture(texture: &Texture, path: impl AsRef<Path>) -> Result<(), BakeError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let image_error = |source| BakeError::Image {
        path: path.to_path_buf(),
        source,
    };

    let start = Instant::now();
    match extension.as_str() {
        "png" | "tga" => texture.to_image().save(path).map_err(image_error)?,
        "jpg" | "jpeg" => DynamicImage::ImageRgba8(texture.to_image())
            .into_rgb8()
            .save(path)
            .map_err(image_error)?,
        "exr" => save_texture_as_exr(texture, path)?,
        _ => return Err(BakeError::UnsupportedFormat(extension)),
    }
    info!("Saved {} in {:.2?}", path.display(), start.elapsed());
    Ok(())
}

/// Save a texture as an RGBA f32 EXR without any transfer curve.
fn save_texture_as_exr(texture: &Texture, path: &Path) -> Result<(), BakeError> {
    let image = texture.to_image();
    let channel = |value: u8| f32::from(value) / 255.0;

    write_rgba_file(
        path,
        image.width() as usize,
        image.height() as usize,
        |x, y| {
            let p = image.get_pixel(x as u32, y as u32);
            (channel(p[0]), channel(p[1]), channel(p[2]), channel(p[3]))
        },
    )
    .map_err(|source| BakeError::Exr {
        path: path.to_path_buf(),
        source,
    })
}

/// Append TEV's default port when `address` has none.
pub fn tev_address(address: &str) -> String {
    if address.contains(':') {
        address.to_string()
    } else {
        format!("{}:{}", address, TEV_DEFAULT_PORT)
    }
}

/// Split interleaved RGBA8 into planar f32 channels (RRR...GGG...BBB...AAA...).
fn planar_channels(image: &image::RgbaImage) -> Vec<f32> {
    let pixel_count = (image.width() * image.height()) as usize;
    let mut data = Vec::with_capacity(pixel_count * 4);
    for c in 0..4 {
        data.extend(image.pixels().map(|p| f32::from(p[c]) / 255.0));
    }
    data
}

/// Send a texture to a running TEV instance as image `name`.
///
/// `address` is `host:port` or just `host`, in which case port 14158 is used.
pub fn send_texture_to_tev(texture: &Texture, name: &str, address: &str) -> Result<(), BakeError> {
    let address = tev_address(address);
    debug!("Connecting to TEV at {}", address);

    let stream = TcpStream::connect(&address)?;
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Failed to set TCP_NODELAY: {}", e);
    }
    let mut client = TevClient::wrap(stream);

    let image = texture.to_image();
    let (width, height) = image.dimensions();
    let channel_names = &["R", "G", "B", "A"];

    client.send(PacketCreateImage {
        image_name: name,
        grab_focus: false,
        width,
        height,
        channel_names,
    })?;

    let start = Instant::now();
    let data = planar_channels(&image);
    let plane = u64::from(width) * u64::from(height);
    client.send(PacketUpdateImage {
        image_name: name,
        grab_focus: false,
        channel_names,
        channel_offsets: &[0, plane, 2 * plane, 3 * plane],
        channel_strides: &[1, 1, 1, 1],
        x: 0,
        y: 0,
        width,
        height,
        data: &data,
    })?;

    info!("Sent '{}' to TEV at {} in {:.2?}", name, address, start.elapsed());
    Ok(())
}
