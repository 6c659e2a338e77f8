//! Image file decode/encode around the core. Formats come from the `image`
//! crate; the core never sees a file.

use anyhow::Context;

use common::Buffer2;
use tessera::Rgba8;

/// Decode any supported format into straight 8-bit RGBA bytes.
pub fn load_rgba8(filename: &str) -> anyhow::Result<(u32, u32, Vec<u8>)> {
    let img = image::open(filename)
        .with_context(|| format!("failed to open image '{filename}'"))?;
    let rgba = img.to_rgba8();
    Ok((rgba.width(), rgba.height(), rgba.into_raw()))
}

/// Encode the reconstructed raster; the format is chosen from the file
/// extension.
pub fn save_rgba8(filename: &str, raster: &Buffer2<Rgba8>) -> anyhow::Result<()> {
    let mut bytes = Vec::with_capacity(raster.len() * 4);
    for px in raster.iter() {
        bytes.extend_from_slice(&[px.r, px.g, px.b, px.a]);
    }

    image::save_buffer(
        filename,
        &bytes,
        raster.width() as u32,
        raster.height() as u32,
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("failed to save image '{filename}'"))?;

    Ok(())
}
