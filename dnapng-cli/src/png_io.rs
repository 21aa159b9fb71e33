//! PNG encoding and decoding of codec images.

use std::io::Write;

use anyhow::{Context, Result};
use dnapng::RgbaImage;

/// Write an image as an 8-bit RGBA PNG.
pub fn write_rgba_png<W: Write>(w: W, img: &RgbaImage) -> Result<()> {
    let mut encoder = png::Encoder::new(w, img.width, img.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().context("writing PNG header")?;
    writer
        .write_image_data(&img.buf)
        .context("writing PNG data")?;
    writer.finish().context("finishing PNG stream")?;
    Ok(())
}

/// Decode a PNG of any colour type or bit depth into 8-bit RGBA.
pub fn read_rgba_png(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .context("decoding PNG")?
        .into_rgba8();
    let (width, height) = img.dimensions();
    RgbaImage::from_raw(width, height, img.into_raw())
        .context("decoded PNG has an unexpected buffer size")
}
