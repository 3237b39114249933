//! Image codec boundary between the rasterizers and the widget layout layer.
//!
//! Handles hold **straight** RGBA8 so they survive a PNG round trip byte-for-byte; the
//! premultiplied rasterizer output is converted exactly once, in [`encode`].

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::{
    foundation::error::{BarError, BarResult},
    render::backend::RasterImage,
};

/// Opaque, cheaply clonable bitmap handed to the layout layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageHandle {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl ImageHandle {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Straight RGBA8 bytes, row-major.
    pub fn as_rgba8(&self) -> &[u8] {
        self.rgba8.as_slice()
    }

    /// Straight RGBA8 channels at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Serialize as PNG.
    pub fn to_png(&self) -> BarResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.rgba8.to_vec())
            .ok_or_else(|| BarError::raster("image handle buffer does not match its size"))?;

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }

    /// Write the handle to disk as PNG, creating parent directories.
    pub fn save_png(&self, path: &Path) -> BarResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }

        image::save_buffer_with_format(
            path,
            self.as_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Wrap rasterizer output into a handle.
pub fn encode(raster: &RasterImage) -> BarResult<ImageHandle> {
    let expected = (raster.width as usize)
        .saturating_mul(raster.height as usize)
        .saturating_mul(4);
    if raster.data.len() != expected {
        return Err(BarError::raster(format!(
            "raster buffer is {} bytes, expected {expected} for {}x{}",
            raster.data.len(),
            raster.width,
            raster.height
        )));
    }

    let mut rgba8 = raster.data.clone();
    if raster.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba8);
    }

    Ok(ImageHandle {
        width: raster.width,
        height: raster.height,
        rgba8: Arc::new(rgba8),
    })
}

/// Decode transported image bytes (PNG, or any format `image` recognizes).
pub fn decode(bytes: &[u8]) -> BarResult<ImageHandle> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(ImageHandle {
        width,
        height,
        rgba8: Arc::new(rgba.into_raw()),
    })
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
