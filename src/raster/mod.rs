//! Raster boundary: finalized RGBA drawings in, PNG blobs out.

pub mod canvas;
pub mod signature;

pub use canvas::Canvas;
pub use signature::{rank_by_frequency, SignatureExtractor};

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::{JourneyError, JourneyResult};

/// A finished drawing: `width * height` RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSource {
    image: RgbaImage,
}

impl RasterSource {
    pub fn from_rgba(width: u32, height: u32, bytes: Vec<u8>) -> JourneyResult<Self> {
        let len = bytes.len();
        RgbaImage::from_raw(width, height, bytes)
            .map(|image| Self { image })
            .ok_or_else(|| {
                JourneyError::invalid_raster(format!(
                    "{width}x{height} RGBA needs {} bytes, got {len}",
                    u64::from(width) * u64::from(height) * 4
                ))
            })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn encode_png(&self) -> JourneyResult<Vec<u8>> {
        encode_png(&self.image)
    }
}

pub fn encode_png(image: &RgbaImage) -> JourneyResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn decode_png(bytes: &[u8]) -> JourneyResult<RgbaImage> {
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8())
}
