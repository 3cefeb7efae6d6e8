//! Raster images owned by drawing logs.
//!
//! Images reach a log already decoded to RGBA. Large images are shrunk
//! once when they are appended (see [`downscale_factor`]); replays then
//! draw them through a transform that maps the unit square onto their
//! final placement.

use std::fmt;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::core::error::{PDFError, PDFResult};

/// Interpolation used when compositing an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationQuality {
    /// Bilinear/bicubic filtering
    #[default]
    Smooth,
    /// Nearest neighbour; cheapest in memory and time
    Fastest,
}

/// Decoded RGBA image, 8 bits per channel, not premultiplied.
#[derive(Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn new(pixels: RgbaImage) -> Self {
        RasterImage { pixels }
    }

    /// Wraps raw RGBA bytes.
    ///
    /// # Errors
    /// [`PDFError::InvalidObject`] if `data` is not `width * height * 4`
    /// bytes long.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> PDFResult<Self> {
        let len = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(RasterImage::new)
            .ok_or_else(|| {
                PDFError::InvalidObject(format!(
                    "{} bytes do not make a {}x{} RGBA image",
                    len, width, height
                ))
            })
    }

    /// A `width` x `height` image filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        RasterImage::new(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.pixels.as_raw().len()
    }

    /// Scales the image by `factor`, keeping its aspect ratio.
    ///
    /// Consumes `self`, so the original pixel buffer is freed as soon as
    /// the scaled copy exists.
    pub fn downscaled(self, factor: f64) -> RasterImage {
        let (width, height) = (self.width(), self.height());
        if width == 0 || height == 0 {
            return self;
        }
        let new_width = ((width as f64 * factor) as u32).max(1);
        let new_height = ((height as u64 * new_width as u64 / width.max(1) as u64) as u32).max(1);

        let scaled = imageops::resize(&self.pixels, new_width, new_height, FilterType::Triangle);
        drop(self);
        RasterImage::new(scaled)
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RasterImage({}x{})", self.width(), self.height())
    }
}

/// Scale applied to an image of `width` pixels when it is appended.
///
/// Wider than 1000 and at most 1500 pixels: 0.75. Wider than 1500: 0.5.
/// Otherwise `None` (kept as is).
pub fn downscale_factor(width: u32) -> Option<f64> {
    match width {
        0..=1000 => None,
        1001..=1500 => Some(0.75),
        _ => Some(0.5),
    }
}
