// THEORY:
// `PixelBuffer` is the read-only view of one captured frame. The camera side of the
// game owns acquisition; by the time a buffer reaches the scanner it is a finished,
// immutable block of row-major bytes. The scanner only ever reads single pixels from
// it by coordinate, so the one job of this type is to validate the layout once at
// construction and then make `pixel_at` a cheap, bounds-checked lookup.
//
// Both RGB (3 bytes per pixel) and RGBA (4 bytes per pixel, as delivered by canvas
// and most capture APIs) layouts are accepted. Alpha is ignored.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::ScanError;
use image::{DynamicImage, RgbImage, RgbaImage};

/// An immutable, validated frame of row-major RGB or RGBA bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    /// Bytes per pixel: 3 (RGB) or 4 (RGBA).
    channels: u8,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, ScanError> {
        if channels != 3 && channels != 4 {
            return Err(ScanError::UnsupportedChannels(channels));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(ScanError::BufferSize {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, channels, data })
    }

    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ScanError> {
        Self::new(width, height, 3, data)
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ScanError> {
        Self::new(width, height, 4, data)
    }

    /// A frame filled with a single color.
    pub fn filled(width: u32, height: u32, color: Pixel) -> Self {
        let data = [color.red, color.green, color.blue].repeat(width as usize * height as usize);
        Self { width, height, channels: 3, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reads the pixel at `(x, y)`, or `None` when the coordinate is outside the frame.
    #[inline]
    pub fn pixel_at(&self, x: i64, y: i64) -> Option<Pixel> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        let index = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        let bytes = &self.data[index..index + 3];
        Some(Pixel::new(bytes[0], bytes[1], bytes[2]))
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height, channels: 3, data: image.into_raw() }
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height, channels: 4, data: image.into_raw() }
    }
}

impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageRgb8(rgb) => rgb.into(),
            DynamicImage::ImageRgba8(rgba) => rgba.into(),
            other => other.to_rgba8().into(),
        }
    }
}
