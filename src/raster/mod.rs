//! The shared atlas pixel buffer.

pub mod codec;
pub mod decode_queue;

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::error::{AtlasError, Result};

pub use decode_queue::{DecodeOutcome, DecodeQueue, DecodeTicket};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Square RGBA raster shared by every shape.
///
/// Every mutation bumps `version`; the render collaborator compares it with
/// the last version it uploaded.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    version: u64,
    uploaded_version: u64,
}

impl RasterSurface {
    /// New surface filled with white.
    pub fn new(size: u32) -> Self {
        Self::filled(size, WHITE)
    }

    pub fn filled(size: u32, color: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(size, size, color),
            version: 1,
            uploaded_version: 0,
        }
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether contents changed since the last `mark_uploaded`.
    pub fn needs_upload(&self) -> bool {
        self.version != self.uploaded_version
    }

    pub fn mark_uploaded(&mut self) {
        self.uploaded_version = self.version;
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Pixel at `(x, y)`, with coordinates clamped into the raster.
    pub fn read_pixel(&self, x: i32, y: i32) -> Rgba<u8> {
        let max = self.size() as i32 - 1;
        *self
            .image
            .get_pixel(x.clamp(0, max) as u32, y.clamp(0, max) as u32)
    }

    /// Set one pixel; out-of-range coordinates are ignored.
    pub fn write_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        self.write_rect(x, y, 1, 1, color);
    }

    /// Fill a rectangle, clipped to the raster. Returns the number of
    /// pixels written.
    pub fn write_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) -> usize {
        let size = self.size() as i64;
        let x0 = (x as i64).clamp(0, size);
        let y0 = (y as i64).clamp(0, size);
        let x1 = (x as i64 + width as i64).clamp(0, size);
        let y1 = (y as i64 + height as i64).clamp(0, size);

        if x0 >= x1 || y0 >= y1 {
            return 0;
        }

        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px as u32, py as u32, color);
            }
        }
        self.touch();
        ((x1 - x0) * (y1 - y0)) as usize
    }

    pub fn clear(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
        self.touch();
    }

    /// Decode `bytes` and replace the contents, scaling to the raster size.
    ///
    /// On failure the current contents are left untouched.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<()> {
        let image = codec::decode_to_size(bytes, self.size())?;
        self.replace(image);
        Ok(())
    }

    /// Swap in a fully decoded image in one step.
    pub fn replace(&mut self, image: RgbaImage) {
        let image = codec::fit_to_size(image, self.size());
        debug!(size = self.size(), "Replacing raster contents");
        self.image = image;
        self.touch();
    }

    /// Nearest-neighbor copy at `target x target`.
    pub fn export_scaled(&self, target: u32) -> RgbaImage {
        codec::fit_to_size(self.image.clone(), target.max(1))
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        codec::encode_png(&self.image)
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (the `#` is optional).
pub fn parse_hex_color(text: &str) -> Result<Rgba<u8>> {
    let hex = text.trim().trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(AtlasError::Input(format!("Invalid color: {text}")));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| AtlasError::Input(format!("Invalid color: {text}")))
    };

    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
