use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::error::{AtlasError, Result};

/// Encode an RGBA image as PNG (lossless, used for snapshots and exports).
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| AtlasError::Output(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Decode encoded image bytes (format sniffed from the header).
///
/// Only real image encodings are accepted; bare pixel buffers carry no
/// dimensions and are rejected.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    if bytes.is_empty() {
        return Err(AtlasError::Decode("empty image data".into()));
    }
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| {
            warn!(data_len = bytes.len(), error = %e, "Cannot decode image data");
            AtlasError::Decode(e.to_string())
        })
}

/// Decode bytes that must be in `format`.
pub fn decode_image_as(bytes: &[u8], format: ImageFormat) -> Result<RgbaImage> {
    debug!(?format, data_len = bytes.len(), "Decoding image data");
    image::load_from_memory_with_format(bytes, format)
        .map(|img| img.to_rgba8())
        .map_err(|e| AtlasError::Decode(format!("{format:?}: {e}")))
}

/// Scale to `size x size` with nearest-neighbor sampling; no-op when the
/// image already has that size.
pub fn fit_to_size(image: RgbaImage, size: u32) -> RgbaImage {
    if image.dimensions() == (size, size) {
        return image;
    }
    imageops::resize(&image, size, size, FilterType::Nearest)
}

/// Decode and fit in one step; what every raster import goes through.
pub fn decode_to_size(bytes: &[u8], size: u32) -> Result<RgbaImage> {
    decode_image(bytes).map(|img| fit_to_size(img, size))
}
