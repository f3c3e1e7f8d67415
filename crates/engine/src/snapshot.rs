//! PNG output of rendered frames.
//!
//! Feature-gated behind `png` (default on) so hosts that only need the
//! controller do not pull in the `image` crate.

use std::path::Path;

use spritefield_core::error::EngineError;
use spritefield_core::pixels::PixelBuffer;

/// Writes a pixel buffer as an RGBA PNG.
///
/// Returns `EngineError::InvalidDimensions` if the buffer dimensions
/// overflow `u32`, or `EngineError::Io` on write failure.
pub fn write_png(buffer: &PixelBuffer, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(buffer.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(buffer.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, buffer.to_rgba8())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}
