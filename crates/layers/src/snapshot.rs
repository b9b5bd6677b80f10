//! PNG output of a rendered [`Surface`].
//!
//! Feature-gated behind `png` (default on) so library users can skip the
//! `image` dependency. The byte conversion lives in [`crate::pixel`].

use std::path::Path;

use strata_core::{LayerError, Surface};

use crate::pixel::surface_to_rgba;

/// Writes a surface as an RGBA PNG.
///
/// Returns `LayerError::InvalidDimensions` if the surface dimensions overflow
/// `u32`, or `LayerError::Io` on write failure.
pub fn write_png(surface: &Surface, path: &Path) -> Result<(), LayerError> {
    let rgba = surface_to_rgba(surface);
    let w = u32::try_from(surface.width()).map_err(|_| LayerError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| LayerError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| LayerError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| LayerError::Io(e.to_string()))
}
