//! Pure-computation pixel buffer conversion from a rendered [`Surface`].
//!
//! Always available (no feature gate) so callers that do not write PNGs can
//! still get at the bytes.

use strata_core::Surface;

/// Quantizes a surface to an RGBA8 buffer of length `width * height * 4`.
///
/// Channels are clamped to [0, 1]; alpha is straight (not premultiplied).
pub fn surface_to_rgba(surface: &Surface) -> Vec<u8> {
    surface
        .data()
        .iter()
        .flat_map(|c| c.to_rgba8())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Color;

    #[test]
    fn surface_to_rgba_correct_length() {
        let surface = Surface::new(8, 4).unwrap();
        assert_eq!(surface_to_rgba(&surface).len(), 8 * 4 * 4);
    }

    #[test]
    fn surface_to_rgba_keeps_alpha() {
        let surface = Surface::filled(2, 2, Color::new(1.0, 0.0, 0.0, 0.5)).unwrap();
        let buf = surface_to_rgba(&surface);
        for px in buf.chunks(4) {
            assert_eq!(px, [255, 0, 0, 128]);
        }
    }

    #[test]
    fn surface_to_rgba_clamps_out_of_range() {
        let surface = Surface::filled(1, 1, Color::new(-0.5, 2.0, 0.5, 1.0)).unwrap();
        let buf = surface_to_rgba(&surface);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[1], 255);
        assert_eq!(buf[2], 128);
    }
}
