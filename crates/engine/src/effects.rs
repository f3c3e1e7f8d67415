//! Post effects applied after the tile pass, in order: depth-of-field blur
//! (per tile, while drawing), bloom, then grain.

use noise::{NoiseFn, OpenSimplex};
use spritefield_core::canvas::BlendMode;
use spritefield_core::color::Srgb;
use spritefield_core::pixels::{PixelBuffer, Rgba};
use spritefield_core::surface::Surface;

/// Focus distances below this are drawn sharp.
pub const DOF_MIN_DISTANCE: f64 = 0.06;

/// Blur radius in pixels at full strength and maximum distance.
pub const DOF_MAX_BLUR: f64 = 8.0;

/// Bloom blur radius as a share of the shorter surface side.
const BLOOM_RADIUS_FRACTION: f64 = 0.02;

/// Spatial frequency of the grain, in cycles per pixel.
const GRAIN_FREQUENCY: f64 = 0.9;

/// Overlay strength of the grain at 100% amount.
const GRAIN_STRENGTH: f64 = 0.35;

/// Blur radius for a tile at pseudo-depth `z`.
///
/// `z`, `focus` and `strength` are all in [0, 1]. Blur grows with the
/// square of the distance from the focus plane.
pub fn depth_of_field_blur(z: f64, focus: f64, strength: f64) -> f64 {
    let distance = (z - focus).abs();
    if distance < DOF_MIN_DISTANCE {
        return 0.0;
    }
    (distance * distance * strength.clamp(0.0, 1.0) * DOF_MAX_BLUR).min(DOF_MAX_BLUR)
}

/// Extracts pixels brighter than `threshold`, blurs them and screens them
/// back over the surface at `intensity`.
pub fn apply_bloom(surface: &mut dyn Surface, threshold: f64, intensity: f64) {
    if intensity <= 0.0 {
        return;
    }
    let mut glow = surface.snapshot().threshold(threshold);
    let radius = (surface.width().min(surface.height()) as f64 * BLOOM_RADIUS_FRACTION)
        .round()
        .max(1.0) as usize;
    glow.box_blur(radius);
    surface.composite(&glow, BlendMode::Screen, intensity.clamp(0.0, 1.0));
}

/// Builds a gray grain layer from OpenSimplex noise sampled at `time`.
pub fn grain_layer(width: usize, height: usize, seed: u32, time: f64) -> Option<PixelBuffer> {
    let noise = OpenSimplex::new(seed);
    let data = (0..width * height)
        .map(|i| {
            let x = (i % width) as f64 * GRAIN_FREQUENCY;
            let y = (i / width) as f64 * GRAIN_FREQUENCY;
            let n = (noise.get([x, y, time * 24.0]) * 0.5 + 0.5).clamp(0.0, 1.0);
            Rgba::opaque(Srgb::new(n, n, n))
        })
        .collect();
    PixelBuffer::from_data(width, height, data).ok()
}

/// Overlays animated grain at `amount` in [0, 1].
pub fn apply_grain(surface: &mut dyn Surface, amount: f64, seed: u32, time: f64) {
    if amount <= 0.0 {
        return;
    }
    if let Some(grain) = grain_layer(surface.width(), surface.height(), seed, time) {
        surface.composite(&grain, BlendMode::Overlay, amount.clamp(0.0, 1.0) * GRAIN_STRENGTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;

    #[test]
    fn in_focus_tiles_are_sharp() {
        assert_eq!(depth_of_field_blur(0.5, 0.5, 1.0), 0.0);
        assert_eq!(depth_of_field_blur(0.55, 0.5, 1.0), 0.0);
    }

    #[test]
    fn blur_grows_quadratically() {
        let near = depth_of_field_blur(0.7, 0.5, 1.0);
        let far = depth_of_field_blur(0.9, 0.5, 1.0);
        assert!((far / near - 4.0).abs() < 1e-9);
    }

    #[test]
    fn blur_is_capped_and_scaled_by_strength() {
        assert!((depth_of_field_blur(1.0, 0.0, 1.0) - DOF_MAX_BLUR).abs() < 1e-12);
        assert_eq!(depth_of_field_blur(1.0, 0.0, 0.0), 0.0);
        assert!(depth_of_field_blur(1.0, 0.0, 0.5) < DOF_MAX_BLUR);
    }

    #[test]
    fn bloom_brightens_around_bright_pixels() {
        let mut raster = Raster::new(16, 16).unwrap();
        raster.clear(Some(Srgb::BLACK));
        raster.buffer_mut().set(8, 8, Rgba::opaque(Srgb::WHITE));
        apply_bloom(&mut raster, 0.5, 1.0);
        let neighbor = raster.buffer().get(9, 8).unwrap();
        assert!(neighbor.r > 0.0);
    }

    #[test]
    fn bloom_with_zero_intensity_is_a_no_op() {
        let mut raster = Raster::new(8, 8).unwrap();
        raster.clear(Some(Srgb::new(0.9, 0.9, 0.9)));
        let before = raster.snapshot();
        apply_bloom(&mut raster, 0.1, 0.0);
        assert_eq!(raster.snapshot(), before);
    }

    #[test]
    fn grain_is_deterministic_and_varied() {
        let a = grain_layer(12, 12, 3, 0.5).unwrap();
        let b = grain_layer(12, 12, 3, 0.5).unwrap();
        assert_eq!(a, b);
        let first = a.data()[0].r;
        assert!(a.data().iter().any(|p| (p.r - first).abs() > 1e-3));
    }

    #[test]
    fn grain_changes_pixels() {
        let mut raster = Raster::new(8, 8).unwrap();
        raster.clear(Some(Srgb::new(0.5, 0.5, 0.5)));
        let before = raster.snapshot();
        apply_grain(&mut raster, 1.0, 7, 0.0);
        assert_ne!(raster.snapshot(), before);
    }
}
