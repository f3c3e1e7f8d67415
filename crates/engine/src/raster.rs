//! Software [`Surface`] backed by a [`PixelBuffer`].
//!
//! Shapes are rasterized by inverse-mapping each device pixel center in the
//! shape's bounding box through the current affine transform and sampling
//! the coverage there. Draws with a blur set are rendered into a scratch
//! layer, blurred, and composited.

use glam::{DAffine2, DVec2};
use spritefield_core::canvas::{BlendMode, Paint};
use spritefield_core::color::Srgb;
use spritefield_core::error::EngineError;
use spritefield_core::pixels::{PixelBuffer, Rgba};
use spritefield_core::sprite::SpriteImage;
use spritefield_core::surface::Surface;

/// Blur radii below this are ignored.
const MIN_BLUR_RADIUS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawState {
    transform: DAffine2,
    alpha: f64,
    blend: BlendMode,
    blur: f64,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: DAffine2::IDENTITY,
            alpha: 1.0,
            blend: BlendMode::Normal,
            blur: 0.0,
        }
    }
}

/// A CPU raster surface.
#[derive(Debug, Clone)]
pub struct Raster {
    buffer: PixelBuffer,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Raster {
    /// Creates a transparent surface.
    ///
    /// Returns `EngineError::InvalidDimensions` for zero or overflowing sizes.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Ok(Self {
            buffer: PixelBuffer::new(width, height)?,
            state: DrawState::default(),
            stack: Vec::new(),
        })
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    /// Rasterizes a `width` x `height` box at `(x, y)` in local space.
    ///
    /// `shade(u, v)` returns the color and coverage at normalized box
    /// coordinates, or `None` where nothing is drawn.
    fn rasterize(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        shade: impl Fn(f64, f64) -> Option<(Srgb, f64)>,
    ) {
        if width <= 0.0 || height <= 0.0 || self.state.alpha <= 0.0 {
            return;
        }
        let transform = self.state.transform;
        if transform.matrix2.determinant().abs() < 1e-12 {
            return;
        }
        let inverse = transform.inverse();
        let corners = [
            DVec2::new(x, y),
            DVec2::new(x + width, y),
            DVec2::new(x, y + height),
            DVec2::new(x + width, y + height),
        ]
        .map(|p| transform.transform_point2(p));
        let min = corners.iter().fold(DVec2::splat(f64::INFINITY), |a, c| a.min(*c));
        let max = corners.iter().fold(DVec2::splat(f64::NEG_INFINITY), |a, c| a.max(*c));

        let blur = self.state.blur;
        let pad = if blur >= MIN_BLUR_RADIUS { blur.ceil() } else { 0.0 };
        let x0 = (min.x - pad).floor().max(0.0) as usize;
        let y0 = (min.y - pad).floor().max(0.0) as usize;
        let x1 = ((max.x + pad).ceil().max(0.0) as usize).min(self.buffer.width());
        let y1 = ((max.y + pad).ceil().max(0.0) as usize).min(self.buffer.height());
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let sample = |px: usize, py: usize| {
            let local = inverse.transform_point2(DVec2::new(px as f64 + 0.5, py as f64 + 0.5));
            shade((local.x - x) / width, (local.y - y) / height)
        };

        if pad > 0.0 {
            let (w, h) = (x1 - x0, y1 - y0);
            let Ok(mut layer) = PixelBuffer::new(w, h) else {
                return;
            };
            for ly in 0..h {
                for lx in 0..w {
                    if let Some((color, coverage)) = sample(x0 + lx, y0 + ly) {
                        layer.set(lx, ly, Rgba::new(color, coverage));
                    }
                }
            }
            layer.box_blur(blur.round() as usize);
            self.buffer.composite_at(
                &layer,
                x0 as isize,
                y0 as isize,
                self.state.blend,
                self.state.alpha,
            );
        } else {
            for py in y0..y1 {
                for px in x0..x1 {
                    if let Some((color, coverage)) = sample(px, py) {
                        self.buffer.blend_pixel(
                            px,
                            py,
                            color,
                            coverage * self.state.alpha,
                            self.state.blend,
                        );
                    }
                }
            }
        }
    }
}

impl Surface for Raster {
    fn width(&self) -> usize {
        self.buffer.width()
    }

    fn height(&self) -> usize {
        self.buffer.height()
    }

    fn clear(&mut self, color: Option<Srgb>) {
        self.buffer
            .fill(color.map(Rgba::opaque).unwrap_or(Rgba::TRANSPARENT));
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.state.transform = self.state.transform * DAffine2::from_translation(DVec2::new(x, y));
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform = self.state.transform * DAffine2::from_angle(radians);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn set_blur(&mut self, radius: f64) {
        self.state.blur = radius.max(0.0);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint) {
        self.rasterize(x, y, width, height, |u, v| {
            ((0.0..1.0).contains(&u) && (0.0..1.0).contains(&v)).then(|| (paint.color_at(u, v), 1.0))
        });
    }

    fn draw_sprite(
        &mut self,
        sprite: &SpriteImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: &Paint,
    ) {
        self.rasterize(x, y, width, height, |u, v| {
            let coverage = sprite.sample(u, v);
            (coverage > 0.0).then(|| (paint.color_at(u, v), coverage))
        });
    }

    fn stroke_sprite(
        &mut self,
        sprite: &SpriteImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Srgb,
        line_width: f64,
    ) {
        let stroke = line_width / width.min(height).max(1e-9);
        self.rasterize(x, y, width, height, |u, v| {
            let coverage = sprite.outline(u, v, stroke);
            (coverage > 0.0).then_some((color, coverage))
        });
    }

    fn snapshot(&self) -> PixelBuffer {
        self.buffer.clone()
    }

    fn composite(&mut self, layer: &PixelBuffer, mode: BlendMode, alpha: f64) {
        if let Err(e) = self.buffer.composite(layer, mode, alpha) {
            tracing::warn!(error = %e, "skipping composite");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_square() -> SpriteImage {
        SpriteImage::from_fn(8, |_, _| 1.0)
    }

    #[test]
    fn new_rejects_zero_size() {
        assert!(Raster::new(0, 4).is_err());
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut r = Raster::new(4, 4).unwrap();
        r.clear(Some(Srgb::WHITE));
        assert!(r.buffer().data().iter().all(|p| p.a == 1.0 && p.r == 1.0));
        r.clear(None);
        assert!(r.buffer().data().iter().all(|p| p.a == 0.0));
    }

    #[test]
    fn fill_rect_covers_only_its_box() {
        let mut r = Raster::new(8, 8).unwrap();
        r.fill_rect(2.0, 2.0, 3.0, 3.0, &Paint::Solid(Srgb::WHITE));
        assert_eq!(r.buffer().get(3, 3).unwrap().a, 1.0);
        assert_eq!(r.buffer().get(0, 0).unwrap().a, 0.0);
        assert_eq!(r.buffer().get(6, 6).unwrap().a, 0.0);
    }

    #[test]
    fn translate_moves_drawing() {
        let mut r = Raster::new(8, 8).unwrap();
        r.translate(4.0, 4.0);
        r.draw_sprite(&full_square(), -1.0, -1.0, 2.0, 2.0, &Paint::Solid(Srgb::WHITE));
        assert_eq!(r.buffer().get(4, 4).unwrap().a, 1.0);
        assert_eq!(r.buffer().get(1, 1).unwrap().a, 0.0);
    }

    #[test]
    fn save_restore_round_trips_state() {
        let mut r = Raster::new(8, 8).unwrap();
        r.save();
        r.translate(3.0, 0.0);
        r.set_global_alpha(0.2);
        r.restore();
        r.fill_rect(0.0, 0.0, 1.0, 1.0, &Paint::Solid(Srgb::WHITE));
        assert_eq!(r.buffer().get(0, 0).unwrap().a, 1.0);
    }

    #[test]
    fn rotation_keeps_center_pixel() {
        let mut r = Raster::new(16, 16).unwrap();
        r.translate(8.0, 8.0);
        r.rotate(std::f64::consts::FRAC_PI_4);
        r.draw_sprite(&full_square(), -3.0, -3.0, 6.0, 6.0, &Paint::Solid(Srgb::WHITE));
        assert_eq!(r.buffer().get(8, 8).unwrap().a, 1.0);
        // Rotated by 45 degrees the square reaches past its half-size along x.
        assert!(r.buffer().get(11, 8).unwrap().a > 0.0);
    }

    #[test]
    fn global_alpha_scales_coverage() {
        let mut r = Raster::new(4, 4).unwrap();
        r.set_global_alpha(0.5);
        r.fill_rect(0.0, 0.0, 4.0, 4.0, &Paint::Solid(Srgb::WHITE));
        assert!((r.buffer().get(1, 1).unwrap().a - 0.5).abs() < 1e-9);
    }

    #[test]
    fn blur_spreads_beyond_the_shape() {
        let mut r = Raster::new(16, 16).unwrap();
        r.set_blur(2.0);
        r.fill_rect(6.0, 6.0, 4.0, 4.0, &Paint::Solid(Srgb::WHITE));
        assert!(r.buffer().get(5, 8).unwrap().a > 0.0);
        assert!(r.buffer().get(8, 8).unwrap().a < 1.0 + 1e-12);
    }

    #[test]
    fn stroke_leaves_interior_empty() {
        let mut r = Raster::new(32, 32).unwrap();
        let disc = SpriteImage::from_fn(64, |u, v| {
            if (u - 0.5).hypot(v - 0.5) < 0.45 {
                1.0
            } else {
                0.0
            }
        });
        r.stroke_sprite(&disc, 0.0, 0.0, 32.0, 32.0, Srgb::WHITE, 2.0);
        assert_eq!(r.buffer().get(16, 16).unwrap().a, 0.0);
        assert!(r.buffer().get(16, 2).unwrap().a > 0.0);
    }

    #[test]
    fn composite_with_wrong_size_is_ignored() {
        let mut r = Raster::new(4, 4).unwrap();
        let other = PixelBuffer::filled(2, 2, Rgba::opaque(Srgb::WHITE)).unwrap();
        r.composite(&other, BlendMode::Normal, 1.0);
        assert!(r.buffer().data().iter().all(|p| p.a == 0.0));
    }
}
