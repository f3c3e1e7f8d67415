//! The drawing surface the frame loop issues commands against.
//!
//! The trait mirrors an immediate-mode 2D canvas: a transform/state stack,
//! global alpha, blend mode and blur filter, shape fills, and two
//! pixel-level hooks (`snapshot`/`composite`) for post effects. The trait is
//! object-safe so hosts can pass `&mut dyn Surface`.

use crate::canvas::{BlendMode, Paint};
use crate::color::Srgb;
use crate::pixels::PixelBuffer;
use crate::sprite::SpriteImage;

/// An immediate-mode 2D rendering surface.
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> usize;

    /// Surface height in pixels.
    fn height(&self) -> usize;

    /// Clears every pixel to transparent, or to `color` when given.
    fn clear(&mut self, color: Option<Srgb>);

    /// Pushes the current transform, alpha, blend mode and blur.
    fn save(&mut self);

    /// Pops the state pushed by the matching `save`.
    fn restore(&mut self);

    fn translate(&mut self, x: f64, y: f64);

    fn rotate(&mut self, radians: f64);

    fn set_global_alpha(&mut self, alpha: f64);

    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Blur radius in pixels applied to subsequent draws (0 = off).
    fn set_blur(&mut self, radius: f64);

    /// Fills an axis-aligned rectangle in the current transform.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint);

    /// Fills the sprite's coverage over the given rectangle.
    fn draw_sprite(
        &mut self,
        sprite: &SpriteImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: &Paint,
    );

    /// Strokes the sprite's outline with a line `line_width` pixels wide.
    #[allow(clippy::too_many_arguments)]
    fn stroke_sprite(
        &mut self,
        sprite: &SpriteImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Srgb,
        line_width: f64,
    );

    /// Copies the current pixels.
    fn snapshot(&self) -> PixelBuffer;

    /// Composites a full-surface layer over the current pixels.
    fn composite(&mut self, layer: &PixelBuffer, mode: BlendMode, alpha: f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal surface that only counts calls; verifies object safety.
    #[derive(Default)]
    struct CountingSurface {
        draws: usize,
        depth: usize,
    }

    impl Surface for CountingSurface {
        fn width(&self) -> usize {
            4
        }
        fn height(&self) -> usize {
            4
        }
        fn clear(&mut self, _color: Option<Srgb>) {}
        fn save(&mut self) {
            self.depth += 1;
        }
        fn restore(&mut self) {
            self.depth -= 1;
        }
        fn translate(&mut self, _x: f64, _y: f64) {}
        fn rotate(&mut self, _radians: f64) {}
        fn set_global_alpha(&mut self, _alpha: f64) {}
        fn set_blend_mode(&mut self, _mode: BlendMode) {}
        fn set_blur(&mut self, _radius: f64) {}
        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, _paint: &Paint) {
            self.draws += 1;
        }
        fn draw_sprite(
            &mut self,
            _sprite: &SpriteImage,
            _x: f64,
            _y: f64,
            _w: f64,
            _h: f64,
            _paint: &Paint,
        ) {
            self.draws += 1;
        }
        fn stroke_sprite(
            &mut self,
            _sprite: &SpriteImage,
            _x: f64,
            _y: f64,
            _w: f64,
            _h: f64,
            _color: Srgb,
            _line_width: f64,
        ) {
            self.draws += 1;
        }
        fn snapshot(&self) -> PixelBuffer {
            PixelBuffer::new(4, 4).unwrap()
        }
        fn composite(&mut self, _layer: &PixelBuffer, _mode: BlendMode, _alpha: f64) {}
    }

    #[test]
    fn surface_trait_is_object_safe() {
        let mut surface: Box<dyn Surface> = Box::<CountingSurface>::default();
        surface.fill_rect(0.0, 0.0, 1.0, 1.0, &Paint::Solid(Srgb::BLACK));
        assert_eq!(surface.width(), 4);
        assert_eq!(surface.snapshot().height(), 4);
    }

    #[test]
    fn dyn_surface_mut_reference_works() {
        let mut counting = CountingSurface::default();
        {
            let surface: &mut dyn Surface = &mut counting;
            surface.save();
            let sprite = SpriteImage::from_fn(2, |_, _| 1.0);
            surface.draw_sprite(&sprite, 0.0, 0.0, 1.0, 1.0, &Paint::Solid(Srgb::WHITE));
            surface.restore();
        }
        assert_eq!(counting.draws, 1);
        assert_eq!(counting.depth, 0);
    }
}
