//! Two-dimensional RGBA pixel buffer used for rasterization and post effects.
//!
//! A `PixelBuffer` stores `width * height` straight-alpha [`Rgba`] values in
//! row-major layout. It provides the pixel-level operations the post-effect
//! passes need: per-pixel blended compositing, threshold extraction and a
//! separable box blur.

use crate::canvas::BlendMode;
use crate::color::Srgb;
use crate::error::EngineError;

/// Straight (non-premultiplied) RGBA with all channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn opaque(c: Srgb) -> Self {
        Self::new(c, 1.0)
    }

    pub fn new(c: Srgb, a: f64) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn rgb(self) -> Srgb {
        Srgb::new(self.r, self.g, self.b)
    }
}

/// A 2D RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<Rgba>,
}

impl PixelBuffer {
    /// Creates a fully transparent buffer.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Creates a buffer filled with `value`.
    pub fn filled(width: usize, height: usize, value: Rgba) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Creates a buffer from pre-built data, validating the length.
    pub fn from_data(width: usize, height: usize, data: Vec<Rgba>) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let expected = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        if data.len() != expected {
            return Err(EngineError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[Rgba] {
        &self.data
    }

    /// Mutable access to the underlying row-major data.
    pub fn data_mut(&mut self) -> &mut [Rgba] {
        &mut self.data
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// Overwrites the pixel at `(x, y)`; out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: Rgba) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Fills every pixel with `value`.
    pub fn fill(&mut self, value: Rgba) {
        self.data.fill(value);
    }

    /// Composites `color` at coverage `alpha` onto pixel `(x, y)` using `mode`.
    ///
    /// Follows the separable blending model: the blended color is mixed with
    /// the source by the backdrop's alpha, then source-over composited.
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Srgb, alpha: f64, mode: BlendMode) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.data[idx] = composite_over(self.data[idx], color, alpha, mode);
    }

    /// Composites `layer` over this buffer, pixel for pixel.
    ///
    /// Returns `EngineError::DimensionMismatch` if the buffers differ in size.
    pub fn composite(
        &mut self,
        layer: &PixelBuffer,
        mode: BlendMode,
        alpha: f64,
    ) -> Result<(), EngineError> {
        if self.width != layer.width || self.height != layer.height {
            return Err(EngineError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: layer.width,
                rhs_h: layer.height,
            });
        }
        let alpha = alpha.clamp(0.0, 1.0);
        for (dst, src) in self.data.iter_mut().zip(&layer.data) {
            if src.a > 0.0 {
                *dst = composite_over(*dst, src.rgb(), src.a * alpha, mode);
            }
        }
        Ok(())
    }

    /// Composites `layer` with its top-left corner at `(x0, y0)`; pixels that
    /// fall outside this buffer are dropped.
    pub fn composite_at(
        &mut self,
        layer: &PixelBuffer,
        x0: isize,
        y0: isize,
        mode: BlendMode,
        alpha: f64,
    ) {
        for ly in 0..layer.height {
            let y = y0 + ly as isize;
            if y < 0 || y >= self.height as isize {
                continue;
            }
            for lx in 0..layer.width {
                let x = x0 + lx as isize;
                if x < 0 || x >= self.width as isize {
                    continue;
                }
                let src = layer.data[ly * layer.width + lx];
                if src.a > 0.0 {
                    self.blend_pixel(x as usize, y as usize, src.rgb(), src.a * alpha, mode);
                }
            }
        }
    }

    /// Returns a copy keeping only pixels whose luminance exceeds `cutoff`;
    /// everything else becomes transparent.
    pub fn threshold(&self, cutoff: f64) -> PixelBuffer {
        let data = self
            .data
            .iter()
            .map(|p| {
                if p.a > 0.0 && p.rgb().luminance() > cutoff {
                    *p
                } else {
                    Rgba::TRANSPARENT
                }
            })
            .collect();
        PixelBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Separable box blur using a sliding window. O(width*height) regardless
    /// of radius. Edges clamp (border pixels repeat). Blurs in premultiplied
    /// space so transparent pixels do not darken their neighbors.
    pub fn box_blur(&mut self, radius: usize) {
        if radius == 0 {
            return;
        }
        let mut premul: Vec<[f64; 4]> = self
            .data
            .iter()
            .map(|p| [p.r * p.a, p.g * p.a, p.b * p.a, p.a])
            .collect();
        let w = self.width;
        let h = self.height;
        let mut temp = vec![[0.0; 4]; premul.len()];
        blur_lines(&premul, &mut temp, h, w, radius, |line, i| line * w + i);
        blur_lines(&temp, &mut premul, w, h, radius, |line, i| i * w + line);
        for (dst, p) in self.data.iter_mut().zip(premul) {
            *dst = if p[3] > 1e-12 {
                Rgba {
                    r: (p[0] / p[3]).clamp(0.0, 1.0),
                    g: (p[1] / p[3]).clamp(0.0, 1.0),
                    b: (p[2] / p[3]).clamp(0.0, 1.0),
                    a: p[3].clamp(0.0, 1.0),
                }
            } else {
                Rgba::TRANSPARENT
            };
        }
    }

    /// Converts to an RGBA8 byte buffer (`width * height * 4` bytes).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|p| {
                let [r, g, b] = p.rgb().to_rgb8();
                [r, g, b, (p.a.clamp(0.0, 1.0) * 255.0).round() as u8]
            })
            .collect()
    }
}

/// Runs a 1D sliding box filter over `lines` lines of `len` samples each.
/// `index(line, i)` maps to the flat buffer index.
fn blur_lines(
    src: &[[f64; 4]],
    dst: &mut [[f64; 4]],
    lines: usize,
    len: usize,
    radius: usize,
    index: impl Fn(usize, usize) -> usize,
) {
    let r = radius as isize;
    let last = len as isize - 1;
    let div = (2 * radius + 1) as f64;
    for line in 0..lines {
        let mut sum = [0.0; 4];
        for i in -r..=r {
            let p = src[index(line, i.clamp(0, last) as usize)];
            for c in 0..4 {
                sum[c] += p[c];
            }
        }
        for i in 0..len as isize {
            let out = &mut dst[index(line, i as usize)];
            for c in 0..4 {
                out[c] = sum[c] / div;
            }
            let leave = src[index(line, (i - r).clamp(0, last) as usize)];
            let enter = src[index(line, (i + r + 1).clamp(0, last) as usize)];
            for c in 0..4 {
                sum[c] += enter[c] - leave[c];
            }
        }
    }
}

/// Source-over compositing of `color` at `alpha` with a blend mode.
fn composite_over(backdrop: Rgba, color: Srgb, alpha: f64, mode: BlendMode) -> Rgba {
    let sa = alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return backdrop;
    }
    let ba = backdrop.a;
    let blended = mode.blend(backdrop.rgb(), color);
    // Where the backdrop is transparent the blend has nothing to act on.
    let src = crate::color::mix(color, blended, ba);
    let out_a = sa + ba * (1.0 - sa);
    let channel = |s: f64, b: f64| ((s * sa + b * ba * (1.0 - sa)) / out_a).clamp(0.0, 1.0);
    Rgba {
        r: channel(src.r, backdrop.r),
        g: channel(src.g, backdrop.g),
        b: channel(src.b, backdrop.b),
        a: out_a.clamp(0.0, 1.0),
    }
}
