//! Blend modes and paints used by draw calls.
//!
//! [`BlendMode`] carries the per-channel separable blend formulas so every
//! surface implementation composites the same way. [`Paint`] describes how
//! a sprite's coverage is filled: a flat tint or a two-stop linear gradient.

use serde::{Deserialize, Serialize};

use crate::color::{mix, Srgb};

/// Blend mode used when compositing a tile (or a post-effect layer) onto
/// what is already on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    Difference,
    SoftLight,
}

impl BlendMode {
    /// All blend modes, in a stable order.
    pub const ALL: [BlendMode; 9] = [
        BlendMode::Normal,
        BlendMode::Additive,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::Difference,
        BlendMode::SoftLight,
    ];

    /// Blends one channel of `source` over `backdrop` (both in [0, 1]).
    pub fn blend_channel(self, backdrop: f64, source: f64) -> f64 {
        let d = backdrop;
        let s = source;
        let out = match self {
            BlendMode::Normal => s,
            BlendMode::Additive => s + d,
            BlendMode::Multiply => s * d,
            BlendMode::Screen => s + d - s * d,
            BlendMode::Overlay => {
                if d <= 0.5 {
                    2.0 * s * d
                } else {
                    1.0 - 2.0 * (1.0 - s) * (1.0 - d)
                }
            }
            BlendMode::Darken => s.min(d),
            BlendMode::Lighten => s.max(d),
            BlendMode::Difference => (s - d).abs(),
            BlendMode::SoftLight => {
                if s <= 0.5 {
                    d - (1.0 - 2.0 * s) * d * (1.0 - d)
                } else {
                    let g = if d <= 0.25 {
                        ((16.0 * d - 12.0) * d + 4.0) * d
                    } else {
                        d.sqrt()
                    };
                    d + (2.0 * s - 1.0) * (g - d)
                }
            }
        };
        out.clamp(0.0, 1.0)
    }

    /// Blends a whole color.
    pub fn blend(self, backdrop: Srgb, source: Srgb) -> Srgb {
        Srgb {
            r: self.blend_channel(backdrop.r, source.r),
            g: self.blend_channel(backdrop.g, source.g),
            b: self.blend_channel(backdrop.b, source.b),
        }
    }
}

/// How a shape's coverage is colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// A single flat color.
    Solid(Srgb),
    /// A two-stop gradient across the shape's local box, along `angle`
    /// degrees (0 = left to right, 90 = top to bottom).
    Linear { from: Srgb, to: Srgb, angle: f64 },
}

impl Paint {
    /// Color at normalized local coordinates `(u, v)` in [0, 1].
    pub fn color_at(&self, u: f64, v: f64) -> Srgb {
        match *self {
            Paint::Solid(c) => c,
            Paint::Linear { from, to, angle } => {
                let (sin, cos) = angle.to_radians().sin_cos();
                // Project onto the direction; the box corners map to at most
                // ±(|cos| + |sin|)/2 from the center.
                let extent = (cos.abs() + sin.abs()).max(1e-9) / 2.0;
                let t = ((u - 0.5) * cos + (v - 0.5) * sin) / (2.0 * extent) + 0.5;
                mix(from, to, t)
            }
        }
    }
}
