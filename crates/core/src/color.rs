//! Color types and the HSL color pipeline.
//!
//! Colors travel through the engine as [`Srgb`] (serialized as `"#rrggbb"`)
//! and are manipulated in [`Hsl`] space: hue shift, seeded jitter,
//! saturation/brightness/contrast adjustment and palette interpolation.
//! Every function here is pure; randomness is injected as a [`Mulberry32`].

use crate::error::EngineError;
use crate::prng::Mulberry32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Saturation (in percent) below which a color is treated as achromatic.
const ACHROMATIC_SATURATION: f64 = 1e-6;

/// Maximum internal jitter variance (the UI exposes 0–150%).
pub const MAX_VARIANCE: f64 = 1.5;

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`. The hex round-trip has 8-bit
/// quantization, which is acceptable since hex colors are inherently 8-bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// HSL color: hue in degrees [0, 360), saturation and lightness in percent [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Srgb = Srgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `EngineError::InvalidColor` if the input is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got {:?}",
                hex
            )));
        }
        let r = u8::from_str_radix(&hex[0..2], 16)
            .map_err(|e| EngineError::InvalidColor(format!("invalid red component: {e}")))?;
        let g = u8::from_str_radix(&hex[2..4], 16)
            .map_err(|e| EngineError::InvalidColor(format!("invalid green component: {e}")))?;
        let b = u8::from_str_radix(&hex[4..6], 16)
            .map_err(|e| EngineError::InvalidColor(format!("invalid blue component: {e}")))?;
        Ok(Srgb {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        })
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    ///
    /// Components are quantized to 8-bit (0–255) with rounding.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to 8-bit channels.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// Rec. 709 relative luminance of the gamma-encoded components.
    pub fn luminance(self) -> f64 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Converts sRGB to HSL.
pub fn srgb_to_hsl(c: Srgb) -> Hsl {
    let r = c.r.clamp(0.0, 1.0);
    let g = c.g.clamp(0.0, 1.0);
    let b = c.b.clamp(0.0, 1.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d < 1e-12 {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: l * 100.0,
        };
    }
    let s = d / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / d + 2.0)
    } else {
        60.0 * ((r - g) / d + 4.0)
    };
    Hsl {
        h: normalize_hue(h),
        s: (s * 100.0).clamp(0.0, 100.0),
        l: l * 100.0,
    }
}

/// Converts HSL to sRGB. Saturation and lightness are clamped to [0, 100].
pub fn hsl_to_srgb(c: Hsl) -> Srgb {
    let s = c.s.clamp(0.0, 100.0) / 100.0;
    let l = c.l.clamp(0.0, 100.0) / 100.0;
    let h = normalize_hue(c.h);
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - chroma / 2.0;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    Srgb {
        r: (r + m).clamp(0.0, 1.0),
        g: (g + m).clamp(0.0, 1.0),
        b: (b + m).clamp(0.0, 1.0),
    }
}

/// Parses a hex string straight into HSL.
pub fn hex_to_hsl(hex: &str) -> Result<Hsl, EngineError> {
    Srgb::from_hex(hex).map(srgb_to_hsl)
}

/// Formats an HSL color as `"#rrggbb"`.
pub fn hsl_to_hex(c: Hsl) -> String {
    hsl_to_srgb(c).to_hex()
}

/// Rotates the hue by `degrees`, wrapping modulo 360.
///
/// Achromatic colors (black, white, grays) are returned unchanged: their hue
/// is undefined and rotating it would inject a color cast after rounding.
pub fn shift_hue(c: Srgb, degrees: f64) -> Srgb {
    let hsl = srgb_to_hsl(c);
    if hsl.s < ACHROMATIC_SATURATION || degrees == 0.0 {
        return c;
    }
    hsl_to_srgb(Hsl {
        h: normalize_hue(hsl.h + degrees),
        ..hsl
    })
}

/// Randomly perturbs hue (±variance·60°), saturation (±variance·50) and
/// lightness (±variance·40).
///
/// `variance` is clamped to [0, 1.5]. Exactly three values are drawn from
/// `rng` regardless of variance, so streams stay aligned across settings.
pub fn jitter_color(c: Srgb, variance: f64, rng: &mut Mulberry32) -> Srgb {
    let variance = if variance.is_nan() {
        0.0
    } else {
        variance.clamp(0.0, MAX_VARIANCE)
    };
    let dh = rng.next_range(-1.0, 1.0) * variance * 60.0;
    let ds = rng.next_range(-1.0, 1.0) * variance * 50.0;
    let dl = rng.next_range(-1.0, 1.0) * variance * 40.0;
    if variance == 0.0 {
        return c;
    }
    let hsl = srgb_to_hsl(c);
    hsl_to_srgb(Hsl {
        h: normalize_hue(hsl.h + dh),
        s: (hsl.s + ds).clamp(0.0, 100.0),
        l: (hsl.l + dl).clamp(0.0, 100.0),
    })
}

/// Applies contrast, then saturation, then brightness (all in percent, 100 = no-op).
///
/// Contrast pushes lightness away from the 50% midpoint, saturation scales S
/// and brightness scales L. The order is part of the look: brightening after
/// contrast gives a different result from the reverse.
pub fn apply_color_adjustments(c: Srgb, saturation: f64, brightness: f64, contrast: f64) -> Srgb {
    if saturation == 100.0 && brightness == 100.0 && contrast == 100.0 {
        return c;
    }
    let hsl = srgb_to_hsl(c);
    let l = (50.0 + (hsl.l - 50.0) * contrast / 100.0).clamp(0.0, 100.0);
    let s = (hsl.s * saturation / 100.0).clamp(0.0, 100.0);
    let l = (l * brightness / 100.0).clamp(0.0, 100.0);
    hsl_to_srgb(Hsl { h: hsl.h, s, l })
}

/// Interpolates two colors in HSL with shortest-arc hue.
///
/// When one endpoint is achromatic its hue is meaningless, so the other
/// endpoint's hue is used for the whole path.
pub fn interpolate_hsl(a: Srgb, b: Srgb, t: f64) -> Srgb {
    let ha = srgb_to_hsl(a);
    let hb = srgb_to_hsl(b);
    let (h0, h1) = match (ha.s < ACHROMATIC_SATURATION, hb.s < ACHROMATIC_SATURATION) {
        (true, false) => (hb.h, hb.h),
        (false, true) => (ha.h, ha.h),
        _ => (ha.h, hb.h),
    };
    hsl_to_srgb(Hsl {
        h: interpolate_hue(h0, h1, t),
        s: ha.s + t * (hb.s - ha.s),
        l: ha.l + t * (hb.l - ha.l),
    })
}

/// Interpolates two palettes index by index.
///
/// The shorter palette is padded by index wraparound so palettes of
/// different sizes can still blend; the result has the longer length.
/// `t` is clamped to [0, 1] and the endpoints return the (padded) inputs
/// exactly.
pub fn interpolate_palette_colors(a: &[Srgb], b: &[Srgb], t: f64) -> Vec<Srgb> {
    if a.is_empty() {
        return b.to_vec();
    }
    if b.is_empty() {
        return a.to_vec();
    }
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let n = a.len().max(b.len());
    (0..n)
        .map(|i| {
            let ca = a[i % a.len()];
            let cb = b[i % b.len()];
            if t <= 0.0 {
                ca
            } else if t >= 1.0 {
                cb
            } else {
                interpolate_hsl(ca, cb, t)
            }
        })
        .collect()
}

/// Straight RGB linear interpolation.
pub fn mix(a: Srgb, b: Srgb, t: f64) -> Srgb {
    let t = t.clamp(0.0, 1.0);
    Srgb {
        r: a.r + (b.r - a.r) * t,
        g: a.g + (b.g - a.g) * t,
        b: a.b + (b.b - a.b) * t,
    }
}

/// Interpolates hue using shortest-arc logic, handling wraparound at 360.
pub fn interpolate_hue(h0: f64, h1: f64, t: f64) -> f64 {
    let delta = match h1 - h0 {
        d if d > 180.0 => d - 360.0,
        d if d < -180.0 => d + 360.0,
        d => d,
    };
    normalize_hue(h0 + t * delta)
}

/// Normalizes a hue angle to [0, 360).
pub fn normalize_hue(h: f64) -> f64 {
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
