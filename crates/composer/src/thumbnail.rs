//! Thumbnail mode: one centered accent tile ringed by secondary tiles.
//!
//! Used to render small preview icons from the same engine. Only the first
//! layer is replaced; deeper layers keep whatever the density produced.

use std::f64::consts::TAU;

use spritefield_core::canvas::BlendMode;
use spritefield_core::color::Srgb;
use spritefield_core::prng::Mulberry32;
use spritefield_core::sprite::SpriteSource;
use spritefield_core::state::GeneratorState;

use crate::layout::{ScaleRange, LAYER_BASE_SIZES};
use crate::prepared::{PreparedLayer, PreparedTile};

/// Distance of secondary tiles from the center, in normalized units.
const RING_RADIUS: f64 = 0.32;

/// Secondary tile size relative to the primary.
const SECONDARY_SCALE: f64 = 0.45;

/// Resolves the accent color, falling back to the first palette color.
pub(crate) fn accent_color(state: &GeneratorState, palette: &[Srgb]) -> Srgb {
    Srgb::from_hex(&state.thumbnail_accent).unwrap_or_else(|_| {
        tracing::debug!(accent = %state.thumbnail_accent, "invalid accent color, using palette");
        palette.first().copied().unwrap_or(Srgb::WHITE)
    })
}

/// Builds the replacement first layer.
///
/// `sources` yields the sprite for each tile in order (primary first); an
/// empty iterator leaves the layer empty.
pub(crate) fn thumbnail_layer(
    state: &GeneratorState,
    palette: &[Srgb],
    scale: &ScaleRange,
    mut sources: impl Iterator<Item = SpriteSource>,
    base_rng: &mut Mulberry32,
) -> PreparedLayer {
    let mut tiles = Vec::new();
    let Some(primary_source) = sources.next() else {
        return PreparedLayer {
            tiles,
            tile_count: 0,
            blend_mode: Some(BlendMode::Normal),
            opacity: 1.0,
            base_size_ratio: LAYER_BASE_SIZES[0],
        };
    };
    let accent = accent_color(state, palette);
    tiles.push(ring_tile(primary_source, accent, 0, 0.5, 0.5, scale.max, true));

    let count = state.thumbnail_secondary_count as usize;
    let start = base_rng.next_range(0.0, TAU);
    for k in 0..count {
        let Some(source) = sources.next() else {
            break;
        };
        let angle = start + k as f64 * TAU / count as f64;
        let index = k % palette.len().max(1);
        let tint = palette.get(index).copied().unwrap_or(accent);
        tiles.push(ring_tile(
            source,
            tint,
            index,
            0.5 + RING_RADIUS * angle.cos(),
            0.5 + RING_RADIUS * angle.sin(),
            scale.max * SECONDARY_SCALE,
            false,
        ));
    }

    PreparedLayer {
        tile_count: tiles.len(),
        tiles,
        blend_mode: Some(BlendMode::Normal),
        opacity: 1.0,
        base_size_ratio: LAYER_BASE_SIZES[0],
    }
}

fn ring_tile(
    source: SpriteSource,
    tint: Srgb,
    palette_color_index: usize,
    u: f64,
    v: f64,
    scale: f64,
    is_accent: bool,
) -> PreparedTile {
    PreparedTile {
        sprite: source.id().to_string(),
        sprite_source: source,
        tint,
        palette_color_index,
        gradient_tint: tint,
        gradient_color_index: palette_color_index,
        gradient_angle: 0.0,
        u,
        v,
        scale,
        phase: 0.0,
        blend_mode: Some(BlendMode::Normal),
        rotation_base: 0.0,
        rotation_direction: 1.0,
        rotation_speed: 0.0,
        rotation_base_multiplier: 0.0,
        rotation_speed_multiplier: 0.0,
        animation_time_multiplier: 1.0,
        is_outlined: false,
        is_accent,
    }
}
