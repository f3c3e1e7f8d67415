//! The composer's output types.
//!
//! These are plain values. A `PreparedSprite` is rebuilt wholesale on every
//! recompute or recolor and never patched in place; the controller holds it
//! behind an `Rc` and uses pointer identity to tell whether it changed.

use serde::Serialize;
use spritefield_core::canvas::BlendMode;
use spritefield_core::color::Srgb;
use spritefield_core::sprite::SpriteSource;

/// A complete composition: layers back to front plus the background.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedSprite {
    pub layers: Vec<PreparedLayer>,
    pub background: PreparedBackground,
}

impl PreparedSprite {
    /// Total number of tiles across all layers.
    pub fn tile_count(&self) -> usize {
        self.layers.iter().map(|l| l.tile_count).sum()
    }

    /// Iterates `(layer_index, layer, tile)` back to front.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, &PreparedLayer, &PreparedTile)> + '_ {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(i, layer)| layer.tiles.iter().map(move |t| (i, layer, t)))
    }
}

/// Background fill; `None` leaves the surface transparent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreparedBackground {
    pub color: Option<Srgb>,
}

/// One depth layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedLayer {
    pub tiles: Vec<PreparedTile>,
    pub tile_count: usize,
    /// Layer-wide blend assigned by auto blend; `None` uses the state's mode.
    pub blend_mode: Option<BlendMode>,
    pub opacity: f64,
    /// Tile size of this layer relative to the front-most size.
    pub base_size_ratio: f64,
}

/// One sprite instance.
///
/// Kinetic values (rotation, animation speed, outline share) are stored as
/// random multipliers so the frame loop can re-derive them from the live
/// state without regenerating the layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedTile {
    /// Sprite id to draw.
    pub sprite: String,
    pub sprite_source: SpriteSource,
    pub tint: Srgb,
    pub palette_color_index: usize,
    /// Second gradient stop.
    pub gradient_tint: Srgb,
    pub gradient_color_index: usize,
    /// Gradient angle in degrees.
    pub gradient_angle: f64,
    /// Horizontal position in [0, 1].
    pub u: f64,
    /// Vertical position in [0, 1].
    pub v: f64,
    /// Size relative to the layer's base size.
    pub scale: f64,
    /// Motion phase in [0, 1).
    pub phase: f64,
    /// Per-tile blend from auto blend; `None` inherits the layer's.
    pub blend_mode: Option<BlendMode>,
    /// Static rotation in degrees at composition time.
    pub rotation_base: f64,
    /// +1 or -1.
    pub rotation_direction: f64,
    /// Spin speed in degrees per second at composition time.
    pub rotation_speed: f64,
    /// In [-1, 1]; static rotation is this times the rotation amount.
    pub rotation_base_multiplier: f64,
    pub rotation_speed_multiplier: f64,
    pub animation_time_multiplier: f64,
    pub is_outlined: bool,
    /// Thumbnail primary tile, tinted with the theme accent.
    pub is_accent: bool,
}
