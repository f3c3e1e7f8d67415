//! Full composition and recoloring.

use spritefield_core::canvas::BlendMode;
use spritefield_core::color::{hsl_to_srgb, jitter_color, shift_hue, srgb_to_hsl, Hsl, Srgb};
use spritefield_core::palette::Palette;
use spritefield_core::prng::Mulberry32;
use spritefield_core::seed::{state_stream, StreamPurpose};
use spritefield_core::sprite::{SpriteCatalog, SpriteSource};
use spritefield_core::state::{BackgroundMode, GeneratorState};
use spritefield_motion::Movement;

use crate::layout::{
    grid_positions, layer_enabled, tile_count, ScaleRange, LAYER_BASE_SIZES, LAYER_COUNT,
    LAYER_OPACITIES,
};
use crate::prepared::{PreparedBackground, PreparedLayer, PreparedSprite, PreparedTile};
use crate::thumbnail::thumbnail_layer;

/// Spin speed in degrees per second at 100% rotation speed.
pub const ROTATION_DEGREES_PER_SECOND: f64 = 90.0;

/// Chance that an auto-blended tile overrides its layer's blend mode.
const TILE_BLEND_CHANCE: f64 = 0.35;

/// Saturation of the custom background color, in percent.
const CUSTOM_BACKGROUND_SATURATION: f64 = 45.0;

/// Builds prepared sprites from generator states.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    catalog: SpriteCatalog,
}

/// The seed streams a composition draws from, created once per compute.
struct Streams {
    base: Mulberry32,
    color: Mulberry32,
    position: Mulberry32,
    sprite: Mulberry32,
    blend: Mulberry32,
    gradient: Mulberry32,
}

impl Streams {
    fn new(state: &GeneratorState) -> Self {
        Self {
            base: state_stream(state, StreamPurpose::Base),
            color: state_stream(state, StreamPurpose::Color),
            position: state_stream(state, StreamPurpose::Position),
            sprite: state_stream(state, StreamPurpose::Sprite),
            blend: state_stream(state, StreamPurpose::Blend),
            gradient: state_stream(state, StreamPurpose::Gradient),
        }
    }
}

impl Composer {
    pub fn new(catalog: SpriteCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SpriteCatalog {
        &self.catalog
    }

    /// Generates the full layered tile list for `state`.
    ///
    /// `palette_override` replaces the state's palette, e.g. with an
    /// interpolated palette while cycling or transitioning.
    pub fn compute(
        &self,
        state: &GeneratorState,
        palette_override: Option<&[Srgb]>,
    ) -> PreparedSprite {
        let mut streams = Streams::new(state);
        let palette = jittered_palette(
            state,
            base_palette(state, palette_override),
            &mut streams.color,
        );
        let background = self.resolve_background(state, 0.0);
        let scale = ScaleRange::from_state(state);

        let mut layers: Vec<PreparedLayer> = (0..LAYER_COUNT)
            .map(|index| self.compose_layer(state, index, &palette, &scale, &mut streams))
            .collect();

        if state.thumbnail_mode {
            let sources = (0..=state.thumbnail_secondary_count as usize)
                .filter_map(|_| self.pick_sprite(state, &mut streams.sprite));
            layers[0] = thumbnail_layer(state, &palette, &scale, sources, &mut streams.base);
        }

        let prepared = PreparedSprite { layers, background };
        tracing::debug!(
            seed = %state.seed,
            tiles = prepared.tile_count(),
            "composed prepared sprite"
        );
        prepared
    }

    /// Re-tints `prepared` for `state` without moving any tile.
    pub fn recolor(
        &self,
        prepared: &PreparedSprite,
        state: &GeneratorState,
        palette_override: Option<&[Srgb]>,
    ) -> PreparedSprite {
        let palette = self.resolve_palette(state, palette_override);
        let accent = crate::thumbnail::accent_color(state, &palette);
        let layers = prepared
            .layers
            .iter()
            .map(|layer| PreparedLayer {
                tiles: layer
                    .tiles
                    .iter()
                    .map(|tile| PreparedTile {
                        tint: if tile.is_accent {
                            accent
                        } else {
                            palette[tile.palette_color_index % palette.len()]
                        },
                        gradient_tint: palette[tile.gradient_color_index % palette.len()],
                        ..tile.clone()
                    })
                    .collect(),
                ..layer.clone()
            })
            .collect();
        tracing::debug!("recolored prepared sprite");
        PreparedSprite {
            layers,
            background: self.resolve_background(state, 0.0),
        }
    }

    /// The hue-shifted, jittered palette `compute` would use.
    pub fn resolve_palette(
        &self,
        state: &GeneratorState,
        palette_override: Option<&[Srgb]>,
    ) -> Vec<Srgb> {
        let mut rng = state_stream(state, StreamPurpose::Color);
        jittered_palette(state, base_palette(state, palette_override), &mut rng)
    }

    /// The background color for `state`, with an extra hue rotation of
    /// `hue_offset` degrees.
    pub fn resolve_background(
        &self,
        state: &GeneratorState,
        hue_offset: f64,
    ) -> PreparedBackground {
        let source = match state.background_mode {
            BackgroundMode::Transparent => return PreparedBackground { color: None },
            BackgroundMode::Custom => {
                let color = hsl_to_srgb(Hsl {
                    h: state.background_hue,
                    s: CUSTOM_BACKGROUND_SATURATION,
                    l: state.background_brightness,
                });
                return PreparedBackground {
                    color: Some(shift_hue(color, hue_offset)),
                };
            }
            BackgroundMode::Auto => Palette::resolve(&state.palette_id),
            BackgroundMode::Palette => Palette::resolve(&state.background_palette_id),
        };
        let mut rng = state_stream(state, StreamPurpose::Background);
        let picked = source.color(rng.next_usize(source.len()));
        let shifted = shift_hue(picked, state.hue_shift + hue_offset);
        let hsl = srgb_to_hsl(shifted);
        let color = hsl_to_srgb(Hsl {
            l: (hsl.l * state.background_brightness / 50.0).clamp(0.0, 100.0),
            ..hsl
        });
        PreparedBackground { color: Some(color) }
    }

    /// Draws a sprite id from the selection and resolves it.
    ///
    /// Returns `None` for an empty selection.
    fn pick_sprite(&self, state: &GeneratorState, rng: &mut Mulberry32) -> Option<SpriteSource> {
        if state.selected_sprites.is_empty() {
            return None;
        }
        let requested = &state.selected_sprites[rng.next_usize(state.selected_sprites.len())];
        Some(
            self.catalog
                .resolve(requested, &state.selected_sprites, &state.sprite_collection),
        )
    }

    fn compose_layer(
        &self,
        state: &GeneratorState,
        index: usize,
        palette: &[Srgb],
        scale: &ScaleRange,
        streams: &mut Streams,
    ) -> PreparedLayer {
        let layer_blend = if state.blend_auto {
            Some(BlendMode::ALL[streams.blend.next_usize(BlendMode::ALL.len())])
        } else {
            None
        };
        let mut layer = PreparedLayer {
            tiles: Vec::new(),
            tile_count: 0,
            blend_mode: layer_blend,
            opacity: LAYER_OPACITIES[index],
            base_size_ratio: LAYER_BASE_SIZES[index],
        };
        if !layer_enabled(state, index) || state.selected_sprites.is_empty() {
            return layer;
        }

        let count = tile_count(state, index);
        let positions = grid_positions(state, count, &mut streams.position);
        let mode = state.motion_mode;
        for (u, v) in positions {
            let Some(source) = self.pick_sprite(state, &mut streams.sprite) else {
                break;
            };
            let tile = self.compose_tile(
                state,
                source,
                (u, v),
                palette,
                scale,
                mode.sprite_scale_multiplier(),
                streams,
            );
            layer.tiles.push(tile);
        }
        layer.tile_count = layer.tiles.len();
        layer
    }

    #[allow(clippy::too_many_arguments)]
    fn compose_tile(
        &self,
        state: &GeneratorState,
        source: SpriteSource,
        (u, v): (f64, f64),
        palette: &[Srgb],
        scale: &ScaleRange,
        scale_multiplier: f64,
        streams: &mut Streams,
    ) -> PreparedTile {
        let scale = scale.at(streams.position.next_f64()) * scale_multiplier;

        let base = &mut streams.base;
        let rotation_base_multiplier = base.next_range(-1.0, 1.0);
        let rotation_direction = base.next_sign();
        let rotation_speed_multiplier = base.next_range(0.5, 1.5);
        let animation_time_multiplier = base.next_range(0.75, 1.25);
        let phase = base.next_f64();
        let outline_roll = base.next_f64();

        let palette_color_index = streams.color.next_usize(palette.len());

        let blend_roll = streams.blend.next_f64();
        let blend_pick = streams.blend.next_usize(BlendMode::ALL.len());
        let blend_mode =
            (state.blend_auto && blend_roll < TILE_BLEND_CHANCE).then_some(BlendMode::ALL[blend_pick]);

        let gradient_pick = streams.gradient.next_usize(palette.len());
        let angle_pick = streams.gradient.next_range(0.0, 360.0);
        let gradient_color_index = if state.gradient_randomize_colors {
            gradient_pick
        } else {
            (palette_color_index + 1) % palette.len()
        };
        let gradient_angle = if state.gradient_randomize_direction {
            angle_pick
        } else {
            state.gradient_direction
        };

        let is_outlined = state.outline_enabled
            && (!state.outline_mixed || outline_roll < state.outline_balance / 100.0);

        let rotation_base = if state.rotation_enabled {
            rotation_base_multiplier * state.rotation_amount
        } else {
            0.0
        };

        PreparedTile {
            sprite: source.id().to_string(),
            sprite_source: source,
            tint: palette[palette_color_index],
            palette_color_index,
            gradient_tint: palette[gradient_color_index],
            gradient_color_index,
            gradient_angle,
            u,
            v,
            scale,
            phase,
            blend_mode,
            rotation_base,
            rotation_direction,
            rotation_speed: rotation_speed_multiplier * state.rotation_speed / 100.0
                * ROTATION_DEGREES_PER_SECOND,
            rotation_base_multiplier,
            rotation_speed_multiplier,
            animation_time_multiplier,
            is_outlined,
            is_accent: false,
        }
    }
}

/// The override palette if usable, otherwise the state's palette.
fn base_palette<'a>(state: &GeneratorState, palette_override: Option<&'a [Srgb]>) -> &'a [Srgb] {
    match palette_override {
        Some(colors) if !colors.is_empty() => colors,
        _ => Palette::resolve(&state.palette_id).colors(),
    }
}

/// Hue-shifts then jitters every color with the color stream.
fn jittered_palette(state: &GeneratorState, colors: &[Srgb], rng: &mut Mulberry32) -> Vec<Srgb> {
    let variance = state.variance_fraction();
    colors
        .iter()
        .map(|&c| jitter_color(shift_hue(c, state.hue_shift), variance, rng))
        .collect()
}
