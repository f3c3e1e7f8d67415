//! The frame controller.
//!
//! A [`Controller`] exclusively owns the current [`GeneratorState`] and the
//! [`PreparedSprite`] built from it. State changes go through narrow setters
//! (or [`Controller::apply_state`]); each one declares how much of the
//! prepared sprite it invalidates, and the controller swaps in a new `Rc`
//! only when something structural or tint-related changed. Everything else
//! is read live on the next [`Controller::tick`].

use std::rc::Rc;

use spritefield_composer::layout::MAX_SCALE;
use spritefield_composer::{Composer, PreparedSprite, PreparedTile};
use spritefield_core::canvas::{BlendMode, Paint};
use spritefield_core::color::{apply_color_adjustments, interpolate_palette_colors, shift_hue, Srgb};
use spritefield_core::palette::Palette;
use spritefield_core::prng::hash_seed;
use spritefield_core::sprite::AssetResolver;
use spritefield_core::state::{
    AspectRatio, BackgroundMode, FillMode, GeneratorState, MotionMode, RecomputeScope,
};
use spritefield_core::surface::Surface;
use spritefield_motion::{MotionInput, Movement};

use crate::clock::{AnimationClock, PaletteCycle, SpeedSmoother};
use crate::effects::{apply_bloom, apply_grain, depth_of_field_blur};
use crate::transition::{Transition, TransitionKind};

/// Longest frame delta the clocks will advance by, in seconds.
pub const MAX_FRAME_DELTA: f64 = 0.25;

/// Seconds between frame rate reports.
pub const FRAME_RATE_WINDOW: f64 = 1.0;

/// Front-layer tile edge at scale 1, as a share of the shorter canvas side.
const TILE_UNIT_FRACTION: f64 = 0.12;

/// Clock speed slider value that runs a clock at its nominal period.
const CLOCK_SPEED_REFERENCE: f64 = 50.0;

/// Spin speed in degrees per second at 100% rotation speed.
const SPIN_DEGREES_PER_SECOND: f64 = spritefield_composer::compose::ROTATION_DEGREES_PER_SECOND;

/// Whether [`Controller::tick`] does anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    /// Terminal; entered through [`Controller::shutdown`].
    Stopped,
}

/// What a tick drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    /// Tiles whose sprite was not loaded yet.
    pub skipped: usize,
}

/// Counts frames and reports the rate once per window.
#[derive(Debug, Clone, Copy, Default)]
struct FrameRateMeter {
    window_start: Option<f64>,
    frames: u32,
}

impl FrameRateMeter {
    fn record(&mut self, now: f64) -> Option<f64> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = now - start;
        if elapsed < FRAME_RATE_WINDOW {
            return None;
        }
        let fps = f64::from(self.frames) / elapsed;
        self.window_start = Some(now);
        self.frames = 0;
        Some(fps)
    }
}

type StateCallback = Box<dyn FnMut(&GeneratorState)>;
type FrameRateCallback = Box<dyn FnMut(f64)>;

/// Owns a composition and renders it frame by frame.
pub struct Controller {
    state: GeneratorState,
    prepared: Rc<PreparedSprite>,
    composer: Composer,
    sprite_hue: AnimationClock,
    canvas_hue: AnimationClock,
    palette_clock: AnimationClock,
    speed: SpeedSmoother,
    /// Motion clock in seconds, scaled by speed.
    motion_time: f64,
    /// Accumulated spin in degrees at 100% tile speed.
    spin: f64,
    transition: Option<Transition>,
    /// The transition still needs its start time from the next tick.
    transition_armed: bool,
    last_tick: Option<f64>,
    fps: FrameRateMeter,
    run_state: RunState,
    rerolls: u32,
    on_state_change: Option<StateCallback>,
    on_frame_rate: Option<FrameRateCallback>,
}

/// Setters for clamped numeric fields, forwarding to the state's own
/// clamping setter of the same name.
macro_rules! clamped_setters {
    ($($name:ident => $scope:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: f64) {
                self.mutate(RecomputeScope::$scope, |s| s.$name(value));
            }
        )*
    };
}

/// Setters that assign a field directly.
macro_rules! field_setters {
    ($($name:ident($field:ident: $ty:ty) => $scope:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) {
                self.mutate(RecomputeScope::$scope, |s| s.$field = value);
            }
        )*
    };
}

impl Controller {
    /// Creates a running controller with the built-in sprite catalog.
    pub fn new(state: GeneratorState) -> Self {
        Self::with_composer(state, Composer::default())
    }

    pub fn with_composer(mut state: GeneratorState, composer: Composer) -> Self {
        state.clamp_ranges();
        let prepared = Rc::new(composer.compute(&state, None));
        Self {
            speed: SpeedSmoother::new(state.motion_speed / 100.0),
            state,
            prepared,
            composer,
            sprite_hue: AnimationClock::sprite_hue(),
            canvas_hue: AnimationClock::canvas_hue(),
            palette_clock: AnimationClock::palette_cycle(),
            motion_time: 0.0,
            spin: 0.0,
            transition: None,
            transition_armed: false,
            last_tick: None,
            fps: FrameRateMeter::default(),
            run_state: RunState::Running,
            rerolls: 0,
            on_state_change: None,
            on_frame_rate: None,
        }
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    /// The current composition. Pointer identity changes only on recompute.
    pub fn prepared(&self) -> &Rc<PreparedSprite> {
        &self.prepared
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Called with the new state after every mutation.
    pub fn on_state_change(&mut self, callback: impl FnMut(&GeneratorState) + 'static) {
        self.on_state_change = Some(Box::new(callback));
    }

    /// Called with the measured frame rate once per second.
    pub fn on_frame_rate(&mut self, callback: impl FnMut(f64) + 'static) {
        self.on_frame_rate = Some(Box::new(callback));
    }

    /// Replaces the whole state.
    ///
    /// `Instant` and `Fade` swap the layout right away (a fade only dips
    /// the tile opacity); `Smooth` recomposes an interpolated state every
    /// frame until the transition ends. A smooth transition that interrupts
    /// another one starts from the blend currently on screen.
    pub fn apply_state(&mut self, state: GeneratorState, kind: TransitionKind) {
        let mut next = state;
        next.clamp_ranges();
        let displayed = self.displayed_blend();
        let scope = if displayed.is_some() {
            RecomputeScope::Full
        } else {
            GeneratorState::recompute_scope(&self.state, &next)
        };
        if next.palette_cycle_enabled != self.state.palette_cycle_enabled {
            self.palette_clock.reset();
        }
        let previous = std::mem::replace(&mut self.state, next);
        match kind {
            TransitionKind::Instant => {
                self.transition = None;
                self.refresh(scope);
            }
            TransitionKind::Fade => {
                self.start_transition(previous, None, kind);
                self.refresh(scope);
            }
            TransitionKind::Smooth => {
                let (from, palette) = displayed.unwrap_or((previous, None));
                self.start_transition(from, palette, kind);
            }
        }
        tracing::debug!(?kind, ?scope, "applied state");
        self.notify();
    }

    clamped_setters! {
        set_palette_variance => Full,
        set_hue_shift => Recolor,
        set_saturation => None,
        set_brightness => None,
        set_contrast => None,
        set_density => Full,
        set_scale_base => Full,
        set_scale_spread => Full,
        set_motion_intensity => None,
        set_motion_speed => None,
        set_rotation_amount => None,
        set_rotation_speed => None,
        set_layer_opacity => None,
        set_background_hue => Recolor,
        set_background_brightness => Recolor,
        set_gradient_direction => Full,
        set_outline_balance => Full,
        set_outline_width => None,
        set_outlined_opacity => None,
        set_filled_opacity => None,
        set_hue_rotation_speed => None,
        set_palette_cycle_speed => None,
        set_canvas_hue_rotation_speed => None,
        set_depth_of_field_focus => None,
        set_depth_of_field_strength => None,
        set_bloom_threshold => None,
        set_bloom_intensity => None,
        set_noise_amount => None,
    }

    field_setters! {
        set_motion_mode(motion_mode: MotionMode) => Full,
        set_rotation_enabled(rotation_enabled: bool) => None,
        set_rotation_animated(rotation_animated: bool) => None,
        set_blend_mode(blend_mode: BlendMode) => None,
        set_blend_auto(blend_auto: bool) => Full,
        set_selected_sprites(selected_sprites: Vec<String>) => Full,
        set_background_mode(background_mode: BackgroundMode) => Full,
        set_fill_mode(fill_mode: FillMode) => Full,
        set_gradient_randomize_direction(gradient_randomize_direction: bool) => Full,
        set_gradient_randomize_colors(gradient_randomize_colors: bool) => Full,
        set_outline_enabled(outline_enabled: bool) => Full,
        set_outline_mixed(outline_mixed: bool) => Full,
        set_animation_enabled(animation_enabled: bool) => None,
        set_hue_rotation_enabled(hue_rotation_enabled: bool) => None,
        set_palette_cycle_enabled(palette_cycle_enabled: bool) => Full,
        set_canvas_hue_rotation_enabled(canvas_hue_rotation_enabled: bool) => None,
        set_aspect_ratio(aspect_ratio: AspectRatio) => Full,
        set_depth_of_field_enabled(depth_of_field_enabled: bool) => Full,
        set_bloom_enabled(bloom_enabled: bool) => None,
        set_noise_enabled(noise_enabled: bool) => None,
        set_thumbnail_mode(thumbnail_mode: bool) => Full,
    }

    pub fn set_seed(&mut self, seed: impl Into<String>) {
        let seed = seed.into();
        self.mutate(RecomputeScope::Full, |s| s.seed = seed);
    }

    pub fn set_palette(&mut self, palette_id: impl Into<String>) {
        let id = palette_id.into();
        self.mutate(RecomputeScope::Full, |s| s.palette_id = id);
    }

    pub fn set_sprite_collection(&mut self, collection: impl Into<String>) {
        let collection = collection.into();
        self.mutate(RecomputeScope::Full, |s| s.sprite_collection = collection);
    }

    pub fn set_background_palette(&mut self, palette_id: impl Into<String>) {
        let id = palette_id.into();
        self.mutate(RecomputeScope::Full, |s| s.background_palette_id = id);
    }

    pub fn set_thumbnail_accent(&mut self, hex: impl Into<String>) {
        let hex = hex.into();
        self.mutate(RecomputeScope::Full, |s| s.thumbnail_accent = hex);
    }

    pub fn set_thumbnail_secondary_count(&mut self, count: u32) {
        self.mutate(RecomputeScope::Full, |s| s.set_thumbnail_secondary_count(count));
    }

    /// Redraws tile colors from a fresh stream; layout stays.
    pub fn reroll_colors(&mut self) {
        self.reroll(|s| &mut s.color_seed_suffix);
    }

    pub fn reroll_blend_modes(&mut self) {
        self.reroll(|s| &mut s.blend_mode_seed_suffix);
    }

    pub fn reroll_background(&mut self) {
        self.reroll(|s| &mut s.background_color_seed_suffix);
    }

    pub fn reroll_gradients(&mut self) {
        self.reroll(|s| &mut s.gradient_color_seed_suffix);
    }

    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
        }
    }

    /// Resumes ticking. The first tick after resuming advances nothing.
    pub fn resume(&mut self) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
            self.last_tick = None;
        }
    }

    /// Stops ticking for good and drops the callbacks. The surface is
    /// owned by the host and can be released once this returns.
    pub fn shutdown(&mut self) {
        self.run_state = RunState::Stopped;
        self.transition = None;
        self.on_state_change = None;
        self.on_frame_rate = None;
        tracing::debug!("controller stopped");
    }

    /// Advances to `now` (seconds) and draws one frame.
    ///
    /// Returns `None` without touching the surface unless running.
    pub fn tick(
        &mut self,
        now: f64,
        surface: &mut dyn Surface,
        assets: &mut dyn AssetResolver,
    ) -> Option<FrameStats> {
        if self.run_state != RunState::Running {
            return None;
        }
        let dt = self
            .last_tick
            .map_or(0.0, |last| (now - last).clamp(0.0, MAX_FRAME_DELTA));
        self.last_tick = Some(now);

        let (fade, smooth_state) = self.advance_transition(now);
        let state = smooth_state.as_ref().unwrap_or(&self.state);

        let animate = state.animation_enabled;
        let speed = self.speed.update(state.motion_speed / 100.0, dt);
        self.sprite_hue.advance(
            dt,
            state.hue_rotation_speed / CLOCK_SPEED_REFERENCE,
            animate && state.hue_rotation_enabled,
        );
        self.canvas_hue.advance(
            dt,
            state.canvas_hue_rotation_speed / CLOCK_SPEED_REFERENCE,
            animate && state.canvas_hue_rotation_enabled,
        );
        self.palette_clock.advance(
            dt,
            state.palette_cycle_speed / CLOCK_SPEED_REFERENCE,
            animate && state.palette_cycle_enabled,
        );
        if animate {
            self.motion_time += dt * speed * state.motion_mode.speed_multiplier();
            if state.rotation_enabled && state.rotation_animated {
                self.spin += dt * state.rotation_speed / 100.0 * SPIN_DEGREES_PER_SECOND;
            }
        }

        let stats = self.draw(state, fade, now, surface, assets);
        if let Some(fps) = self.fps.record(now) {
            tracing::debug!(fps, "frame rate");
            if let Some(callback) = self.on_frame_rate.as_mut() {
                callback(fps);
            }
        }
        Some(stats)
    }

    fn smooth_in_flight(&self) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|t| t.kind() == TransitionKind::Smooth)
    }

    /// State and palette a running smooth transition drew on the last tick.
    fn displayed_blend(&self) -> Option<(GeneratorState, Option<Vec<Srgb>>)> {
        let transition = self
            .transition
            .as_ref()
            .filter(|t| t.kind() == TransitionKind::Smooth)?;
        let progress = transition.progress(self.last_tick.unwrap_or(0.0));
        Some((
            transition.state_at(progress),
            transition.palette_override(progress),
        ))
    }

    fn start_transition(
        &mut self,
        from: GeneratorState,
        palette: Option<Vec<Srgb>>,
        kind: TransitionKind,
    ) {
        let start = self.last_tick.unwrap_or(0.0);
        self.transition = Some(
            Transition::new(from, self.state.clone(), kind, start).with_from_palette(palette),
        );
        self.transition_armed = true;
    }

    /// Resolves the in-flight transition at `now`.
    ///
    /// Returns the tile opacity multiplier and, while a smooth transition
    /// runs, the interpolated state to render.
    fn advance_transition(&mut self, now: f64) -> (f64, Option<GeneratorState>) {
        let Some(transition) = self.transition.as_mut() else {
            return (1.0, None);
        };
        if self.transition_armed {
            transition.restart_at(now);
            self.transition_armed = false;
        }
        let progress = transition.progress(now);
        let kind = transition.kind();
        if progress >= 1.0 {
            self.transition = None;
            if kind == TransitionKind::Smooth {
                self.prepared = Rc::new(self.composer.compute(&self.state, None));
            }
            tracing::debug!(?kind, "transition finished");
            return (1.0, None);
        }
        let opacity = transition.opacity(now);
        if kind != TransitionKind::Smooth {
            return (opacity, None);
        }
        let state = transition.state_at(progress);
        let palette = transition.palette_override(progress);
        self.prepared = Rc::new(self.composer.compute(&state, palette.as_deref()));
        (opacity, Some(state))
    }

    /// Applies a setter to a copy of the state and commits it if anything
    /// changed.
    fn mutate(&mut self, scope: RecomputeScope, update: impl FnOnce(&mut GeneratorState)) {
        let mut next = self.state.clone();
        update(&mut next);
        if next == self.state {
            return;
        }
        debug_assert_eq!(scope, GeneratorState::recompute_scope(&self.state, &next));
        if next.palette_cycle_enabled != self.state.palette_cycle_enabled {
            self.palette_clock.reset();
        }
        self.state = next;
        if let Some(transition) = self.transition.as_mut() {
            transition.retarget(self.state.clone());
        }
        // A smooth transition recomposes from the live target every tick.
        if !self.smooth_in_flight() {
            self.refresh(scope);
        }
        self.notify();
    }

    fn reroll(&mut self, suffix: fn(&mut GeneratorState) -> &mut String) {
        self.rerolls += 1;
        let tag = format!("-{}", self.rerolls);
        self.mutate(RecomputeScope::Full, |s| {
            let field = suffix(s);
            *field = if *field == tag { format!("{tag}-") } else { tag };
        });
    }

    fn refresh(&mut self, scope: RecomputeScope) {
        match scope {
            RecomputeScope::None => {}
            RecomputeScope::Recolor => {
                self.prepared = Rc::new(self.composer.recolor(&self.prepared, &self.state, None));
            }
            RecomputeScope::Full => {
                self.prepared = Rc::new(self.composer.compute(&self.state, None));
            }
        }
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_state_change.as_mut() {
            callback(&self.state);
        }
    }

    /// Palette colors for the current cycling position, resolved through the
    /// same hue shift and jitter as a composition.
    fn cycled_palette(&self, state: &GeneratorState) -> Option<Vec<Srgb>> {
        if !state.palette_cycle_enabled {
            return None;
        }
        let all = Palette::all();
        if all.is_empty() {
            return None;
        }
        let origin = Palette::index_of(&state.palette_id).unwrap_or(0);
        let cycle = PaletteCycle::position(self.palette_clock.elapsed(), all.len());
        let from = &all[(origin + cycle.from) % all.len()];
        let to = &all[(origin + cycle.to) % all.len()];
        let mixed = interpolate_palette_colors(from.colors(), to.colors(), cycle.t);
        Some(self.composer.resolve_palette(state, Some(&mixed)))
    }

    fn draw(
        &self,
        state: &GeneratorState,
        fade: f64,
        now: f64,
        surface: &mut dyn Surface,
        assets: &mut dyn AssetResolver,
    ) -> FrameStats {
        let background = if state.canvas_hue_rotation_enabled {
            self.composer
                .resolve_background(state, self.canvas_hue.hue_offset())
        } else {
            self.prepared.background
        };
        surface.clear(background.color);

        let width = surface.width() as f64;
        let height = surface.height() as f64;
        let unit = width.min(height) * TILE_UNIT_FRACTION;
        let cycled = self.cycled_palette(state);
        let hue_offset = if state.hue_rotation_enabled {
            self.sprite_hue.hue_offset()
        } else {
            0.0
        };
        let adjust = |c: Srgb| {
            apply_color_adjustments(
                shift_hue(c, hue_offset),
                state.saturation,
                state.brightness,
                state.contrast,
            )
        };

        let mut stats = FrameStats::default();
        for (layer_index, layer, tile) in self.prepared.tiles() {
            let Some(image) = assets.cached(&tile.sprite) else {
                assets.request(&tile.sprite);
                stats.skipped += 1;
                continue;
            };

            let layer_unit = unit * layer.base_size_ratio;
            let base_size = layer_unit * tile.scale;
            let motion = state.motion_mode.evaluate(&MotionInput {
                time: self.motion_time,
                phase: tile.phase,
                motion_scale: state.motion_intensity / 100.0,
                layer_index,
                base_unit: base_size,
                layer_tile_size: layer_unit * MAX_SCALE,
                speed_factor: tile.animation_time_multiplier,
            });
            let size = base_size * motion.scale_multiplier;

            let rotation = if state.rotation_enabled {
                let spin = if state.rotation_animated {
                    self.spin * tile.rotation_direction * tile.rotation_speed_multiplier
                } else {
                    0.0
                };
                tile.rotation_base_multiplier * state.rotation_amount + spin
            } else {
                0.0
            };

            let fill_opacity = if tile.is_outlined {
                state.outlined_opacity
            } else {
                state.filled_opacity
            };
            let opacity =
                layer.opacity * state.layer_opacity / 100.0 * fill_opacity / 100.0 * fade;
            let blur = if state.depth_of_field_enabled {
                let z = (base_size / (unit * MAX_SCALE)).clamp(0.0, 1.0);
                depth_of_field_blur(
                    z,
                    state.depth_of_field_focus / 100.0,
                    state.depth_of_field_strength / 100.0,
                )
            } else {
                0.0
            };

            let (tint, gradient_tint) = tile_colors(tile, cycled.as_deref());
            let tint = adjust(tint);

            surface.save();
            surface.translate(
                tile.u * width + motion.offset.x,
                tile.v * height + motion.offset.y,
            );
            surface.rotate(rotation.to_radians());
            surface.set_global_alpha(opacity);
            surface.set_blend_mode(
                tile.blend_mode
                    .or(layer.blend_mode)
                    .unwrap_or(state.blend_mode),
            );
            surface.set_blur(blur);
            let half = size / 2.0;
            if tile.is_outlined {
                surface.stroke_sprite(&image, -half, -half, size, size, tint, state.outline_width);
            } else {
                let paint = match state.fill_mode {
                    FillMode::Solid => Paint::Solid(tint),
                    FillMode::Gradient => Paint::Linear {
                        from: tint,
                        to: adjust(gradient_tint),
                        angle: tile.gradient_angle,
                    },
                };
                surface.draw_sprite(&image, -half, -half, size, size, &paint);
            }
            surface.restore();
            stats.drawn += 1;
        }

        if state.bloom_enabled {
            apply_bloom(
                surface,
                state.bloom_threshold / 100.0,
                state.bloom_intensity / 100.0,
            );
        }
        if state.noise_enabled {
            apply_grain(surface, state.noise_amount / 100.0, hash_seed(&state.seed), now);
        }
        stats
    }
}

/// Fill and gradient colors of a tile, taken from the cycled palette when
/// one is active. Accent tiles keep their tint.
fn tile_colors(tile: &PreparedTile, cycled: Option<&[Srgb]>) -> (Srgb, Srgb) {
    match cycled {
        Some(palette) if !palette.is_empty() => {
            let tint = if tile.is_accent {
                tile.tint
            } else {
                palette[tile.palette_color_index % palette.len()]
            };
            (tint, palette[tile.gradient_color_index % palette.len()])
        }
        _ => (tile.tint, tile.gradient_tint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SpriteLibrary;
    use crate::raster::Raster;
    use spritefield_core::sprite::SpriteCatalog;
    use std::cell::RefCell;

    fn loaded_library() -> SpriteLibrary {
        let mut lib = SpriteLibrary::with_resolution(16);
        let catalog = SpriteCatalog::builtin();
        lib.preload(catalog.all_sprites());
        lib
    }

    fn raster() -> Raster {
        Raster::new(48, 48).unwrap()
    }

    #[test]
    fn kinetic_setters_keep_the_prepared_sprite() {
        let mut c = Controller::new(GeneratorState::default());
        let before = Rc::clone(c.prepared());
        c.set_motion_intensity(90.0);
        c.set_motion_speed(250.0);
        c.set_rotation_animated(true);
        c.set_bloom_enabled(true);
        assert!(Rc::ptr_eq(&before, c.prepared()));
        assert_eq!(c.state().motion_intensity, 90.0);
    }

    #[test]
    fn structural_setters_recompute() {
        let mut c = Controller::new(GeneratorState::default());
        let before = Rc::clone(c.prepared());
        c.set_scale_base(10.0);
        assert!(!Rc::ptr_eq(&before, c.prepared()));
    }

    #[test]
    fn hue_shift_recolors_without_moving_tiles() {
        let mut c = Controller::new(GeneratorState::default());
        let before = Rc::clone(c.prepared());
        c.set_hue_shift(120.0);
        assert!(!Rc::ptr_eq(&before, c.prepared()));
        for ((_, _, a), (_, _, b)) in before.tiles().zip(c.prepared().tiles()) {
            assert_eq!((a.u, a.v, a.scale), (b.u, b.v, b.scale));
        }
    }

    #[test]
    fn setter_values_are_clamped() {
        let mut c = Controller::new(GeneratorState::default());
        c.set_palette_variance(-10.0);
        assert_eq!(c.state().palette_variance, 0.0);
        c.set_palette_variance(1000.0);
        assert_eq!(c.state().palette_variance, 150.0);
    }

    #[test]
    fn every_setter_matches_the_recompute_policy() {
        // Each setter debug-asserts its declared scope against the policy.
        let mut c = Controller::new(GeneratorState::default());
        c.set_palette_variance(13.0);
        c.set_hue_shift(13.0);
        c.set_saturation(13.0);
        c.set_brightness(13.0);
        c.set_contrast(13.0);
        c.set_density(13.0);
        c.set_scale_base(13.0);
        c.set_scale_spread(13.0);
        c.set_motion_intensity(13.0);
        c.set_motion_speed(13.0);
        c.set_rotation_amount(13.0);
        c.set_rotation_speed(13.0);
        c.set_layer_opacity(13.0);
        c.set_background_hue(13.0);
        c.set_background_brightness(13.0);
        c.set_gradient_direction(13.0);
        c.set_outline_balance(13.0);
        c.set_outline_width(11.0);
        c.set_outlined_opacity(13.0);
        c.set_filled_opacity(13.0);
        c.set_hue_rotation_speed(13.0);
        c.set_palette_cycle_speed(13.0);
        c.set_canvas_hue_rotation_speed(13.0);
        c.set_depth_of_field_focus(13.0);
        c.set_depth_of_field_strength(13.0);
        c.set_bloom_threshold(13.0);
        c.set_bloom_intensity(13.0);
        c.set_noise_amount(13.0);
        c.set_motion_mode(MotionMode::Spiral);
        c.set_rotation_enabled(false);
        c.set_rotation_animated(true);
        c.set_blend_mode(BlendMode::Screen);
        c.set_blend_auto(true);
        c.set_selected_sprites(vec!["star".into()]);
        c.set_background_mode(BackgroundMode::Custom);
        c.set_fill_mode(FillMode::Gradient);
        c.set_gradient_randomize_direction(true);
        c.set_gradient_randomize_colors(false);
        c.set_outline_enabled(true);
        c.set_outline_mixed(true);
        c.set_animation_enabled(false);
        c.set_hue_rotation_enabled(true);
        c.set_palette_cycle_enabled(true);
        c.set_canvas_hue_rotation_enabled(true);
        c.set_aspect_ratio(AspectRatio::Landscape);
        c.set_depth_of_field_enabled(true);
        c.set_bloom_enabled(true);
        c.set_noise_enabled(true);
        c.set_thumbnail_mode(true);
        c.set_thumbnail_secondary_count(3);
        c.set_thumbnail_accent("#00ff00");
        c.set_seed("other");
        c.set_palette("fire");
        c.set_sprite_collection("soft");
        c.set_background_palette("vapor");
        c.reroll_colors();
        c.reroll_blend_modes();
        c.reroll_background();
        c.reroll_gradients();
    }

    #[test]
    fn reroll_changes_only_its_suffix() {
        let mut c = Controller::new(GeneratorState::default());
        let before = Rc::clone(c.prepared());
        c.reroll_colors();
        assert!(!c.state().color_seed_suffix.is_empty());
        assert!(c.state().gradient_color_seed_suffix.is_empty());
        assert!(!Rc::ptr_eq(&before, c.prepared()));
        let first = c.state().color_seed_suffix.clone();
        c.reroll_colors();
        assert_ne!(c.state().color_seed_suffix, first);
    }

    #[test]
    fn state_change_callback_fires_once_per_mutation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut c = Controller::new(GeneratorState::default());
        c.on_state_change(move |s| sink.borrow_mut().push(s.density));
        c.set_density(80.0);
        c.set_density(80.0);
        c.set_density(400.0);
        assert_eq!(*seen.borrow(), vec![80.0, 100.0]);
    }

    #[test]
    fn tick_draws_every_loaded_tile() {
        let mut c = Controller::new(GeneratorState::default());
        let mut lib = loaded_library();
        let mut surface = raster();
        let stats = c.tick(0.0, &mut surface, &mut lib).unwrap();
        assert_eq!(stats.drawn, c.prepared().tile_count());
        assert_eq!(stats.skipped, 0);
        assert!(surface.buffer().data().iter().all(|p| p.a > 0.0));
    }

    #[test]
    fn paused_ticks_draw_nothing() {
        let mut c = Controller::new(GeneratorState::default());
        let mut lib = loaded_library();
        let mut surface = raster();
        c.pause();
        assert_eq!(c.tick(0.0, &mut surface, &mut lib), None);
        assert!(surface.buffer().data().iter().all(|p| p.a == 0.0));
        c.resume();
        assert!(c.tick(0.1, &mut surface, &mut lib).is_some());
    }

    #[test]
    fn shutdown_is_terminal() {
        let mut c = Controller::new(GeneratorState::default());
        let mut lib = loaded_library();
        let mut surface = raster();
        c.shutdown();
        c.resume();
        assert_eq!(c.run_state(), RunState::Stopped);
        assert_eq!(c.tick(0.0, &mut surface, &mut lib), None);
    }

    #[test]
    fn cache_misses_request_and_skip() {
        let mut c = Controller::new(GeneratorState::default());
        let mut lib = SpriteLibrary::with_resolution(16);
        let mut surface = raster();
        let first = c.tick(0.0, &mut surface, &mut lib).unwrap();
        assert_eq!(first.drawn, 0);
        assert_eq!(first.skipped, c.prepared().tile_count());
        assert!(!lib.pending().is_empty());

        lib.pump();
        let second = c.tick(0.016, &mut surface, &mut lib).unwrap();
        assert_eq!(second.skipped, 0);
        assert_eq!(second.drawn, c.prepared().tile_count());
    }

    #[test]
    fn empty_selection_draws_background_only() {
        let mut state = GeneratorState::default();
        state.selected_sprites.clear();
        let mut c = Controller::new(state);
        let mut lib = loaded_library();
        let mut surface = raster();
        let stats = c.tick(0.0, &mut surface, &mut lib).unwrap();
        assert_eq!(stats, FrameStats::default());
    }

    #[test]
    fn fade_swaps_layout_immediately_and_dips_opacity() {
        let mut c = Controller::new(GeneratorState::default());
        let mut lib = loaded_library();
        let mut surface = raster();
        c.tick(0.0, &mut surface, &mut lib);
        let before = Rc::clone(c.prepared());
        let target = GeneratorState {
            seed: "faded".into(),
            ..GeneratorState::default()
        };
        c.apply_state(target.clone(), TransitionKind::Fade);
        assert!(!Rc::ptr_eq(&before, c.prepared()));
        assert_eq!(c.state(), &target);

        c.tick(1.0, &mut surface, &mut lib);
        let transition = c.transition().unwrap();
        assert!(transition.opacity(1.5).abs() < 1e-9);
        c.tick(2.1, &mut surface, &mut lib);
        assert!(c.transition().is_none());
    }

    #[test]
    fn smooth_transition_finishes_with_one_recompute() {
        let mut c = Controller::new(GeneratorState::default());
        let mut lib = loaded_library();
        let mut surface = raster();
        let mut target = GeneratorState::default();
        target.set_density(90.0);
        c.apply_state(target.clone(), TransitionKind::Smooth);

        c.tick(0.0, &mut surface, &mut lib);
        let mid = Rc::clone(c.prepared());
        c.tick(1.0, &mut surface, &mut lib);
        assert!(!Rc::ptr_eq(&mid, c.prepared()));

        c.tick(3.0, &mut surface, &mut lib);
        assert!(c.transition().is_none());
        let done = Rc::clone(c.prepared());
        assert_eq!(*done, Composer::default().compute(&target, None));
        c.tick(3.1, &mut surface, &mut lib);
        c.tick(3.2, &mut surface, &mut lib);
        assert!(Rc::ptr_eq(&done, c.prepared()));
    }

    #[test]
    fn interrupted_smooth_transition_continues_from_the_displayed_blend() {
        let mut sparse = GeneratorState::default();
        sparse.set_density(10.0);
        let mut dense = GeneratorState::default();
        dense.set_density(100.0);
        let full_count = Composer::default().compute(&dense, None).tile_count();

        let mut c = Controller::new(sparse.clone());
        let mut lib = loaded_library();
        let mut surface = Raster::new(8, 8).unwrap();
        c.apply_state(dense, TransitionKind::Smooth);
        c.tick(0.0, &mut surface, &mut lib);
        c.tick(1.25, &mut surface, &mut lib);
        let midway = c.prepared().tile_count();
        assert!(midway < full_count);

        c.apply_state(sparse.clone(), TransitionKind::Smooth);
        let start = c.transition().unwrap().state_at(0.0);
        assert!((start.density - 55.0).abs() < 1e-9);

        c.tick(1.3, &mut surface, &mut lib);
        assert_eq!(c.prepared().tile_count(), midway);

        c.tick(5.0, &mut surface, &mut lib);
        assert!(c.transition().is_none());
        assert_eq!(**c.prepared(), Composer::default().compute(&sparse, None));
    }

    #[test]
    fn instant_apply_cancels_transition() {
        let mut c = Controller::new(GeneratorState::default());
        let target = GeneratorState {
            seed: "next".into(),
            ..GeneratorState::default()
        };
        c.apply_state(target.clone(), TransitionKind::Smooth);
        assert!(c.transition().is_some());
        c.apply_state(target.clone(), TransitionKind::Instant);
        assert!(c.transition().is_none());
        assert_eq!(**c.prepared(), Composer::default().compute(&target, None));
    }

    #[test]
    fn frame_rate_is_reported_once_per_second() {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        let mut c = Controller::new(GeneratorState::default());
        c.on_frame_rate(move |fps| sink.borrow_mut().push(fps));
        let mut lib = loaded_library();
        let mut surface = Raster::new(8, 8).unwrap();
        for frame in 0..=15 {
            c.tick(frame as f64 * 0.1, &mut surface, &mut lib);
        }
        let reports = reports.borrow();
        assert_eq!(reports.len(), 1);
        assert!((reports[0] - 11.0).abs() < 0.5);
    }

    #[test]
    fn large_gaps_advance_clocks_by_at_most_max_delta() {
        let state = GeneratorState {
            hue_rotation_enabled: true,
            ..GeneratorState::default()
        };
        let mut c = Controller::new(state);
        let mut lib = loaded_library();
        let mut surface = Raster::new(8, 8).unwrap();
        c.tick(0.0, &mut surface, &mut lib);
        c.tick(100.0, &mut surface, &mut lib);
        assert!((c.sprite_hue.elapsed() - MAX_FRAME_DELTA).abs() < 1e-9);
    }

    #[test]
    fn disabled_animation_freezes_motion() {
        let state = GeneratorState {
            animation_enabled: false,
            hue_rotation_enabled: true,
            ..GeneratorState::default()
        };
        let mut c = Controller::new(state);
        let mut lib = loaded_library();
        let mut surface = Raster::new(8, 8).unwrap();
        c.tick(0.0, &mut surface, &mut lib);
        c.tick(0.2, &mut surface, &mut lib);
        assert_eq!(c.motion_time, 0.0);
        assert_eq!(c.sprite_hue.elapsed(), 0.0);
    }

    #[test]
    fn palette_cycling_recolors_live_without_recompute() {
        let mut c = Controller::new(GeneratorState::default());
        c.set_palette_cycle_enabled(true);
        let prepared = Rc::clone(c.prepared());
        let mut lib = loaded_library();
        let mut surface = Raster::new(8, 8).unwrap();
        let start = c.cycled_palette(c.state()).unwrap();
        for frame in 0..=60 {
            c.tick(frame as f64 * 0.25, &mut surface, &mut lib);
        }
        let later = c.cycled_palette(c.state()).unwrap();
        assert_ne!(start, later);
        assert!(Rc::ptr_eq(&prepared, c.prepared()));
    }
}
