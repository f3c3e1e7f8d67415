#![deny(unsafe_code)]
//! Movement library: one pure function per [`MotionMode`].
//!
//! Each function maps a tile's time, phase and size to a pixel offset from
//! its resting position plus a scale multiplier. Nothing here holds state;
//! the frame loop calls [`Movement::evaluate`] for every tile every frame.
//!
//! The per-mode lookup tables ([`Movement::speed_multiplier`] and friends)
//! are applied by callers: the controller normalizes motion speed with
//! `speed_multiplier`, and the composer spawns more or larger tiles for
//! modes that spread them thinly.

use std::f64::consts::TAU;

use glam::DVec2;
use spritefield_core::state::MotionMode;

/// Smallest scale multiplier any mode may return.
pub const MIN_SCALE_MULTIPLIER: f64 = 0.35;

/// Share of the center offset that center-pulling modes remove from tile
/// positions at layout time.
pub const CENTER_PULL: f64 = 0.25;

/// Inputs for one tile on one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionInput {
    /// Motion clock in seconds, already scaled by the normalized speed.
    pub time: f64,
    /// Per-tile phase in [0, 1).
    pub phase: f64,
    /// Motion intensity as a fraction in [0, 1].
    pub motion_scale: f64,
    /// Layer index, 0 = back.
    pub layer_index: usize,
    /// Drawn size of the tile in pixels.
    pub base_unit: f64,
    /// Reference tile size of the tile's layer in pixels.
    pub layer_tile_size: f64,
    /// Per-tile time multiplier.
    pub speed_factor: f64,
}

impl MotionInput {
    fn local_time(&self) -> f64 {
        self.time * self.speed_factor
    }

    fn phase_angle(&self) -> f64 {
        self.phase * TAU
    }

    /// Offset amplitude in pixels.
    fn amplitude(&self) -> f64 {
        self.base_unit * self.motion_scale
    }

    /// Tile size relative to its layer, in [0, 1].
    fn size_ratio(&self) -> f64 {
        if self.layer_tile_size <= 0.0 {
            return 1.0;
        }
        (self.base_unit / self.layer_tile_size).clamp(0.0, 1.0)
    }
}

/// Result of a motion function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionOutput {
    /// Offset in pixels from the tile's resting position.
    pub offset: DVec2,
    /// Multiplier on the tile's drawn size; never below
    /// [`MIN_SCALE_MULTIPLIER`].
    pub scale_multiplier: f64,
}

impl MotionOutput {
    fn new(offset: DVec2, scale_multiplier: f64) -> Self {
        Self {
            offset,
            scale_multiplier: scale_multiplier.max(MIN_SCALE_MULTIPLIER),
        }
    }
}

/// Speed of a parallax mode for a tile of the given relative size.
///
/// Small tiles move slower but never stop.
pub fn parallax_speed(size_ratio: f64) -> f64 {
    0.3 + size_ratio.clamp(0.0, 1.0) * 0.7
}

/// Symmetric triangle wave with period 1 in [-1, 1].
fn triangle_wave(x: f64) -> f64 {
    2.0 * (2.0 * (x - (x + 0.5).floor())).abs() - 1.0
}

/// Unit direction picked from `count` evenly spaced headings by phase.
fn heading(phase: f64, count: usize, start_degrees: f64) -> DVec2 {
    let index = ((phase.rem_euclid(1.0) * count as f64) as usize).min(count - 1);
    let angle = (start_degrees + index as f64 * 360.0 / count as f64).to_radians();
    DVec2::new(angle.cos(), angle.sin())
}

/// Behavior and tuning of a motion mode.
pub trait Movement {
    /// Evaluates the mode's motion function for one tile.
    fn evaluate(self, input: &MotionInput) -> MotionOutput;

    /// Normalizes "100% speed" across modes with different internal
    /// frequencies.
    fn speed_multiplier(self) -> f64;

    /// Extra tiles spawned for modes that spread tiles thinly.
    fn tile_count_multiplier(self) -> f64;

    /// Extra sprite size for modes that spread tiles thinly.
    fn sprite_scale_multiplier(self) -> f64;

    /// True for orbital modes whose layout is nudged toward the center.
    fn pulls_toward_center(self) -> bool;
}

impl Movement for MotionMode {
    fn evaluate(self, input: &MotionInput) -> MotionOutput {
        match self {
            MotionMode::Pulse => pulse(input),
            MotionMode::PulseMeander => pulse_meander(input),
            MotionMode::Drift => drift(input),
            MotionMode::Ripple => ripple(input),
            MotionMode::Zigzag => zigzag(input),
            MotionMode::Cascade => cascade(input),
            MotionMode::Spiral => spiral(input),
            MotionMode::Comet => comet(input),
            MotionMode::Linear => parallax(input, heading(input.phase, 4, 0.0)),
            MotionMode::Isometric => parallax(input, heading(input.phase, 6, 30.0)),
            MotionMode::Triangular => parallax(input, heading(input.phase, 3, -90.0)),
        }
    }

    fn speed_multiplier(self) -> f64 {
        match self {
            MotionMode::Pulse | MotionMode::PulseMeander => 1.0,
            MotionMode::Drift => 2.2,
            MotionMode::Ripple => 1.2,
            MotionMode::Zigzag => 1.5,
            MotionMode::Cascade => 1.8,
            MotionMode::Spiral => 1.1,
            MotionMode::Comet => 1.3,
            MotionMode::Linear | MotionMode::Isometric | MotionMode::Triangular => 1.6,
        }
    }

    fn tile_count_multiplier(self) -> f64 {
        match self {
            MotionMode::Spiral => 1.4,
            MotionMode::Comet => 1.2,
            MotionMode::Cascade => 1.15,
            _ => 1.0,
        }
    }

    fn sprite_scale_multiplier(self) -> f64 {
        match self {
            MotionMode::Spiral => 1.15,
            MotionMode::Comet => 1.1,
            MotionMode::Ripple => 1.05,
            _ => 1.0,
        }
    }

    fn pulls_toward_center(self) -> bool {
        matches!(self, MotionMode::Spiral | MotionMode::Comet)
    }
}

/// Size-only breathing.
fn pulse(input: &MotionInput) -> MotionOutput {
    let t = input.local_time();
    let breath = (t * 2.0 + input.phase_angle()).sin();
    MotionOutput::new(DVec2::ZERO, 1.0 + 0.35 * input.motion_scale * breath)
}

/// Breathing plus a slow wander.
fn pulse_meander(input: &MotionInput) -> MotionOutput {
    let t = input.local_time();
    let a = input.phase_angle();
    let breath = (t * 2.0 + a).sin();
    let wander = DVec2::new((t * 0.7 + a).sin(), (t * 0.9 + a * 1.3).cos());
    MotionOutput::new(
        wander * input.amplitude() * 0.6,
        1.0 + 0.3 * input.motion_scale * breath,
    )
}

/// Two-axis sine wander; back layers wander less.
fn drift(input: &MotionInput) -> MotionOutput {
    let t = input.local_time();
    let a = input.phase_angle();
    let depth = 1.0 + input.layer_index as f64 * 0.15;
    let offset = DVec2::new((t * 0.5 + a).sin(), (t * 0.4 + a * 0.7).cos());
    MotionOutput::new(offset * input.amplitude() * depth, 1.0)
}

/// Radial wave: the tile moves in and out along its phase heading.
fn ripple(input: &MotionInput) -> MotionOutput {
    let t = input.local_time();
    let a = input.phase_angle();
    let wave = (t * 1.6 - input.phase * 6.0).sin();
    let direction = DVec2::new(a.cos(), a.sin());
    MotionOutput::new(
        direction * input.amplitude() * 0.8 * wave,
        1.0 + 0.15 * input.motion_scale * wave,
    )
}

/// Back-and-forth path that retraces itself.
fn zigzag(input: &MotionInput) -> MotionOutput {
    let x = input.local_time() * 0.35 + input.phase;
    let offset = DVec2::new(triangle_wave(x), 0.5 * triangle_wave(x * 4.0));
    MotionOutput::new(offset * input.amplitude(), 1.0)
}

/// Downward fall that shrinks toward the end of each drop.
fn cascade(input: &MotionInput) -> MotionOutput {
    let t = input.local_time();
    let fall = (t * 0.25 + input.phase).rem_euclid(1.0);
    let amp = input.amplitude();
    let offset = DVec2::new(0.3 * amp * (t + input.phase_angle()).sin(), 2.0 * amp * (fall - 0.5));
    MotionOutput::new(offset, 1.0 - 0.5 * input.motion_scale * fall)
}

/// Orbit whose radius breathes in and out.
fn spiral(input: &MotionInput) -> MotionOutput {
    let t = input.local_time();
    let a = input.phase_angle();
    let swell = (t * 0.6 + a).sin();
    let radius = input.amplitude() * (1.0 + 0.5 * swell);
    let angle = t * 0.8 + a;
    MotionOutput::new(
        DVec2::new(angle.cos(), angle.sin()) * radius,
        1.0 + 0.1 * input.motion_scale * swell,
    )
}

/// Elongated orbit with a pulsing tail.
fn comet(input: &MotionInput) -> MotionOutput {
    let t = input.local_time();
    let a = input.phase_angle();
    let angle = t * 0.9 + a;
    let amp = input.amplitude();
    let orbit = DVec2::new(1.6 * amp * angle.cos(), 0.7 * amp * angle.sin());
    // Tilt each orbit by the tile's phase.
    let offset = DVec2::from_angle(a).rotate(orbit);
    MotionOutput::new(offset, 1.0 + 0.3 * input.motion_scale * (angle * 2.0).sin())
}

/// Oscillation along a fixed heading at a size-dependent speed.
fn parallax(input: &MotionInput, direction: DVec2) -> MotionOutput {
    let speed = parallax_speed(input.size_ratio());
    let swing = (input.local_time() * speed + input.phase_angle()).sin();
    MotionOutput::new(direction * input.amplitude() * 1.5 * swing, 1.0)
}
