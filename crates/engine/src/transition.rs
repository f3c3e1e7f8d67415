//! Transitions between two generator states.
//!
//! `Instant` swaps immediately. `Fade` shows the target layout at once and
//! dips a global opacity to zero and back. `Smooth` interpolates every
//! numeric field (and the palette) and recomposes each frame.

use serde::{Deserialize, Serialize};
use spritefield_core::color::{interpolate_hue, interpolate_palette_colors, Srgb};
use spritefield_core::palette::Palette;
use spritefield_core::state::GeneratorState;

/// How a new state replaces the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    #[default]
    Instant,
    Fade,
    Smooth,
}

impl TransitionKind {
    /// Duration in seconds.
    pub fn duration(self) -> f64 {
        match self {
            TransitionKind::Instant => 0.0,
            TransitionKind::Fade => 1.0,
            TransitionKind::Smooth => 2.5,
        }
    }
}

/// Opacity multiplier of a fade at `progress`: 1 → 0 at the midpoint → 1.
pub fn fade_opacity(progress: f64) -> f64 {
    (1.0 - 2.0 * progress.clamp(0.0, 1.0)).abs()
}

/// An in-flight transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    from: GeneratorState,
    to: GeneratorState,
    /// Colors shown at progress 0 when they differ from `from`'s palette.
    from_palette: Option<Vec<Srgb>>,
    kind: TransitionKind,
    start: f64,
}

impl Transition {
    /// Starts a transition at time `start` (seconds).
    pub fn new(from: GeneratorState, to: GeneratorState, kind: TransitionKind, start: f64) -> Self {
        Self {
            from,
            to,
            from_palette: None,
            kind,
            start,
        }
    }

    /// Starts the palette blend from `colors` instead of `from`'s palette,
    /// e.g. the blended colors of a transition this one interrupts.
    pub fn with_from_palette(mut self, colors: Option<Vec<Srgb>>) -> Self {
        self.from_palette = colors;
        self
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Moves the start time, e.g. when the first tick arrives after the
    /// transition was requested.
    pub fn restart_at(&mut self, start: f64) {
        self.start = start;
    }

    /// Replaces the target without restarting the clock.
    pub fn retarget(&mut self, to: GeneratorState) {
        self.to = to;
    }

    /// Progress in [0, 1] at time `now`.
    pub fn progress(&self, now: f64) -> f64 {
        let duration = self.kind.duration();
        if duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Global opacity at time `now`; only fades dip.
    pub fn opacity(&self, now: f64) -> f64 {
        match self.kind {
            TransitionKind::Fade => fade_opacity(self.progress(now)),
            TransitionKind::Instant | TransitionKind::Smooth => 1.0,
        }
    }

    /// The state to render at progress `t`.
    pub fn state_at(&self, t: f64) -> GeneratorState {
        match self.kind {
            TransitionKind::Smooth => interpolate_state(&self.from, &self.to, t),
            TransitionKind::Instant | TransitionKind::Fade => self.to.clone(),
        }
    }

    /// Interpolated palette colors for smooth transitions.
    pub fn palette_override(&self, t: f64) -> Option<Vec<Srgb>> {
        if self.kind != TransitionKind::Smooth {
            return None;
        }
        let to = Palette::resolve(&self.to.palette_id);
        let colors = match &self.from_palette {
            Some(from) => interpolate_palette_colors(from, to.colors(), t),
            None => {
                let from = Palette::resolve(&self.from.palette_id);
                interpolate_palette_colors(from.colors(), to.colors(), t)
            }
        };
        Some(colors)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Blends two states at `t` in [0, 1].
///
/// Numeric fields are interpolated linearly and angles along the shortest
/// arc; discrete fields (seed, ids, modes, flags) take the target's value.
/// `t >= 1` returns the target exactly.
pub fn interpolate_state(from: &GeneratorState, to: &GeneratorState, t: f64) -> GeneratorState {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t >= 1.0 {
        return to.clone();
    }
    let mut out = to.clone();
    macro_rules! blend {
        ($($field:ident),* $(,)?) => {
            $(out.$field = lerp(from.$field, to.$field, t);)*
        };
    }
    blend!(
        palette_variance,
        saturation,
        brightness,
        contrast,
        density,
        scale_base,
        scale_spread,
        motion_intensity,
        motion_speed,
        rotation_amount,
        rotation_speed,
        layer_opacity,
        background_brightness,
        outline_balance,
        outline_width,
        outlined_opacity,
        filled_opacity,
        hue_rotation_speed,
        palette_cycle_speed,
        canvas_hue_rotation_speed,
        depth_of_field_focus,
        depth_of_field_strength,
        bloom_threshold,
        bloom_intensity,
        noise_amount,
    );
    out.hue_shift = interpolate_hue(from.hue_shift, to.hue_shift, t);
    out.background_hue = interpolate_hue(from.background_hue, to.background_hue, t);
    out.gradient_direction = interpolate_hue(from.gradient_direction, to.gradient_direction, t);
    out
}
