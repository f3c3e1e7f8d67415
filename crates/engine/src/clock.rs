//! Continuously accumulating animation clocks.
//!
//! Each clock advances only while its toggle (and the global animation
//! gate) is on, at a speed floored so a slow setting never freezes it
//! outright. Elapsed time is accumulated unwrapped; wrapping happens only
//! when a hue offset is read.

/// Seconds spent blending from one palette to the next while cycling.
pub const PALETTE_STEP_SECONDS: f64 = 30.0;

/// Time constant of the motion speed smoothing, in seconds.
pub const SPEED_TIME_CONSTANT: f64 = 0.35;

/// An accumulating timer with a period and a minimum speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    period: f64,
    min_speed: f64,
    elapsed: f64,
}

impl AnimationClock {
    pub const fn new(period: f64, min_speed: f64) -> Self {
        Self {
            period,
            min_speed,
            elapsed: 0.0,
        }
    }

    /// Sprite hue rotation: one turn per 10 units, 5% floor.
    pub const fn sprite_hue() -> Self {
        Self::new(10.0, 0.05)
    }

    /// Canvas background hue rotation: one turn per 12 units, 0.1% floor.
    pub const fn canvas_hue() -> Self {
        Self::new(12.0, 0.001)
    }

    /// Palette cycling: one palette step per [`PALETTE_STEP_SECONDS`].
    pub const fn palette_cycle() -> Self {
        Self::new(PALETTE_STEP_SECONDS, 0.05)
    }

    /// Advances by `dt * max(speed, min_speed)` when `enabled`.
    pub fn advance(&mut self, dt: f64, speed: f64, enabled: bool) {
        if !enabled || dt <= 0.0 {
            return;
        }
        let speed = if speed.is_nan() { 0.0 } else { speed };
        self.elapsed += dt * speed.max(self.min_speed);
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Hue rotation in degrees, in [0, 360).
    pub fn hue_offset(&self) -> f64 {
        (self.elapsed / self.period * 360.0).rem_euclid(360.0)
    }
}

/// Where palette cycling currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteCycle {
    /// Steps since the cycle started, modulo the palette count.
    pub from: usize,
    pub to: usize,
    /// Smooth-stepped blend factor in [0, 1].
    pub t: f64,
}

impl PaletteCycle {
    /// Position after `elapsed` seconds across `palette_count` palettes.
    ///
    /// Indices are relative to the palette the cycle started from.
    pub fn position(elapsed: f64, palette_count: usize) -> Self {
        if palette_count == 0 {
            return Self {
                from: 0,
                to: 0,
                t: 0.0,
            };
        }
        let steps = elapsed.max(0.0) / PALETTE_STEP_SECONDS;
        let whole = steps.floor();
        let from = (whole as u64 % palette_count as u64) as usize;
        Self {
            from,
            to: (from + 1) % palette_count,
            t: smoothstep(steps - whole),
        }
    }
}

/// Cubic ease with zero slope at both ends.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Exponential approach toward a target value.
///
/// Used for the global motion speed so slider changes never jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSmoother {
    current: f64,
    time_constant: f64,
}

impl SpeedSmoother {
    pub fn new(initial: f64) -> Self {
        Self {
            current: initial,
            time_constant: SPEED_TIME_CONSTANT,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// Moves toward `target` by `dt` seconds and returns the new value.
    pub fn update(&mut self, target: f64, dt: f64) -> f64 {
        if dt > 0.0 {
            let k = 1.0 - (-dt / self.time_constant).exp();
            self.current += (target - self.current) * k;
        }
        self.current
    }
}
