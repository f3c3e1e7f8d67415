//! Named random sub-streams derived from the master seed.
//!
//! Every random decision in a composition draws from one of a handful of
//! streams, each keyed by `"{seed}-{purpose}{suffix}"`. Changing the suffix
//! of one purpose reshuffles that aspect alone: positions, colors, blend
//! modes and sprite picks never share a generator.

use crate::prng::Mulberry32;
use crate::state::GeneratorState;

/// The aspect of a composition a random stream is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamPurpose {
    /// Kinetic per-tile randomness: rotation, phase, animation multipliers.
    Base,
    /// Palette jitter and per-tile palette index.
    Color,
    /// Grid shuffle, jitter and tile scale.
    Position,
    /// Sprite picks from the selection set.
    Sprite,
    /// Auto blend-mode assignment.
    Blend,
    /// Per-tile gradient second color and angle.
    Gradient,
    /// Background palette index.
    Background,
}

impl StreamPurpose {
    /// All purposes, in a stable order.
    pub const ALL: [StreamPurpose; 7] = [
        StreamPurpose::Base,
        StreamPurpose::Color,
        StreamPurpose::Position,
        StreamPurpose::Sprite,
        StreamPurpose::Blend,
        StreamPurpose::Gradient,
        StreamPurpose::Background,
    ];

    /// Key fragment hashed into the stream seed.
    pub fn as_str(self) -> &'static str {
        match self {
            StreamPurpose::Base => "base",
            StreamPurpose::Color => "color",
            StreamPurpose::Position => "position",
            StreamPurpose::Sprite => "sprite-selection",
            StreamPurpose::Blend => "blend-mode",
            StreamPurpose::Gradient => "gradient-color",
            StreamPurpose::Background => "background-color",
        }
    }

    /// The reroll suffix the state carries for this purpose, or `""`.
    pub fn suffix_of(self, state: &GeneratorState) -> &str {
        match self {
            StreamPurpose::Color => &state.color_seed_suffix,
            StreamPurpose::Blend => &state.blend_mode_seed_suffix,
            StreamPurpose::Gradient => &state.gradient_color_seed_suffix,
            StreamPurpose::Background => &state.background_color_seed_suffix,
            StreamPurpose::Base | StreamPurpose::Position | StreamPurpose::Sprite => "",
        }
    }
}

/// Builds the stream key `"{seed}-{purpose}{suffix}"`.
pub fn stream_key(seed: &str, purpose: StreamPurpose, suffix: &str) -> String {
    format!("{seed}-{}{suffix}", purpose.as_str())
}

/// Creates the generator for `(seed, purpose, suffix)`.
pub fn seed_stream(seed: &str, purpose: StreamPurpose, suffix: &str) -> Mulberry32 {
    Mulberry32::from_str_seed(&stream_key(seed, purpose, suffix))
}

/// Creates the generator for `purpose` using the state's seed and suffix.
pub fn state_stream(state: &GeneratorState, purpose: StreamPurpose) -> Mulberry32 {
    seed_stream(&state.seed, purpose, purpose.suffix_of(state))
}
