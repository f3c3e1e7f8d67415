//! The generator state: every user-tunable parameter of a composition.
//!
//! `GeneratorState` is a flat value object and the unit of persistence.
//! Numeric fields are always stored clamped to their documented range; the
//! `set_*` methods clamp, and [`GeneratorState::clamp_ranges`] re-clamps a
//! state that arrived from outside (JSON, a host UI).
//!
//! The `*_seed_suffix` fields carry no meaning beyond "changed = reroll the
//! matching random stream".

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

pub const PALETTE_VARIANCE: RangeInclusive<f64> = 0.0..=150.0;
pub const HUE_DEGREES: RangeInclusive<f64> = 0.0..=360.0;
pub const ADJUSTMENT_PERCENT: RangeInclusive<f64> = 0.0..=200.0;
pub const PERCENT: RangeInclusive<f64> = 0.0..=100.0;
pub const MOTION_SPEED: RangeInclusive<f64> = 0.0..=300.0;
pub const ROTATION_AMOUNT: RangeInclusive<f64> = 0.0..=180.0;
pub const OUTLINE_WIDTH: RangeInclusive<f64> = 0.5..=12.0;
pub const THUMBNAIL_SECONDARY_MAX: u32 = 12;

/// Clamps `value` into `range`; NaN maps to the range start.
pub fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

/// Named per-tile motion function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionMode {
    Pulse,
    PulseMeander,
    #[default]
    Drift,
    Ripple,
    Zigzag,
    Cascade,
    Spiral,
    Comet,
    Linear,
    Isometric,
    Triangular,
}

impl MotionMode {
    /// All motion modes, in a stable order.
    pub const ALL: [MotionMode; 11] = [
        MotionMode::Pulse,
        MotionMode::PulseMeander,
        MotionMode::Drift,
        MotionMode::Ripple,
        MotionMode::Zigzag,
        MotionMode::Cascade,
        MotionMode::Spiral,
        MotionMode::Comet,
        MotionMode::Linear,
        MotionMode::Isometric,
        MotionMode::Triangular,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MotionMode::Pulse => "pulse",
            MotionMode::PulseMeander => "pulse-meander",
            MotionMode::Drift => "drift",
            MotionMode::Ripple => "ripple",
            MotionMode::Zigzag => "zigzag",
            MotionMode::Cascade => "cascade",
            MotionMode::Spiral => "spiral",
            MotionMode::Comet => "comet",
            MotionMode::Linear => "linear",
            MotionMode::Isometric => "isometric",
            MotionMode::Triangular => "triangular",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn list_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.name()).collect()
    }
}

/// Where the canvas background color comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundMode {
    /// A color from the sprite palette.
    #[default]
    Auto,
    /// A color from `background_palette_id`.
    Palette,
    /// A color built from `background_hue`.
    Custom,
    /// No background fill.
    Transparent,
}

/// How tiles are painted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    #[default]
    Solid,
    Gradient,
}

/// Aspect ratio of the layout grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    #[default]
    Square,
    Landscape,
    Portrait,
    Wide,
    Tall,
}

impl AspectRatio {
    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        match self {
            AspectRatio::Square => 1.0,
            AspectRatio::Landscape => 16.0 / 9.0,
            AspectRatio::Portrait => 9.0 / 16.0,
            AspectRatio::Wide => 21.0 / 9.0,
            AspectRatio::Tall => 4.0 / 5.0,
        }
    }
}

/// How much of a prepared composition a state change invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecomputeScope {
    /// Read live every frame; nothing to regenerate.
    None,
    /// Tints and background change; positions stay.
    Recolor,
    /// The tile list is regenerated.
    Full,
}

/// Every user-tunable parameter of a composition.
///
/// Percent fields use 100 as the neutral value unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorState {
    pub seed: String,
    pub palette_id: String,
    /// Jitter magnitude in percent, 0–150.
    pub palette_variance: f64,
    /// Global hue shift in degrees, 0–360.
    pub hue_shift: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub contrast: f64,

    /// Tile density in percent; extra layers appear at 38% and 70%.
    pub density: f64,
    pub scale_base: f64,
    pub scale_spread: f64,

    pub motion_mode: MotionMode,
    pub motion_intensity: f64,
    /// Motion speed in percent, 0–300.
    pub motion_speed: f64,

    pub rotation_enabled: bool,
    /// Maximum static rotation in degrees, 0–180.
    pub rotation_amount: f64,
    pub rotation_animated: bool,
    pub rotation_speed: f64,

    pub blend_mode: crate::canvas::BlendMode,
    pub blend_auto: bool,
    pub layer_opacity: f64,

    pub sprite_collection: String,
    pub selected_sprites: Vec<String>,

    pub background_mode: BackgroundMode,
    pub background_palette_id: String,
    pub background_hue: f64,
    pub background_brightness: f64,

    pub fill_mode: FillMode,
    pub gradient_direction: f64,
    pub gradient_randomize_direction: bool,
    pub gradient_randomize_colors: bool,

    pub outline_enabled: bool,
    pub outline_mixed: bool,
    /// Share of outlined tiles when mixed, in percent.
    pub outline_balance: f64,
    /// Stroke width in pixels, 0.5–12.
    pub outline_width: f64,
    pub outlined_opacity: f64,
    pub filled_opacity: f64,

    pub animation_enabled: bool,
    pub hue_rotation_enabled: bool,
    pub hue_rotation_speed: f64,
    pub palette_cycle_enabled: bool,
    pub palette_cycle_speed: f64,
    pub canvas_hue_rotation_enabled: bool,
    pub canvas_hue_rotation_speed: f64,

    pub aspect_ratio: AspectRatio,

    pub depth_of_field_enabled: bool,
    pub depth_of_field_focus: f64,
    pub depth_of_field_strength: f64,
    pub bloom_enabled: bool,
    pub bloom_threshold: f64,
    pub bloom_intensity: f64,
    pub noise_enabled: bool,
    pub noise_amount: f64,

    pub thumbnail_mode: bool,
    pub thumbnail_secondary_count: u32,
    pub thumbnail_accent: String,

    pub color_seed_suffix: String,
    pub blend_mode_seed_suffix: String,
    pub background_color_seed_suffix: String,
    pub gradient_color_seed_suffix: String,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            seed: "spritefield".to_string(),
            palette_id: crate::palette::DEFAULT_PALETTE_ID.to_string(),
            palette_variance: 20.0,
            hue_shift: 0.0,
            saturation: 100.0,
            brightness: 100.0,
            contrast: 100.0,
            density: 55.0,
            scale_base: 50.0,
            scale_spread: 50.0,
            motion_mode: MotionMode::Drift,
            motion_intensity: 50.0,
            motion_speed: 100.0,
            rotation_enabled: true,
            rotation_amount: 45.0,
            rotation_animated: false,
            rotation_speed: 30.0,
            blend_mode: crate::canvas::BlendMode::Normal,
            blend_auto: false,
            layer_opacity: 100.0,
            sprite_collection: crate::sprite::DEFAULT_COLLECTION.to_string(),
            selected_sprites: ["circle", "square", "triangle", "star"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            background_mode: BackgroundMode::Auto,
            background_palette_id: "midnight".to_string(),
            background_hue: 220.0,
            background_brightness: 35.0,
            fill_mode: FillMode::Solid,
            gradient_direction: 45.0,
            gradient_randomize_direction: false,
            gradient_randomize_colors: true,
            outline_enabled: false,
            outline_mixed: false,
            outline_balance: 50.0,
            outline_width: 2.0,
            outlined_opacity: 100.0,
            filled_opacity: 100.0,
            animation_enabled: true,
            hue_rotation_enabled: false,
            hue_rotation_speed: 50.0,
            palette_cycle_enabled: false,
            palette_cycle_speed: 50.0,
            canvas_hue_rotation_enabled: false,
            canvas_hue_rotation_speed: 50.0,
            aspect_ratio: AspectRatio::Square,
            depth_of_field_enabled: false,
            depth_of_field_focus: 50.0,
            depth_of_field_strength: 50.0,
            bloom_enabled: false,
            bloom_threshold: 70.0,
            bloom_intensity: 50.0,
            noise_enabled: false,
            noise_amount: 20.0,
            thumbnail_mode: false,
            thumbnail_secondary_count: 6,
            thumbnail_accent: "#c77dff".to_string(),
            color_seed_suffix: String::new(),
            blend_mode_seed_suffix: String::new(),
            background_color_seed_suffix: String::new(),
            gradient_color_seed_suffix: String::new(),
        }
    }
}

impl GeneratorState {
    /// Parses a state document. Missing keys take defaults; numeric values
    /// are clamped into range.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let mut state: GeneratorState =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidState(e.to_string()))?;
        state.clamp_ranges();
        Ok(state)
    }

    /// Serializes the state as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::InvalidState(e.to_string()))
    }

    /// Overlays the keys of a JSON object onto this state.
    ///
    /// Keys not present in `params` keep their current values. Fails if
    /// `params` is not an object or a value has the wrong type.
    pub fn apply_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let overrides = params.as_object().ok_or_else(|| {
            EngineError::InvalidState("parameter overrides must be a JSON object".to_string())
        })?;
        let mut merged =
            serde_json::to_value(&*self).map_err(|e| EngineError::InvalidState(e.to_string()))?;
        if let Some(target) = merged.as_object_mut() {
            for (key, value) in overrides {
                if !target.contains_key(key) {
                    return Err(EngineError::InvalidState(format!(
                        "unknown state field: {key}"
                    )));
                }
                target.insert(key.clone(), value.clone());
            }
        }
        let mut next: GeneratorState =
            serde_json::from_value(merged).map_err(|e| EngineError::InvalidState(e.to_string()))?;
        next.clamp_ranges();
        *self = next;
        Ok(())
    }

    /// Re-clamps every numeric field into its documented range.
    pub fn clamp_ranges(&mut self) {
        self.palette_variance = clamp_to(self.palette_variance, &PALETTE_VARIANCE);
        self.hue_shift = clamp_to(self.hue_shift, &HUE_DEGREES);
        self.saturation = clamp_to(self.saturation, &ADJUSTMENT_PERCENT);
        self.brightness = clamp_to(self.brightness, &ADJUSTMENT_PERCENT);
        self.contrast = clamp_to(self.contrast, &ADJUSTMENT_PERCENT);
        self.density = clamp_to(self.density, &PERCENT);
        self.scale_base = clamp_to(self.scale_base, &PERCENT);
        self.scale_spread = clamp_to(self.scale_spread, &PERCENT);
        self.motion_intensity = clamp_to(self.motion_intensity, &PERCENT);
        self.motion_speed = clamp_to(self.motion_speed, &MOTION_SPEED);
        self.rotation_amount = clamp_to(self.rotation_amount, &ROTATION_AMOUNT);
        self.rotation_speed = clamp_to(self.rotation_speed, &PERCENT);
        self.layer_opacity = clamp_to(self.layer_opacity, &PERCENT);
        self.background_hue = clamp_to(self.background_hue, &HUE_DEGREES);
        self.background_brightness = clamp_to(self.background_brightness, &PERCENT);
        self.gradient_direction = clamp_to(self.gradient_direction, &HUE_DEGREES);
        self.outline_balance = clamp_to(self.outline_balance, &PERCENT);
        self.outline_width = clamp_to(self.outline_width, &OUTLINE_WIDTH);
        self.outlined_opacity = clamp_to(self.outlined_opacity, &PERCENT);
        self.filled_opacity = clamp_to(self.filled_opacity, &PERCENT);
        self.hue_rotation_speed = clamp_to(self.hue_rotation_speed, &PERCENT);
        self.palette_cycle_speed = clamp_to(self.palette_cycle_speed, &PERCENT);
        self.canvas_hue_rotation_speed = clamp_to(self.canvas_hue_rotation_speed, &PERCENT);
        self.depth_of_field_focus = clamp_to(self.depth_of_field_focus, &PERCENT);
        self.depth_of_field_strength = clamp_to(self.depth_of_field_strength, &PERCENT);
        self.bloom_threshold = clamp_to(self.bloom_threshold, &PERCENT);
        self.bloom_intensity = clamp_to(self.bloom_intensity, &PERCENT);
        self.noise_amount = clamp_to(self.noise_amount, &PERCENT);
        self.thumbnail_secondary_count = self.thumbnail_secondary_count.min(THUMBNAIL_SECONDARY_MAX);
    }

    /// Density as a fraction in [0, 1].
    pub fn density_fraction(&self) -> f64 {
        self.density / 100.0
    }

    /// Jitter variance as used by the color pipeline (0–1.5).
    pub fn variance_fraction(&self) -> f64 {
        self.palette_variance / 100.0
    }

    /// What a wholesale replacement of `old` by `new` invalidates.
    pub fn recompute_scope(old: &GeneratorState, new: &GeneratorState) -> RecomputeScope {
        let structural = old.seed != new.seed
            || old.palette_id != new.palette_id
            || old.palette_variance != new.palette_variance
            || old.density != new.density
            || old.scale_base != new.scale_base
            || old.scale_spread != new.scale_spread
            || old.motion_mode != new.motion_mode
            || old.blend_auto != new.blend_auto
            || old.sprite_collection != new.sprite_collection
            || old.selected_sprites != new.selected_sprites
            || old.background_mode != new.background_mode
            || old.background_palette_id != new.background_palette_id
            || old.fill_mode != new.fill_mode
            || old.gradient_direction != new.gradient_direction
            || old.gradient_randomize_direction != new.gradient_randomize_direction
            || old.gradient_randomize_colors != new.gradient_randomize_colors
            || old.outline_enabled != new.outline_enabled
            || old.outline_mixed != new.outline_mixed
            || old.outline_balance != new.outline_balance
            || old.palette_cycle_enabled != new.palette_cycle_enabled
            || old.aspect_ratio != new.aspect_ratio
            || old.depth_of_field_enabled != new.depth_of_field_enabled
            || old.thumbnail_mode != new.thumbnail_mode
            || old.thumbnail_secondary_count != new.thumbnail_secondary_count
            || old.thumbnail_accent != new.thumbnail_accent
            || old.color_seed_suffix != new.color_seed_suffix
            || old.blend_mode_seed_suffix != new.blend_mode_seed_suffix
            || old.background_color_seed_suffix != new.background_color_seed_suffix
            || old.gradient_color_seed_suffix != new.gradient_color_seed_suffix;
        if structural {
            return RecomputeScope::Full;
        }
        let tint = old.hue_shift != new.hue_shift
            || old.background_hue != new.background_hue
            || old.background_brightness != new.background_brightness;
        if tint {
            RecomputeScope::Recolor
        } else {
            RecomputeScope::None
        }
    }

    // -- Clamping setters --

    pub fn set_palette_variance(&mut self, value: f64) {
        self.palette_variance = clamp_to(value, &PALETTE_VARIANCE);
    }

    pub fn set_hue_shift(&mut self, degrees: f64) {
        self.hue_shift = clamp_to(degrees, &HUE_DEGREES);
    }

    pub fn set_saturation(&mut self, value: f64) {
        self.saturation = clamp_to(value, &ADJUSTMENT_PERCENT);
    }

    pub fn set_brightness(&mut self, value: f64) {
        self.brightness = clamp_to(value, &ADJUSTMENT_PERCENT);
    }

    pub fn set_contrast(&mut self, value: f64) {
        self.contrast = clamp_to(value, &ADJUSTMENT_PERCENT);
    }

    pub fn set_density(&mut self, value: f64) {
        self.density = clamp_to(value, &PERCENT);
    }

    pub fn set_scale_base(&mut self, value: f64) {
        self.scale_base = clamp_to(value, &PERCENT);
    }

    pub fn set_scale_spread(&mut self, value: f64) {
        self.scale_spread = clamp_to(value, &PERCENT);
    }

    pub fn set_motion_intensity(&mut self, value: f64) {
        self.motion_intensity = clamp_to(value, &PERCENT);
    }

    pub fn set_motion_speed(&mut self, value: f64) {
        self.motion_speed = clamp_to(value, &MOTION_SPEED);
    }

    pub fn set_rotation_amount(&mut self, degrees: f64) {
        self.rotation_amount = clamp_to(degrees, &ROTATION_AMOUNT);
    }

    pub fn set_rotation_speed(&mut self, value: f64) {
        self.rotation_speed = clamp_to(value, &PERCENT);
    }

    pub fn set_layer_opacity(&mut self, value: f64) {
        self.layer_opacity = clamp_to(value, &PERCENT);
    }

    pub fn set_background_hue(&mut self, degrees: f64) {
        self.background_hue = clamp_to(degrees, &HUE_DEGREES);
    }

    pub fn set_background_brightness(&mut self, value: f64) {
        self.background_brightness = clamp_to(value, &PERCENT);
    }

    pub fn set_gradient_direction(&mut self, degrees: f64) {
        self.gradient_direction = clamp_to(degrees, &HUE_DEGREES);
    }

    pub fn set_outline_balance(&mut self, value: f64) {
        self.outline_balance = clamp_to(value, &PERCENT);
    }

    pub fn set_outline_width(&mut self, pixels: f64) {
        self.outline_width = clamp_to(pixels, &OUTLINE_WIDTH);
    }

    pub fn set_outlined_opacity(&mut self, value: f64) {
        self.outlined_opacity = clamp_to(value, &PERCENT);
    }

    pub fn set_filled_opacity(&mut self, value: f64) {
        self.filled_opacity = clamp_to(value, &PERCENT);
    }

    pub fn set_hue_rotation_speed(&mut self, value: f64) {
        self.hue_rotation_speed = clamp_to(value, &PERCENT);
    }

    pub fn set_palette_cycle_speed(&mut self, value: f64) {
        self.palette_cycle_speed = clamp_to(value, &PERCENT);
    }

    pub fn set_canvas_hue_rotation_speed(&mut self, value: f64) {
        self.canvas_hue_rotation_speed = clamp_to(value, &PERCENT);
    }

    pub fn set_depth_of_field_focus(&mut self, value: f64) {
        self.depth_of_field_focus = clamp_to(value, &PERCENT);
    }

    pub fn set_depth_of_field_strength(&mut self, value: f64) {
        self.depth_of_field_strength = clamp_to(value, &PERCENT);
    }

    pub fn set_bloom_threshold(&mut self, value: f64) {
        self.bloom_threshold = clamp_to(value, &PERCENT);
    }

    pub fn set_bloom_intensity(&mut self, value: f64) {
        self.bloom_intensity = clamp_to(value, &PERCENT);
    }

    pub fn set_noise_amount(&mut self, value: f64) {
        self.noise_amount = clamp_to(value, &PERCENT);
    }

    pub fn set_thumbnail_secondary_count(&mut self, count: u32) {
        self.thumbnail_secondary_count = count.min(THUMBNAIL_SECONDARY_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variance_setter_clamps_both_ends() {
        let mut s = GeneratorState::default();
        s.set_palette_variance(-10.0);
        assert_eq!(s.palette_variance, 0.0);
        s.set_palette_variance(1000.0);
        assert_eq!(s.palette_variance, 150.0);
    }

    #[test]
    fn nan_clamps_to_range_start() {
        let mut s = GeneratorState::default();
        s.set_density(f64::NAN);
        assert_eq!(s.density, 0.0);
        s.set_outline_width(f64::NAN);
        assert_eq!(s.outline_width, 0.5);
    }

    #[test]
    fn thumbnail_count_is_capped() {
        let mut s = GeneratorState::default();
        s.set_thumbnail_secondary_count(99);
        assert_eq!(s.thumbnail_secondary_count, THUMBNAIL_SECONDARY_MAX);
    }

    #[test]
    fn json_round_trip_is_byte_identical() {
        let mut s = GeneratorState {
            seed: "reproduce-me".into(),
            palette_variance: 37.25,
            hue_shift: 123.456789,
            motion_mode: MotionMode::PulseMeander,
            selected_sprites: vec!["star".into(), "ghost".into()],
            color_seed_suffix: "-r3".into(),
            ..GeneratorState::default()
        };
        s.set_motion_speed(0.1 + 0.2);
        let first = s.to_json().unwrap();
        let restored = GeneratorState::from_json(&first).unwrap();
        assert_eq!(restored, s);
        assert_eq!(restored.to_json().unwrap(), first);
    }

    #[test]
    fn from_json_fills_missing_keys_with_defaults() {
        let s = GeneratorState::from_json(r#"{"seed": "only-seed"}"#).unwrap();
        assert_eq!(s.seed, "only-seed");
        assert_eq!(s.density, GeneratorState::default().density);
    }

    #[test]
    fn from_json_clamps_out_of_range_values() {
        let s = GeneratorState::from_json(r#"{"density": 400, "palette_variance": -3}"#).unwrap();
        assert_eq!(s.density, 100.0);
        assert_eq!(s.palette_variance, 0.0);
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        assert!(matches!(
            GeneratorState::from_json("{not json"),
            Err(EngineError::InvalidState(_))
        ));
        assert!(GeneratorState::from_json(r#"{"motion_mode": "teleport"}"#).is_err());
    }

    #[test]
    fn motion_mode_uses_kebab_case_names() {
        let json = serde_json::to_string(&MotionMode::PulseMeander).unwrap();
        assert_eq!(json, "\"pulse-meander\"");
        for mode in MotionMode::ALL {
            let via_serde: MotionMode =
                serde_json::from_value(json!(mode.name())).unwrap();
            assert_eq!(via_serde, mode);
            assert_eq!(MotionMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(MotionMode::from_name("teleport"), None);
    }

    #[test]
    fn apply_params_overrides_and_clamps() {
        let mut s = GeneratorState::default();
        s.apply_params(&json!({"density": 250, "seed": "p", "motion_mode": "spiral"}))
            .unwrap();
        assert_eq!(s.density, 100.0);
        assert_eq!(s.seed, "p");
        assert_eq!(s.motion_mode, MotionMode::Spiral);
        assert_eq!(s.scale_base, GeneratorState::default().scale_base);
    }

    #[test]
    fn apply_params_rejects_unknown_keys_and_non_objects() {
        let mut s = GeneratorState::default();
        assert!(s.apply_params(&json!({"warp_factor": 9})).is_err());
        assert!(s.apply_params(&json!([1, 2])).is_err());
        assert!(s.apply_params(&json!({"density": "lots"})).is_err());
        assert_eq!(s, GeneratorState::default());
    }

    #[test]
    fn recompute_scope_classifies_changes() {
        let base = GeneratorState::default();

        let mut kinetic = base.clone();
        kinetic.set_motion_intensity(90.0);
        kinetic.set_rotation_speed(80.0);
        kinetic.set_layer_opacity(10.0);
        assert_eq!(
            GeneratorState::recompute_scope(&base, &kinetic),
            RecomputeScope::None
        );

        let mut tint = base.clone();
        tint.set_hue_shift(90.0);
        assert_eq!(
            GeneratorState::recompute_scope(&base, &tint),
            RecomputeScope::Recolor
        );

        let mut layout = tint.clone();
        layout.set_scale_base(10.0);
        assert_eq!(
            GeneratorState::recompute_scope(&base, &layout),
            RecomputeScope::Full
        );

        let mut reroll = base.clone();
        reroll.gradient_color_seed_suffix = "x".into();
        assert_eq!(
            GeneratorState::recompute_scope(&base, &reroll),
            RecomputeScope::Full
        );
    }

    #[test]
    fn aspect_ratios_are_positive() {
        for ar in [
            AspectRatio::Square,
            AspectRatio::Landscape,
            AspectRatio::Portrait,
            AspectRatio::Wide,
            AspectRatio::Tall,
        ] {
            assert!(ar.ratio() > 0.0);
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clamped_values_stay_in_range(v in proptest::num::f64::ANY) {
                let mut s = GeneratorState::default();
                s.set_palette_variance(v);
                s.set_motion_speed(v);
                s.set_hue_shift(v);
                prop_assert!(PALETTE_VARIANCE.contains(&s.palette_variance));
                prop_assert!(MOTION_SPEED.contains(&s.motion_speed));
                prop_assert!(HUE_DEGREES.contains(&s.hue_shift));
            }

            #[test]
            fn json_round_trip_keeps_every_float_bit(
                hue_bits in any::<u64>(),
                speed_bits in any::<u64>(),
                density_bits in any::<u64>(),
            ) {
                let hue = f64::from_bits(hue_bits);
                let speed = f64::from_bits(speed_bits);
                let density = f64::from_bits(density_bits);
                prop_assume!(hue.is_finite() && speed.is_finite() && density.is_finite());
                let mut s = GeneratorState::default();
                s.set_hue_shift(hue);
                s.set_motion_speed(speed);
                s.set_density(density);

                let first = s.to_json().unwrap();
                let restored = GeneratorState::from_json(&first).unwrap();
                prop_assert_eq!(restored.hue_shift.to_bits(), s.hue_shift.to_bits());
                prop_assert_eq!(restored.motion_speed.to_bits(), s.motion_speed.to_bits());
                prop_assert_eq!(restored.density.to_bits(), s.density.to_bits());
                prop_assert_eq!(restored.to_json().unwrap(), first);
            }
        }
    }
}
