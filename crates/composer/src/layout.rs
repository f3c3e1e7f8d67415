//! Layer gating, tile counts, scale ranges and grid placement.

use spritefield_core::prng::Mulberry32;
use spritefield_core::state::GeneratorState;
use spritefield_motion::{Movement, CENTER_PULL};

/// Maximum tile count of a full-density front layer.
pub const MAX_TILES: usize = 50;

/// Number of layers attempted per composition.
pub const LAYER_COUNT: usize = 3;

/// Density fraction at which each layer switches on.
pub const LAYER_THRESHOLDS: [f64; LAYER_COUNT] = [0.0, 0.38, 0.70];

/// Share of [`MAX_TILES`] each layer may hold.
pub const LAYER_FRACTIONS: [f64; LAYER_COUNT] = [1.0, 0.7, 0.5];

/// Tile size of each layer relative to the first.
pub const LAYER_BASE_SIZES: [f64; LAYER_COUNT] = [1.0, 0.6, 0.35];

pub const LAYER_OPACITIES: [f64; LAYER_COUNT] = [1.0, 0.9, 0.8];

/// Tile-count multiplier while depth of field is on.
pub const DOF_PERFORMANCE_MULTIPLIER: f64 = 0.7;

/// Fraction of a layer's tiles present at zero density.
const MIN_LAYER_FILL: f64 = 0.12;

/// Max random displacement from a cell center, in cells.
const CELL_JITTER: f64 = 0.4;

pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 2.4;

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Tile scale bounds derived from the scale sliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    pub base: f64,
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    pub fn from_state(state: &GeneratorState) -> Self {
        let base = lerp(MIN_SCALE, MAX_SCALE, state.scale_base / 100.0);
        let spread = state.scale_spread / 100.0;
        Self {
            base,
            min: lerp(base, MIN_SCALE, spread),
            max: lerp(base, MAX_SCALE, spread),
        }
    }

    /// Scale at `t` in [0, 1] between `min` and `max`.
    pub fn at(&self, t: f64) -> f64 {
        lerp(self.min, self.max, t)
    }
}

/// True if `layer` is switched on at the state's density.
pub fn layer_enabled(state: &GeneratorState, layer: usize) -> bool {
    layer < LAYER_COUNT && state.density_fraction() >= LAYER_THRESHOLDS[layer]
}

/// Tile count for an enabled layer; at least one.
pub fn tile_count(state: &GeneratorState, layer: usize) -> usize {
    let threshold = LAYER_THRESHOLDS[layer];
    let layer_density = ((state.density_fraction() - threshold) / (1.0 - threshold)).clamp(0.0, 1.0);
    let dof = if state.depth_of_field_enabled {
        DOF_PERFORMANCE_MULTIPLIER
    } else {
        1.0
    };
    let count = MAX_TILES as f64
        * state.motion_mode.tile_count_multiplier()
        * dof
        * LAYER_FRACTIONS[layer]
        * lerp(MIN_LAYER_FILL, 1.0, layer_density);
    (count.round() as usize).max(1)
}

/// Places `count` tiles on a grid matching the state's aspect ratio.
///
/// Cells are shuffled by `rng`, then each position is jittered within its
/// cell; center-pulling modes move every position toward the middle.
pub fn grid_positions(state: &GeneratorState, count: usize, rng: &mut Mulberry32) -> Vec<(f64, f64)> {
    if count == 0 {
        return Vec::new();
    }
    let aspect = state.aspect_ratio.ratio();
    let cols = ((count as f64 * aspect).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(cols);
    let mut cells: Vec<usize> = (0..cols * rows).collect();
    rng.shuffle(&mut cells);
    let pull = state.motion_mode.pulls_toward_center();

    cells
        .into_iter()
        .take(count)
        .map(|cell| {
            let (col, row) = (cell % cols, cell / cols);
            let jx = rng.next_range(-CELL_JITTER, CELL_JITTER);
            let jy = rng.next_range(-CELL_JITTER, CELL_JITTER);
            let mut u = (col as f64 + 0.5 + jx) / cols as f64;
            let mut v = (row as f64 + 0.5 + jy) / rows as f64;
            if pull {
                u = 0.5 + (u - 0.5) * (1.0 - CENTER_PULL);
                v = 0.5 + (v - 0.5) * (1.0 - CENTER_PULL);
            }
            (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spritefield_core::state::{AspectRatio, MotionMode};

    fn state_with_density(density: f64) -> GeneratorState {
        let mut s = GeneratorState::default();
        s.set_density(density);
        s
    }

    #[test]
    fn layers_gate_on_density_thresholds() {
        let low = state_with_density(20.0);
        assert!(layer_enabled(&low, 0));
        assert!(!layer_enabled(&low, 1));
        let mid = state_with_density(38.0);
        assert!(layer_enabled(&mid, 1));
        assert!(!layer_enabled(&mid, 2));
        let high = state_with_density(70.0);
        assert!(layer_enabled(&high, 2));
        assert!(!layer_enabled(&high, 3));
    }

    #[test]
    fn tile_count_grows_with_density_and_is_at_least_one() {
        let sparse = tile_count(&state_with_density(0.0), 0);
        let dense = tile_count(&state_with_density(100.0), 0);
        assert!(sparse >= 1);
        assert!(dense > sparse);
        assert_eq!(dense, MAX_TILES);
        assert_eq!(tile_count(&state_with_density(38.0), 1), 4);
    }

    #[test]
    fn spiral_spawns_more_tiles_and_dof_fewer() {
        let mut s = state_with_density(100.0);
        s.motion_mode = MotionMode::Spiral;
        assert_eq!(tile_count(&s, 0), 70);
        s.depth_of_field_enabled = true;
        assert_eq!(tile_count(&s, 0), 49);
    }

    #[test]
    fn scale_range_spans_constants_at_full_spread() {
        let mut s = GeneratorState::default();
        s.set_scale_spread(100.0);
        let r = ScaleRange::from_state(&s);
        assert!((r.min - MIN_SCALE).abs() < 1e-12);
        assert!((r.max - MAX_SCALE).abs() < 1e-12);
        s.set_scale_spread(0.0);
        let r = ScaleRange::from_state(&s);
        assert_eq!(r.min, r.base);
        assert_eq!(r.max, r.base);
    }

    #[test]
    fn grid_positions_are_unique_cells_in_unit_square() {
        let mut s = GeneratorState::default();
        s.aspect_ratio = AspectRatio::Wide;
        let mut rng = Mulberry32::new(9);
        let pts = grid_positions(&s, 37, &mut rng);
        assert_eq!(pts.len(), 37);
        for (u, v) in &pts {
            assert!((0.0..=1.0).contains(u));
            assert!((0.0..=1.0).contains(v));
        }
    }

    #[test]
    fn center_pull_shrinks_the_spread() {
        let mut s = GeneratorState::default();
        let spread = |s: &GeneratorState| {
            let mut rng = Mulberry32::new(4);
            grid_positions(s, 40, &mut rng)
                .iter()
                .map(|(u, v)| (u - 0.5).abs().max((v - 0.5).abs()))
                .fold(0.0, f64::max)
        };
        s.motion_mode = MotionMode::Drift;
        let free = spread(&s);
        s.motion_mode = MotionMode::Spiral;
        let pulled = spread(&s);
        assert!(pulled < free);
        assert!(pulled <= 0.5 * (1.0 - CENTER_PULL) + 1e-12);
    }
}
