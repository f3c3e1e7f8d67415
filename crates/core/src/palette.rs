//! Built-in palette registry.
//!
//! Palettes are ordered lists of colors addressed by id. The order of
//! [`Palette::all`] is meaningful: palette cycling walks it front to back
//! and wraps around.

use std::sync::OnceLock;

use crate::color::Srgb;
use crate::error::EngineError;

/// Id of the palette used when a requested id is unknown.
pub const DEFAULT_PALETTE_ID: &str = "vapor";

const BUILTIN: &[(&str, &str, &[&str])] = &[
    (
        "vapor",
        "Vapor",
        &["#7b2d8e", "#c77dff", "#ff9ebb", "#80ced6", "#a0e7e5"],
    ),
    (
        "ocean",
        "Ocean",
        &["#001f3f", "#003366", "#005f73", "#0a9396", "#94d2bd"],
    ),
    (
        "neon",
        "Neon",
        &["#ff00ff", "#00ff41", "#ffff00", "#ff0080", "#00ffff"],
    ),
    (
        "earth",
        "Earth",
        &["#5c4033", "#8b6914", "#6b8e23", "#daa520", "#d2b48c"],
    ),
    (
        "fire",
        "Fire",
        &["#800000", "#cc0000", "#ff4500", "#ff8c00", "#ffd700"],
    ),
    (
        "sunset",
        "Sunset",
        &["#355070", "#6d597a", "#b56576", "#e56b6f", "#eaac8b"],
    ),
    (
        "forest",
        "Forest",
        &["#132a13", "#31572c", "#4f772d", "#90a955", "#ecf39e"],
    ),
    (
        "candy",
        "Candy",
        &["#ffadad", "#ffd6a5", "#fdffb6", "#caffbf", "#9bf6ff", "#bdb2ff"],
    ),
    (
        "midnight",
        "Midnight",
        &["#03045e", "#023e8a", "#0077b6", "#48cae4", "#ade8f4"],
    ),
    ("citrus", "Citrus", &["#f94144", "#f3722c", "#f9c74f", "#90be6d"]),
    (
        "glacier",
        "Glacier",
        &["#e0fbfc", "#c2dfe3", "#9db4c0", "#5c6b73", "#253237"],
    ),
    (
        "monochrome",
        "Monochrome",
        &["#000000", "#404040", "#808080", "#c0c0c0", "#ffffff"],
    ),
];

/// A named, ordered list of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    id: String,
    name: String,
    colors: Vec<Srgb>,
}

impl Palette {
    /// Creates a palette from explicit colors. Requires at least one color.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        colors: Vec<Srgb>,
    ) -> Result<Self, EngineError> {
        if colors.is_empty() {
            return Err(EngineError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            colors,
        })
    }

    /// Creates a palette by parsing hex color strings.
    pub fn from_hex(id: &str, name: &str, hexes: &[&str]) -> Result<Self, EngineError> {
        let colors: Result<Vec<Srgb>, EngineError> =
            hexes.iter().map(|h| Srgb::from_hex(h)).collect();
        Self::new(id, name, colors?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colors(&self) -> &[Srgb] {
        &self.colors
    }

    /// Returns the number of colors in this palette.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if this palette has no colors. (Always false for valid palettes.)
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, wrapping around the palette length.
    pub fn color(&self, index: usize) -> Srgb {
        self.colors[index % self.colors.len()]
    }

    /// All built-in palettes in cycling order.
    pub fn all() -> &'static [Palette] {
        static REGISTRY: OnceLock<Vec<Palette>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            BUILTIN
                .iter()
                .map(|(id, name, hexes)| {
                    Palette::from_hex(id, name, hexes).expect("built-in palette hex values are valid")
                })
                .collect()
        })
    }

    /// Looks up a built-in palette by id.
    pub fn by_id(id: &str) -> Option<&'static Palette> {
        Self::all().iter().find(|p| p.id == id)
    }

    /// Looks up a palette, falling back to [`DEFAULT_PALETTE_ID`] for unknown ids.
    pub fn resolve(id: &str) -> &'static Palette {
        Self::by_id(id).unwrap_or_else(|| {
            tracing::debug!(palette = id, "unknown palette id, using default");
            Self::default_palette()
        })
    }

    /// The fallback palette.
    pub fn default_palette() -> &'static Palette {
        let all = Self::all();
        all.iter()
            .find(|p| p.id == DEFAULT_PALETTE_ID)
            .unwrap_or(&all[0])
    }

    /// Position of `id` in [`Palette::all`], if it is a built-in.
    pub fn index_of(id: &str) -> Option<usize> {
        Self::all().iter().position(|p| p.id == id)
    }

    /// Ids of all built-in palettes.
    pub fn list_names() -> Vec<&'static str> {
        Self::all().iter().map(|p| p.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_with_empty_vec_returns_error() {
        assert!(Palette::new("x", "X", vec![]).is_err());
    }

    #[test]
    fn from_hex_with_invalid_hex_returns_error() {
        assert!(Palette::from_hex("x", "X", &["#ff0000", "#zzzzzz"]).is_err());
    }

    #[test]
    fn builtin_palettes_have_at_least_4_colors() {
        for p in Palette::all() {
            assert!(p.len() >= 4, "palette {} has {} colors", p.id(), p.len());
        }
    }

    #[test]
    fn builtin_ids_are_unique() {
        let names = Palette::list_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names.len(), sorted.len());
    }

    #[test]
    fn by_id_finds_known_palette() {
        let ocean = Palette::by_id("ocean").unwrap();
        assert_eq!(ocean.name(), "Ocean");
        assert_eq!(ocean.colors()[0].to_hex(), "#001f3f");
    }

    #[test]
    fn resolve_unknown_falls_back_to_default() {
        assert_eq!(Palette::resolve("no-such-palette").id(), DEFAULT_PALETTE_ID);
        assert_eq!(Palette::resolve("fire").id(), "fire");
    }

    #[test]
    fn color_wraps_index() {
        let p = Palette::by_id("citrus").unwrap();
        assert_eq!(p.color(p.len()), p.color(0));
        assert_eq!(p.color(p.len() * 3 + 1), p.color(1));
    }

    #[test]
    fn index_of_matches_all_order() {
        for (i, p) in Palette::all().iter().enumerate() {
            assert_eq!(Palette::index_of(p.id()), Some(i));
        }
        assert_eq!(Palette::index_of("missing"), None);
    }
}
