//! Sprite references, the sprite catalog and the asset resolver seam.
//!
//! Tiles refer to sprites by id. The [`SpriteCatalog`] knows which ids exist
//! and how they are grouped into collections, and resolves a requested id
//! through an ordered fallback chain. Drawable images are supplied by an
//! [`AssetResolver`], which the frame loop queries synchronously and asks to
//! load asynchronously on a miss.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Sprite drawn when nothing else can be resolved.
pub const DEFAULT_SPRITE: &str = "circle";

/// Collection used when the requested collection is unknown.
pub const DEFAULT_COLLECTION: &str = "geometric";

/// A square coverage mask in [0, 1], sampled in normalized coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    size: usize,
    coverage: Vec<f64>,
}

impl SpriteImage {
    /// Builds a mask by evaluating `f(u, v)` at every texel center.
    pub fn from_fn(size: usize, f: impl Fn(f64, f64) -> f64) -> Self {
        let size = size.max(1);
        let coverage = (0..size * size)
            .map(|i| {
                let u = ((i % size) as f64 + 0.5) / size as f64;
                let v = ((i / size) as f64 + 0.5) / size as f64;
                f(u, v).clamp(0.0, 1.0)
            })
            .collect();
        Self { size, coverage }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Nearest-texel coverage at `(u, v)`; 0 outside [0, 1]².
    pub fn sample(&self, u: f64, v: f64) -> f64 {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return 0.0;
        }
        let x = ((u * self.size as f64) as usize).min(self.size - 1);
        let y = ((v * self.size as f64) as usize).min(self.size - 1);
        self.coverage[y * self.size + x]
    }

    /// Coverage of a stroke of normalized width `width` along the mask edge.
    pub fn outline(&self, u: f64, v: f64, width: f64) -> f64 {
        let c = self.sample(u, v);
        if c <= 0.0 {
            return 0.0;
        }
        let interior = self
            .sample(u - width, v)
            .min(self.sample(u + width, v))
            .min(self.sample(u, v - width))
            .min(self.sample(u, v + width));
        (c - interior).clamp(0.0, 1.0)
    }
}

/// Supplies drawable sprite images.
///
/// `cached` must answer synchronously; `request` starts a load whose result
/// becomes visible through `cached` on a later frame. A failed load is
/// simply never cached, so the next draw of that sprite requests it again.
pub trait AssetResolver {
    /// Returns the image if it is already loaded.
    fn cached(&self, sprite: &str) -> Option<Rc<SpriteImage>>;

    /// Starts loading `sprite` in the background. Repeated requests are fine.
    fn request(&mut self, sprite: &str);
}

/// How a tile's sprite id was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum SpriteSource {
    /// The randomly picked sprite from the selection set.
    Selected(String),
    /// The pick was unknown; another selected sprite stood in.
    Substitute(String),
    /// No selected sprite was known; the active collection's first sprite.
    CollectionDefault(String),
    /// Nothing resolved; the hard-coded default asset.
    BuiltinDefault,
}

impl SpriteSource {
    /// The sprite id to draw.
    pub fn id(&self) -> &str {
        match self {
            SpriteSource::Selected(id)
            | SpriteSource::Substitute(id)
            | SpriteSource::CollectionDefault(id) => id,
            SpriteSource::BuiltinDefault => DEFAULT_SPRITE,
        }
    }
}

/// A named group of sprite ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteCollection {
    pub id: String,
    pub name: String,
    pub sprites: Vec<String>,
}

/// All known sprite collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteCatalog {
    collections: Vec<SpriteCollection>,
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SpriteCatalog {
    pub fn new(collections: Vec<SpriteCollection>) -> Self {
        Self { collections }
    }

    /// The collections shipped with the engine.
    pub fn builtin() -> Self {
        let collection = |id: &str, name: &str, sprites: &[&str]| SpriteCollection {
            id: id.to_string(),
            name: name.to_string(),
            sprites: sprites.iter().map(|s| s.to_string()).collect(),
        };
        Self::new(vec![
            collection(
                "geometric",
                "Geometric",
                &[
                    "circle", "square", "triangle", "diamond", "hexagon", "ring", "star", "cross",
                ],
            ),
            collection(
                "soft",
                "Soft",
                &["dot", "petal", "drop", "crescent", "blob"],
            ),
        ])
    }

    pub fn collections(&self) -> &[SpriteCollection] {
        &self.collections
    }

    pub fn collection(&self, id: &str) -> Option<&SpriteCollection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// True if any collection contains `sprite`.
    pub fn contains(&self, sprite: &str) -> bool {
        self.collections
            .iter()
            .any(|c| c.sprites.iter().any(|s| s == sprite))
    }

    /// Every sprite id, in collection order.
    pub fn all_sprites(&self) -> impl Iterator<Item = &str> + '_ {
        self.collections
            .iter()
            .flat_map(|c| c.sprites.iter().map(String::as_str))
    }

    /// Resolves `requested` through the fallback chain: the requested id,
    /// then any other known id in `selection`, then the first sprite of
    /// `collection` (or of the default collection), then [`DEFAULT_SPRITE`].
    pub fn resolve(&self, requested: &str, selection: &[String], collection: &str) -> SpriteSource {
        if self.contains(requested) {
            return SpriteSource::Selected(requested.to_string());
        }
        tracing::debug!(sprite = requested, "unknown sprite, trying fallbacks");
        if let Some(other) = selection
            .iter()
            .find(|s| s.as_str() != requested && self.contains(s))
        {
            return SpriteSource::Substitute(other.clone());
        }
        let first = self
            .collection(collection)
            .or_else(|| self.collection(DEFAULT_COLLECTION))
            .and_then(|c| c.sprites.first());
        match first {
            Some(id) => SpriteSource::CollectionDefault(id.clone()),
            None => SpriteSource::BuiltinDefault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_known_sprite_is_selected() {
        let catalog = SpriteCatalog::builtin();
        let source = catalog.resolve("star", &selection(&["star"]), "geometric");
        assert_eq!(source, SpriteSource::Selected("star".into()));
        assert_eq!(source.id(), "star");
    }

    #[test]
    fn resolve_unknown_uses_other_selected_sprite() {
        let catalog = SpriteCatalog::builtin();
        let source = catalog.resolve("ghost", &selection(&["ghost", "petal"]), "geometric");
        assert_eq!(source, SpriteSource::Substitute("petal".into()));
    }

    #[test]
    fn resolve_falls_back_to_collection_first_sprite() {
        let catalog = SpriteCatalog::builtin();
        let source = catalog.resolve("ghost", &selection(&["ghost", "phantom"]), "soft");
        assert_eq!(source, SpriteSource::CollectionDefault("dot".into()));
    }

    #[test]
    fn resolve_unknown_collection_uses_default_collection() {
        let catalog = SpriteCatalog::builtin();
        let source = catalog.resolve("ghost", &[], "nope");
        assert_eq!(source, SpriteSource::CollectionDefault("circle".into()));
    }

    #[test]
    fn resolve_with_empty_catalog_uses_builtin_default() {
        let catalog = SpriteCatalog::new(vec![]);
        let source = catalog.resolve("ghost", &[], "nope");
        assert_eq!(source, SpriteSource::BuiltinDefault);
        assert_eq!(source.id(), DEFAULT_SPRITE);
    }

    #[test]
    fn sprite_source_serializes_tagged() {
        let json = serde_json::to_value(SpriteSource::Substitute("dot".into())).unwrap();
        assert_eq!(json, serde_json::json!({"source": "substitute", "id": "dot"}));
    }

    #[test]
    fn image_sample_outside_is_zero() {
        let img = SpriteImage::from_fn(8, |_, _| 1.0);
        assert_eq!(img.sample(-0.1, 0.5), 0.0);
        assert_eq!(img.sample(0.5, 1.0), 0.0);
        assert_eq!(img.sample(0.5, 0.5), 1.0);
    }

    #[test]
    fn outline_is_strongest_at_edges() {
        let img = SpriteImage::from_fn(32, |u, v| {
            if (u - 0.5).hypot(v - 0.5) < 0.4 {
                1.0
            } else {
                0.0
            }
        });
        assert_eq!(img.outline(0.5, 0.5, 0.05), 0.0);
        assert_eq!(img.outline(0.5, 0.12, 0.05), 1.0);
    }
}
