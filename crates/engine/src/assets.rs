//! Procedural sprite library implementing [`AssetResolver`].
//!
//! Every sprite in the built-in catalog is a coverage mask generated from a
//! shape function. Requests are queued and only rasterized when the host
//! calls [`SpriteLibrary::pump`] between frames, so a first draw of any
//! sprite misses the cache exactly like a real asynchronous load would.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::rc::Rc;

use spritefield_core::sprite::{AssetResolver, SpriteImage};

/// Default mask edge length in texels.
pub const SPRITE_RESOLUTION: usize = 64;

/// Coverage at local coordinates in [-1, 1]², y pointing down.
type Shape = fn(f64, f64) -> f64;

fn inside(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn circle(x: f64, y: f64) -> f64 {
    inside(x.hypot(y) <= 0.9)
}

fn square(x: f64, y: f64) -> f64 {
    inside(x.abs().max(y.abs()) <= 0.8)
}

fn triangle(x: f64, y: f64) -> f64 {
    inside(y <= 0.7 && y >= -0.85 + 3f64.sqrt() * x.abs())
}

fn diamond(x: f64, y: f64) -> f64 {
    inside(x.abs() + y.abs() <= 0.9)
}

fn hexagon(x: f64, y: f64) -> f64 {
    const R: f64 = 0.85;
    let (x, y) = (x.abs(), y.abs());
    let root3 = 3f64.sqrt();
    inside(y <= R * root3 / 2.0 && root3 * x + y <= root3 * R)
}

fn ring(x: f64, y: f64) -> f64 {
    let r = x.hypot(y);
    inside((0.55..=0.9).contains(&r))
}

fn star(x: f64, y: f64) -> f64 {
    let r = x.hypot(y);
    let theta = y.atan2(x) + PI / 2.0;
    let spike = ((5.0 * theta).cos() * 0.5 + 0.5).powi(2);
    inside(r <= 0.42 + 0.5 * spike)
}

fn cross(x: f64, y: f64) -> f64 {
    let (x, y) = (x.abs(), y.abs());
    inside((x <= 0.3 && y <= 0.85) || (y <= 0.3 && x <= 0.85))
}

fn dot(x: f64, y: f64) -> f64 {
    let r = x.hypot(y);
    (1.0 - (r - 0.35) / 0.4).clamp(0.0, 1.0)
}

fn petal(x: f64, y: f64) -> f64 {
    inside((x / 0.45).powi(2) + (y / 0.9).powi(2) <= 1.0)
}

fn droplet(x: f64, y: f64) -> f64 {
    let bulb = x.hypot(y - 0.25) <= 0.6;
    let tip = (-0.9..=0.25).contains(&y) && x.abs() <= 0.6 * (y + 0.9) / 1.15;
    inside(bulb || tip)
}

fn crescent(x: f64, y: f64) -> f64 {
    inside(x.hypot(y) <= 0.85 && (x - 0.35).hypot(y + 0.15) > 0.7)
}

fn blob(x: f64, y: f64) -> f64 {
    let theta = y.atan2(x);
    let r = 0.7 + 0.12 * (3.0 * theta).sin() + 0.08 * (5.0 * theta).cos();
    inside(x.hypot(y) <= r)
}

/// Shape function for a sprite id, if the library knows it.
fn shape(id: &str) -> Option<Shape> {
    let f: Shape = match id {
        "circle" => circle,
        "square" => square,
        "triangle" => triangle,
        "diamond" => diamond,
        "hexagon" => hexagon,
        "ring" => ring,
        "star" => star,
        "cross" => cross,
        "dot" => dot,
        "petal" => petal,
        "drop" => droplet,
        "crescent" => crescent,
        "blob" => blob,
        _ => return None,
    };
    Some(f)
}

/// Cache of rasterized sprite masks with a pending-load queue.
#[derive(Debug)]
pub struct SpriteLibrary {
    resolution: usize,
    cache: HashMap<String, Rc<SpriteImage>>,
    pending: Vec<String>,
}

impl Default for SpriteLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteLibrary {
    pub fn new() -> Self {
        Self::with_resolution(SPRITE_RESOLUTION)
    }

    pub fn with_resolution(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(1),
            cache: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Sprite ids waiting for [`pump`](Self::pump).
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn is_loaded(&self, sprite: &str) -> bool {
        self.cache.contains_key(sprite)
    }

    /// Completes every pending load. Returns how many sprites were loaded.
    ///
    /// Unknown ids fail with a warning and leave the queue; they are queued
    /// again the next time a tile asks for them.
    pub fn pump(&mut self) -> usize {
        let mut loaded = 0;
        for id in std::mem::take(&mut self.pending) {
            match shape(&id) {
                Some(f) => {
                    let image = SpriteImage::from_fn(self.resolution, |u, v| {
                        f(u * 2.0 - 1.0, v * 2.0 - 1.0)
                    });
                    self.cache.insert(id, Rc::new(image));
                    loaded += 1;
                }
                None => tracing::warn!(sprite = %id, "sprite load failed: no such asset"),
            }
        }
        loaded
    }

    /// Requests and loads `ids` right away.
    pub fn preload<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> usize {
        for id in ids {
            self.request(id);
        }
        self.pump()
    }
}

impl AssetResolver for SpriteLibrary {
    fn cached(&self, sprite: &str) -> Option<Rc<SpriteImage>> {
        self.cache.get(sprite).cloned()
    }

    fn request(&mut self, sprite: &str) {
        if self.cache.contains_key(sprite) || self.pending.iter().any(|p| p == sprite) {
            return;
        }
        tracing::debug!(sprite, "queued sprite load");
        self.pending.push(sprite.to_string());
    }
}
