#![deny(unsafe_code)]
//! Core types for the spritefield procedural animation engine.
//!
//! Provides the `GeneratorState` value object, deterministic seed streams
//! over the `Mulberry32` PRNG, the HSL color pipeline, built-in palettes,
//! the sprite catalog and `AssetResolver` seam, and the `Surface` trait the
//! frame loop draws against.

pub mod canvas;
pub mod color;
pub mod error;
pub mod palette;
pub mod pixels;
pub mod prng;
pub mod seed;
pub mod sprite;
pub mod state;
pub mod surface;

pub use canvas::{BlendMode, Paint};
pub use color::{Hsl, Srgb};
pub use error::EngineError;
pub use palette::Palette;
pub use pixels::{PixelBuffer, Rgba};
pub use prng::Mulberry32;
pub use seed::StreamPurpose;
pub use sprite::{AssetResolver, SpriteCatalog, SpriteImage, SpriteSource};
pub use state::{GeneratorState, MotionMode, RecomputeScope};
pub use surface::Surface;
