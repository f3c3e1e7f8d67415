#![deny(unsafe_code)]
//! Composer: turns a [`GeneratorState`] into a [`PreparedSprite`].
//!
//! A prepared sprite is three depth layers of positioned, tinted, scaled
//! tiles plus a background color. It is a pure function of the state (and an
//! optional palette override used while palettes cycle): the same inputs
//! always produce the same tiles, and each aspect of the layout draws from
//! its own seed stream so rerolling one aspect leaves the others intact.
//!
//! [`GeneratorState`]: spritefield_core::GeneratorState

pub mod compose;
pub mod layout;
pub mod prepared;
mod thumbnail;

pub use compose::Composer;
pub use layout::ScaleRange;
pub use prepared::{PreparedBackground, PreparedLayer, PreparedSprite, PreparedTile};
