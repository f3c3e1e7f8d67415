#![deny(unsafe_code)]
//! Runtime for spritefield compositions.
//!
//! The [`Controller`] owns the generator state and the prepared sprite and
//! is driven once per frame by the host through [`Controller::tick`]. It
//! advances the animation clocks, resolves any in-flight transition, draws
//! every tile onto a [`Surface`] and applies the post effects.
//!
//! Reference collaborators live here too: [`Raster`], a software surface
//! backed by a pixel buffer, and [`SpriteLibrary`], an asset resolver that
//! rasterizes the built-in sprite catalog.
//!
//! [`Surface`]: spritefield_core::Surface

pub mod assets;
pub mod clock;
pub mod controller;
pub mod effects;
pub mod raster;
#[cfg(feature = "png")]
pub mod snapshot;
pub mod transition;

pub use assets::SpriteLibrary;
pub use clock::{AnimationClock, PaletteCycle, SpeedSmoother};
pub use controller::{Controller, FrameStats, RunState};
pub use raster::Raster;
pub use transition::{Transition, TransitionKind};
