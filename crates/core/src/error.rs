//! Error types for the spritefield core.
//!
//! Most runtime degradation in the engine is handled by fallbacks (unknown
//! palettes, missing sprites, out-of-range sliders). These errors cover the
//! remaining boundary failures: parsing, dimensions and I/O.

use thiserror::Error;

/// Errors produced at the engine's input/output boundaries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A pixel buffer had a different size than the operation expected.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// A generator state document could not be parsed or serialized.
    #[error("invalid generator state: {0}")]
    InvalidState(String),

    /// Writing or reading an external artifact failed.
    #[error("i/o error: {0}")]
    Io(String),
}
