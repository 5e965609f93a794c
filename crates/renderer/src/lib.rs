//! Overlay image rendering for classified and continuous rasters.
//!
//! Produces the PNG overlays the map widget positions over its base tiles:
//! - indexed PNG (color type 3) from a classified grid plus bin palette
//! - RGBA PNG (color type 6) from continuous color-ramp rendering

pub mod compose;
pub mod png;
pub mod ramp;

pub use ramp::Ramp;

/// Rendering errors. Display failures propagate opaquely to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    #[error("Palette has {0} entries; indexed PNG allows at most 256")]
    PaletteTooLarge(usize),

    #[error("Buffer length {actual} does not match {width}x{height} image")]
    ShapeMismatch {
        actual: usize,
        width: usize,
        height: usize,
    },

    #[error("Palette index {index} out of range for {palette_len} entries")]
    IndexOutOfRange { index: u8, palette_len: usize },

    #[error("Invalid color ramp: {0}")]
    InvalidRamp(String),

    #[error("IDAT compression failed: {0}")]
    Compression(String),
}

impl From<RenderError> for drought_common::DroughtError {
    fn from(err: RenderError) -> Self {
        drought_common::DroughtError::RenderError(err.to_string())
    }
}
