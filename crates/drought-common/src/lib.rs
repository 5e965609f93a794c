//! Common types and utilities shared across all drought-monitor crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod index;

pub use bbox::BoundingBox;
pub use error::{DroughtError, DroughtResult};
pub use grid::RasterGrid;
pub use index::DroughtIndex;
