//! Threshold classification of drought-index rasters.
//!
//! The classifier maps floating-point index values into an ordered set of
//! severity bins, each carrying a label and a display color. Bin tables are
//! static configuration: built once at startup (from a JSON classes document
//! or the compiled-in SPI default) and immutable thereafter. Malformed
//! tables are rejected at construction — classification itself is total and
//! never fails per cell.
//!
//! Boundary convention, applied uniformly: every bin is inclusive of its
//! lower bound and exclusive of its upper bound; the topmost bin has no
//! upper bound. The end bins are unbounded, so every real value (and every
//! NaN, via the missing class) maps to exactly one class.

pub mod bins;
pub mod color;
pub mod legend;

pub use bins::{BinTable, BinTableError, CellClass, ClassifiedGrid, SeverityBin};
pub use color::Color;
pub use legend::LegendEntry;
