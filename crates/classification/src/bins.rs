//! Severity bin tables and grid classification.

use crate::color::Color;
use drought_common::RasterGrid;
use rayon::prelude::*;
use serde::Deserialize;
use std::path::Path;

/// Minimum cell count before row-parallel classification pays off.
const PARALLEL_THRESHOLD: usize = 65_536;

/// One severity class: a half-open interval `[lower, upper)` with a label
/// and a display color. `None` bounds mean ±∞, so the first bin of a table
/// is unbounded below and the last unbounded above.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityBin {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub label: String,
    pub color: Color,
    /// Display override for the legend range column. Generated from the
    /// bounds when absent.
    pub range_text: Option<String>,
}

impl SeverityBin {
    pub fn new(lower: Option<f64>, upper: Option<f64>, label: &str, color: Color) -> Self {
        Self {
            lower,
            upper,
            label: label.to_string(),
            color,
            range_text: None,
        }
    }

    pub fn with_range_text(
        lower: Option<f64>,
        upper: Option<f64>,
        label: &str,
        color: Color,
        range_text: &str,
    ) -> Self {
        Self {
            range_text: Some(range_text.to_string()),
            ..Self::new(lower, upper, label, color)
        }
    }

    /// Lower-inclusive, upper-exclusive containment.
    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |lo| value >= lo) && self.upper.map_or(true, |up| value < up)
    }

    /// Human-readable range string for legends.
    pub fn range_text(&self) -> String {
        if let Some(text) = &self.range_text {
            return text.clone();
        }
        match (self.lower, self.upper) {
            (None, Some(up)) => format!("< {:.2}", up),
            (Some(lo), Some(up)) => format!("{:.2} to {:.2}", lo, up),
            (Some(lo), None) => format!(">= {:.2}", lo),
            (None, None) => "all values".to_string(),
        }
    }
}

/// An ordered, validated set of severity bins plus a distinguished missing
/// class for no-data cells.
///
/// Invariants, enforced once at construction: the bins partition the whole
/// real line — first bin unbounded below, last unbounded above, interior
/// bounds finite, each bin's upper bound exactly equal to the next bin's
/// lower bound. Classification is therefore total and needs no per-cell
/// error path.
#[derive(Debug, Clone)]
pub struct BinTable {
    pub name: Option<String>,
    bins: Vec<SeverityBin>,
    missing_label: String,
    missing_color: Color,
}

impl BinTable {
    /// Validate and build a table with the default missing class
    /// ("No data", transparent).
    pub fn new(bins: Vec<SeverityBin>) -> Result<Self, BinTableError> {
        Self::with_missing(bins, "No data", Color::transparent())
    }

    /// Validate and build a table with an explicit missing class.
    pub fn with_missing(
        bins: Vec<SeverityBin>,
        missing_label: &str,
        missing_color: Color,
    ) -> Result<Self, BinTableError> {
        if bins.is_empty() {
            return Err(BinTableError::Empty);
        }
        // The missing class takes one palette slot on top of the bins.
        if bins.len() > 254 {
            return Err(BinTableError::TooManyBins(bins.len()));
        }

        let last = bins.len() - 1;
        for (i, bin) in bins.iter().enumerate() {
            if i == 0 {
                if let Some(lo) = bin.lower {
                    return Err(BinTableError::BoundedBelow(lo));
                }
            } else if bin.lower.is_none() {
                return Err(BinTableError::UnboundedInterior {
                    label: bin.label.clone(),
                });
            }

            if i == last {
                if let Some(up) = bin.upper {
                    return Err(BinTableError::BoundedAbove(up));
                }
            } else if bin.upper.is_none() {
                return Err(BinTableError::UnboundedInterior {
                    label: bin.label.clone(),
                });
            }

            for bound in [bin.lower, bin.upper].into_iter().flatten() {
                if !bound.is_finite() {
                    return Err(BinTableError::NonFiniteBound {
                        label: bin.label.clone(),
                    });
                }
            }

            if let (Some(lo), Some(up)) = (bin.lower, bin.upper) {
                if lo >= up {
                    return Err(BinTableError::ReversedBounds {
                        label: bin.label.clone(),
                        lower: lo,
                        upper: up,
                    });
                }
            }
        }

        for pair in bins.windows(2) {
            // Interior bounds are guaranteed Some by the loop above.
            let upper = pair[0].upper.unwrap();
            let lower = pair[1].lower.unwrap();
            if upper < lower {
                return Err(BinTableError::Gap {
                    a: pair[0].label.clone(),
                    b: pair[1].label.clone(),
                    from: upper,
                    to: lower,
                });
            }
            if upper > lower {
                return Err(BinTableError::Overlap {
                    a: pair[0].label.clone(),
                    b: pair[1].label.clone(),
                    from: lower,
                    to: upper,
                });
            }
        }

        Ok(Self {
            name: None,
            bins,
            missing_label: missing_label.to_string(),
            missing_color,
        })
    }

    /// The fixed SPI severity table. Range strings reproduce the legend of
    /// the upstream dashboards; internally the intervals are half-open, so
    /// -2.00 is Severe, -1.50 Moderate, -1.00 Mild and 0.00 No drought.
    pub fn spi_default() -> Self {
        let bins = vec![
            SeverityBin::with_range_text(
                None,
                Some(-2.0),
                "Extreme drought",
                Color::opaque(255, 0, 0),
                "< -2.00",
            ),
            SeverityBin::with_range_text(
                Some(-2.0),
                Some(-1.5),
                "Severe drought",
                Color::opaque(255, 165, 0),
                "-1.99 to -1.50",
            ),
            SeverityBin::with_range_text(
                Some(-1.5),
                Some(-1.0),
                "Moderate drought",
                Color::opaque(255, 255, 0),
                "-1.49 to -1.00",
            ),
            SeverityBin::with_range_text(
                Some(-1.0),
                Some(0.0),
                "Mild drought",
                Color::opaque(255, 255, 255),
                "-0.99 to 0.00",
            ),
            SeverityBin::with_range_text(
                Some(0.0),
                None,
                "No drought",
                Color::opaque(0, 0, 255),
                "> 0.00",
            ),
        ];
        let mut table = Self::new(bins).expect("compiled-in SPI table is valid");
        table.name = Some("SPI drought severity".to_string());
        table
    }

    /// Load a table from a JSON classes document:
    ///
    /// ```json
    /// {
    ///   "name": "SPI drought severity",
    ///   "classes": [
    ///     { "max": -2.0, "color": "red", "label": "Extreme drought" },
    ///     { "min": -2.0, "max": -1.5, "color": "orange", "label": "Severe drought" },
    ///     { "min": 0.0, "color": "blue", "label": "No drought" }
    ///   ],
    ///   "missing": { "label": "No data", "color": "transparent" }
    /// }
    /// ```
    ///
    /// Absent `min`/`max` mean unbounded; an optional `range` field per
    /// class overrides the legend range string.
    pub fn from_json(json: &str) -> Result<Self, BinTableError> {
        let doc: ClassesDoc =
            serde_json::from_str(json).map_err(|e| BinTableError::Parse(e.to_string()))?;

        let bins = doc
            .classes
            .into_iter()
            .map(|c| SeverityBin {
                lower: c.min,
                upper: c.max,
                label: c.label,
                color: c.color,
                range_text: c.range,
            })
            .collect();

        let mut table = match doc.missing {
            Some(m) => Self::with_missing(bins, &m.label, m.color)?,
            None => Self::new(bins)?,
        };
        table.name = doc.name;
        Ok(table)
    }

    /// Load a table from a JSON classes file.
    pub fn from_style_file(path: impl AsRef<Path>) -> Result<Self, BinTableError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BinTableError::Io(e.to_string()))?;
        Self::from_json(&content)
    }

    pub fn bins(&self) -> &[SeverityBin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn missing_label(&self) -> &str {
        &self.missing_label
    }

    pub fn missing_color(&self) -> Color {
        self.missing_color
    }

    /// Palette index reserved for missing cells.
    pub fn missing_index(&self) -> u8 {
        self.bins.len() as u8
    }

    /// Classify one value. Missing (non-finite) input is checked before the
    /// thresholds and never resolves to a severity class.
    pub fn classify(&self, value: f64) -> CellClass<'_> {
        if !value.is_finite() {
            return CellClass::Missing {
                label: &self.missing_label,
                color: self.missing_color,
            };
        }
        CellClass::Bin(&self.bins[self.classify_index(value) as usize])
    }

    /// Bin index for a value; `missing_index()` for non-finite input.
    ///
    /// The bins are contiguous and lower-inclusive, so the first bin whose
    /// upper bound exceeds the value is the unique match. Bin counts are
    /// small and fixed, so this is a constant number of comparisons.
    pub fn classify_index(&self, value: f64) -> u8 {
        if !value.is_finite() {
            return self.missing_index();
        }
        for (i, bin) in self.bins.iter().enumerate() {
            match bin.upper {
                Some(up) if value < up => return i as u8,
                None => return i as u8,
                _ => {}
            }
        }
        // Unreachable: the last bin is unbounded above.
        (self.bins.len() - 1) as u8
    }

    /// Classify every cell of a grid. No-data sentinel cells and NaN map to
    /// the missing index; the result always has the input shape. Large
    /// grids classify cell-parallel — cells are independent, so the output
    /// is identical either way.
    pub fn classify_grid(&self, grid: &RasterGrid) -> ClassifiedGrid {
        let cell = |v: &f32| -> u8 {
            if grid.is_missing(*v) {
                self.missing_index()
            } else {
                self.classify_index(*v as f64)
            }
        };

        let indices: Vec<u8> = if grid.len() >= PARALLEL_THRESHOLD {
            grid.data().par_iter().map(cell).collect()
        } else {
            grid.data().iter().map(cell).collect()
        };

        ClassifiedGrid {
            indices,
            width: grid.width(),
            height: grid.height(),
        }
    }

    /// Bin colors in table order followed by the missing color — directly
    /// usable as an indexed-PNG palette.
    pub fn palette(&self) -> Vec<(u8, u8, u8, u8)> {
        self.bins
            .iter()
            .map(|b| b.color.to_rgba())
            .chain(std::iter::once(self.missing_color.to_rgba()))
            .collect()
    }
}

/// Result of classifying a single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellClass<'a> {
    Bin(&'a SeverityBin),
    Missing { label: &'a str, color: Color },
}

impl CellClass<'_> {
    pub fn label(&self) -> &str {
        match self {
            CellClass::Bin(bin) => &bin.label,
            CellClass::Missing { label, .. } => label,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            CellClass::Bin(bin) => bin.color,
            CellClass::Missing { color, .. } => *color,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellClass::Missing { .. })
    }
}

/// A classified grid: one palette index per input cell, same shape as the
/// source raster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedGrid {
    indices: Vec<u8>,
    width: usize,
    height: usize,
}

impl ClassifiedGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn index_at(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.indices[y * self.width + x])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Validation and loading errors, reported once at table construction.
#[derive(Debug, thiserror::Error)]
pub enum BinTableError {
    #[error("Bin table must contain at least one bin")]
    Empty,

    #[error("Bin table has {0} bins; at most 254 fit an indexed palette")]
    TooManyBins(usize),

    #[error("First bin must be unbounded below, found lower bound {0}")]
    BoundedBelow(f64),

    #[error("Last bin must be unbounded above, found upper bound {0}")]
    BoundedAbove(f64),

    #[error("Interior bin '{label}' must be bounded on both sides")]
    UnboundedInterior { label: String },

    #[error("Bin '{label}' has a non-finite bound")]
    NonFiniteBound { label: String },

    #[error("Bin '{label}' has reversed bounds: {lower} >= {upper}")]
    ReversedBounds {
        label: String,
        lower: f64,
        upper: f64,
    },

    #[error("Gap between '{a}' and '{b}': ({from}, {to}) is uncovered")]
    Gap {
        a: String,
        b: String,
        from: f64,
        to: f64,
    },

    #[error("Overlap between '{a}' and '{b}': ({from}, {to}) is double-covered")]
    Overlap {
        a: String,
        b: String,
        from: f64,
        to: f64,
    },

    #[error("Failed to read bin table file: {0}")]
    Io(String),

    #[error("Failed to parse bin table: {0}")]
    Parse(String),
}

#[derive(Deserialize)]
struct ClassesDoc {
    #[serde(default)]
    name: Option<String>,
    classes: Vec<ClassBreakDef>,
    #[serde(default)]
    missing: Option<MissingDef>,
}

#[derive(Deserialize)]
struct ClassBreakDef {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    color: Color,
    label: String,
    #[serde(default)]
    range: Option<String>,
}

#[derive(Deserialize)]
struct MissingDef {
    #[serde(default = "default_missing_label")]
    label: String,
    color: Color,
}

fn default_missing_label() -> String {
    "No data".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bins(split: f64) -> Vec<SeverityBin> {
        vec![
            SeverityBin::new(None, Some(split), "low", Color::opaque(255, 0, 0)),
            SeverityBin::new(Some(split), None, "high", Color::opaque(0, 0, 255)),
        ]
    }

    #[test]
    fn test_valid_table_accepted() {
        assert!(BinTable::new(two_bins(0.0)).is_ok());
        assert!(BinTable::spi_default().len() == 5);
    }

    #[test]
    fn test_rejects_bounded_ends() {
        let bins = vec![
            SeverityBin::new(Some(-5.0), Some(0.0), "low", Color::opaque(255, 0, 0)),
            SeverityBin::new(Some(0.0), None, "high", Color::opaque(0, 0, 255)),
        ];
        assert!(matches!(
            BinTable::new(bins),
            Err(BinTableError::BoundedBelow(_))
        ));

        let bins = vec![
            SeverityBin::new(None, Some(0.0), "low", Color::opaque(255, 0, 0)),
            SeverityBin::new(Some(0.0), Some(5.0), "high", Color::opaque(0, 0, 255)),
        ];
        assert!(matches!(
            BinTable::new(bins),
            Err(BinTableError::BoundedAbove(_))
        ));
    }

    #[test]
    fn test_rejects_gap_and_overlap() {
        let bins = vec![
            SeverityBin::new(None, Some(-1.0), "low", Color::opaque(255, 0, 0)),
            SeverityBin::new(Some(0.0), None, "high", Color::opaque(0, 0, 255)),
        ];
        assert!(matches!(BinTable::new(bins), Err(BinTableError::Gap { .. })));

        let bins = vec![
            SeverityBin::new(None, Some(1.0), "low", Color::opaque(255, 0, 0)),
            SeverityBin::new(Some(0.0), None, "high", Color::opaque(0, 0, 255)),
        ];
        assert!(matches!(
            BinTable::new(bins),
            Err(BinTableError::Overlap { .. })
        ));
    }

    #[test]
    fn test_rejects_reversed_and_nonfinite_bounds() {
        let bins = vec![
            SeverityBin::new(None, Some(1.0), "low", Color::opaque(255, 0, 0)),
            SeverityBin::new(Some(1.0), Some(0.5), "mid", Color::opaque(0, 255, 0)),
            SeverityBin::new(Some(0.5), None, "high", Color::opaque(0, 0, 255)),
        ];
        assert!(matches!(
            BinTable::new(bins),
            Err(BinTableError::ReversedBounds { .. })
        ));

        let bins = vec![
            SeverityBin::new(None, Some(f64::INFINITY), "low", Color::opaque(255, 0, 0)),
            SeverityBin::new(Some(f64::INFINITY), None, "high", Color::opaque(0, 0, 255)),
        ];
        assert!(matches!(
            BinTable::new(bins),
            Err(BinTableError::NonFiniteBound { .. })
        ));
    }

    #[test]
    fn test_rejects_unbounded_interior() {
        let bins = vec![
            SeverityBin::new(None, Some(0.0), "low", Color::opaque(255, 0, 0)),
            SeverityBin::new(Some(0.0), None, "mid", Color::opaque(0, 255, 0)),
            SeverityBin::new(Some(1.0), None, "high", Color::opaque(0, 0, 255)),
        ];
        assert!(matches!(
            BinTable::new(bins),
            Err(BinTableError::UnboundedInterior { .. })
        ));
    }

    #[test]
    fn test_classify_boundary_goes_up() {
        let table = BinTable::new(two_bins(0.0)).unwrap();
        // Lower-inclusive: the shared bound belongs to the upper bin.
        assert_eq!(table.classify_index(0.0), 1);
        assert_eq!(table.classify_index(-f64::EPSILON), 0);
    }

    #[test]
    fn test_missing_index_is_after_bins() {
        let table = BinTable::spi_default();
        assert_eq!(table.missing_index(), 5);
        assert_eq!(table.classify_index(f64::NAN), 5);
        assert_eq!(table.palette().len(), 6);
    }

    #[test]
    fn test_from_json_round_trip() {
        let json = r##"{
            "name": "test",
            "classes": [
                { "max": -2.0, "color": "red", "label": "Extreme drought" },
                { "min": -2.0, "max": 0.0, "color": "#FFA500", "label": "Drought" },
                { "min": 0.0, "color": [0, 0, 255], "label": "No drought" }
            ],
            "missing": { "label": "No data", "color": "transparent" }
        }"##;
        let table = BinTable::from_json(json).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.name.as_deref(), Some("test"));
        assert_eq!(table.classify(-3.0).label(), "Extreme drought");
        assert_eq!(table.classify(-1.0).label(), "Drought");
        assert_eq!(table.missing_label(), "No data");
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let json = r##"{
            "classes": [
                { "max": -1.0, "color": "red", "label": "a" },
                { "min": 0.0, "color": "blue", "label": "b" }
            ]
        }"##;
        assert!(matches!(
            BinTable::from_json(json),
            Err(BinTableError::Gap { .. })
        ));

        assert!(matches!(
            BinTable::from_json("not json"),
            Err(BinTableError::Parse(_))
        ));
    }
}
