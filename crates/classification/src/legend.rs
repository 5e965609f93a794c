//! Legend generation from bin tables.

use crate::bins::BinTable;
use serde::Serialize;

/// One legend row: label, display color (hex) and human-readable range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
    pub range: String,
}

impl BinTable {
    /// Ordered legend entries, one per severity bin.
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.bins()
            .iter()
            .map(|bin| LegendEntry {
                label: bin.label.clone(),
                color: bin.color.to_hex(),
                range: bin.range_text(),
            })
            .collect()
    }

    /// Legend entries with the missing class appended.
    pub fn legend_with_missing(&self) -> Vec<LegendEntry> {
        let mut entries = self.legend();
        entries.push(LegendEntry {
            label: self.missing_label().to_string(),
            color: self.missing_color().to_hex(),
            range: "no data".to_string(),
        });
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spi_legend_matches_dashboard_text() {
        let legend = BinTable::spi_default().legend();
        let rows: Vec<(&str, &str)> = legend
            .iter()
            .map(|e| (e.label.as_str(), e.range.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Extreme drought", "< -2.00"),
                ("Severe drought", "-1.99 to -1.50"),
                ("Moderate drought", "-1.49 to -1.00"),
                ("Mild drought", "-0.99 to 0.00"),
                ("No drought", "> 0.00"),
            ]
        );
    }

    #[test]
    fn test_legend_colors_are_hex() {
        let legend = BinTable::spi_default().legend();
        assert_eq!(legend[0].color, "#FF0000");
        assert_eq!(legend[4].color, "#0000FF");
    }

    #[test]
    fn test_legend_with_missing_appends_one_row() {
        let table = BinTable::spi_default();
        let legend = table.legend_with_missing();
        assert_eq!(legend.len(), table.len() + 1);
        assert_eq!(legend.last().unwrap().label, "No data");
    }
}
