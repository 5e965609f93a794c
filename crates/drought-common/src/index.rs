//! Drought index kinds served by the monitor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The drought indices the monitor knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DroughtIndex {
    /// Standardized Precipitation Index; more negative = drier.
    Spi,
    /// Normalized Difference Vegetation Index.
    Ndvi,
    /// SMAP soil moisture.
    Smap,
}

impl DroughtIndex {
    /// Only SPI runs through the severity classifier; NDVI and SMAP are
    /// displayed as-is with a continuous color ramp.
    pub fn is_classified(&self) -> bool {
        matches!(self, DroughtIndex::Spi)
    }

    /// Default display units.
    pub fn units(&self) -> &'static str {
        match self {
            DroughtIndex::Spi => "SPI",
            DroughtIndex::Ndvi => "NDVI",
            DroughtIndex::Smap => "m3/m3",
        }
    }

    /// Default value range for continuous stretch rendering.
    pub fn default_range(&self) -> (f32, f32) {
        match self {
            DroughtIndex::Spi => (-2.0, 2.0),
            DroughtIndex::Ndvi => (-0.2, 0.9),
            DroughtIndex::Smap => (0.0, 0.5),
        }
    }
}

impl fmt::Display for DroughtIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DroughtIndex::Spi => "spi",
            DroughtIndex::Ndvi => "ndvi",
            DroughtIndex::Smap => "smap",
        };
        f.write_str(s)
    }
}

impl FromStr for DroughtIndex {
    type Err = UnknownIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spi" => Ok(DroughtIndex::Spi),
            "ndvi" => Ok(DroughtIndex::Ndvi),
            "smap" => Ok(DroughtIndex::Smap),
            _ => Err(UnknownIndexError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown drought index: {0}")]
pub struct UnknownIndexError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for idx in [DroughtIndex::Spi, DroughtIndex::Ndvi, DroughtIndex::Smap] {
            assert_eq!(idx.to_string().parse::<DroughtIndex>().unwrap(), idx);
        }
        assert!("tci".parse::<DroughtIndex>().is_err());
    }

    #[test]
    fn test_only_spi_is_classified() {
        assert!(DroughtIndex::Spi.is_classified());
        assert!(!DroughtIndex::Ndvi.is_classified());
        assert!(!DroughtIndex::Smap.is_classified());
    }
}
