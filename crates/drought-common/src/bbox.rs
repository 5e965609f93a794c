//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in lon/lat degrees.
///
/// The box is only used to position rendered overlays on a map widget;
/// no CRS interpretation happens anywhere in this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a bbox parameter string: "minx,miny,maxx,maxy"
    pub fn from_param(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        Ok(Self {
            min_x: parts[0]
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(parts[0].to_string()))?,
            min_y: parts[1]
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(parts[1].to_string()))?,
            max_x: parts[2]
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(parts[2].to_string()))?,
            max_y: parts[3]
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(parts[3].to_string()))?,
        })
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point as (lat, lon) — the order map widgets expect for
    /// an initial view position.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_y + self.max_y) / 2.0,
            (self.min_x + self.max_x) / 2.0,
        )
    }

    /// Corner pairs `[[south, west], [north, east]]` for image-overlay
    /// positioning.
    pub fn to_corners(&self) -> [[f64; 2]; 2] {
        [[self.min_y, self.min_x], [self.max_y, self.max_x]]
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// A degenerate box used when a raster carries no georeference tags.
    pub fn undefined() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Whether the box has positive extent in both directions.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox_param() {
        let bbox = BoundingBox::from_param("33.0,-5.0,36.0,-2.0").unwrap();
        assert_eq!(bbox.min_x, 33.0);
        assert_eq!(bbox.min_y, -5.0);
        assert_eq!(bbox.max_x, 36.0);
        assert_eq!(bbox.max_y, -2.0);
    }

    #[test]
    fn test_center_is_lat_lon() {
        let bbox = BoundingBox::new(30.0, -10.0, 40.0, 10.0);
        let (lat, lon) = bbox.center();
        assert_eq!(lat, 0.0);
        assert_eq!(lon, 35.0);
    }
}
