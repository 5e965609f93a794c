//! Continuous color ramps for unclassified indices.
//!
//! NDVI and SMAP rasters are displayed as-is: values are min/max stretched
//! and mapped through a linear-interpolated color ramp instead of the
//! severity classifier.

use crate::RenderError;
use classification::Color;
use drought_common::RasterGrid;

/// A color ramp over normalized positions 0..=1.
#[derive(Debug, Clone)]
pub struct Ramp {
    stops: Vec<(f32, Color)>,
}

impl Ramp {
    /// Build a ramp from (position, color) stops. Positions must be
    /// ascending and inside 0..=1, with at least two stops.
    pub fn new(stops: Vec<(f32, Color)>) -> Result<Self, RenderError> {
        if stops.len() < 2 {
            return Err(RenderError::InvalidRamp(
                "ramp needs at least 2 stops".to_string(),
            ));
        }
        for pair in stops.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(RenderError::InvalidRamp(
                    "ramp stops must be in ascending position order".to_string(),
                ));
            }
        }
        if stops[0].0 < 0.0 || stops[stops.len() - 1].0 > 1.0 {
            return Err(RenderError::InvalidRamp(
                "ramp stops must lie within 0..=1".to_string(),
            ));
        }
        Ok(Self { stops })
    }

    /// Vegetation ramp for NDVI: bare soil through dense canopy.
    pub fn vegetation() -> Self {
        Self::new(vec![
            (0.0, Color::opaque(210, 180, 140)),
            (0.5, Color::opaque(173, 255, 47)),
            (1.0, Color::opaque(0, 100, 0)),
        ])
        .expect("compiled-in vegetation ramp is valid")
    }

    /// Soil-moisture ramp for SMAP: dry tan through saturated blue.
    pub fn moisture() -> Self {
        Self::new(vec![
            (0.0, Color::opaque(210, 180, 140)),
            (0.5, Color::opaque(100, 200, 255)),
            (1.0, Color::opaque(25, 50, 200)),
        ])
        .expect("compiled-in moisture ramp is valid")
    }

    /// Color at a normalized position, clamped to the ramp ends.
    pub fn color_at(&self, norm: f32) -> Color {
        let norm = norm.clamp(0.0, 1.0);

        let first = self.stops[0];
        if norm <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (p0, c0) = pair[0];
            let (p1, c1) = pair[1];
            if norm <= p1 {
                let t = (norm - p0) / (p1 - p0);
                return interpolate_color(c0, c1, t);
            }
        }
        self.stops[self.stops.len() - 1].1
    }

    /// The ramp's stops, for legend rendering.
    pub fn stops(&self) -> &[(f32, Color)] {
        &self.stops
    }
}

/// Linear color interpolation.
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    let lerp = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::new(
        lerp(color1.r, color2.r),
        lerp(color1.g, color2.g),
        lerp(color1.b, color2.b),
        lerp(color1.a, color2.a),
    )
}

/// Render a grid through a ramp with a min/max stretch.
///
/// No-data and NaN cells come out transparent. Returns RGBA pixel data
/// (4 bytes per pixel), same shape as the input.
pub fn render_continuous(grid: &RasterGrid, ramp: &Ramp, min_val: f32, max_val: f32) -> Vec<u8> {
    let range = max_val - min_val;
    let range = if range.abs() < f32::EPSILON { 1.0 } else { range };

    let mut pixels = Vec::with_capacity(grid.len() * 4);
    for &value in grid.data() {
        if grid.is_missing(value) {
            pixels.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let norm = ((value - min_val) / range).clamp(0.0, 1.0);
        let color = ramp.color_at(norm);
        pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
    }
    pixels
}
