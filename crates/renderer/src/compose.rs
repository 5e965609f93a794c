//! Pixel composition helpers.

use crate::RenderError;

/// Expand palette indices into RGBA pixels (4 bytes per pixel).
pub fn indices_to_rgba(
    indices: &[u8],
    palette: &[(u8, u8, u8, u8)],
) -> Result<Vec<u8>, RenderError> {
    let mut pixels = Vec::with_capacity(indices.len() * 4);
    for &index in indices {
        let (r, g, b, a) = *palette.get(index as usize).ok_or(RenderError::IndexOutOfRange {
            index,
            palette_len: palette.len(),
        })?;
        pixels.extend_from_slice(&[r, g, b, a]);
    }
    Ok(pixels)
}

/// Scale every alpha value by `opacity` (clamped to 0..=1).
///
/// The upstream dashboards draped their overlays at 0.6 opacity through the
/// map widget; we bake it into the palette/pixels instead so any client
/// renders the same image.
pub fn apply_opacity_rgba(pixels: &mut [u8], opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in pixels.chunks_exact_mut(4) {
        pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
    }
}

/// Scale the alpha of every palette entry by `opacity` (clamped to 0..=1).
pub fn apply_opacity_palette(
    palette: &[(u8, u8, u8, u8)],
    opacity: f32,
) -> Vec<(u8, u8, u8, u8)> {
    let opacity = opacity.clamp(0.0, 1.0);
    palette
        .iter()
        .map(|&(r, g, b, a)| (r, g, b, (a as f32 * opacity).round() as u8))
        .collect()
}
