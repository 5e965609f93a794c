//! PNG encoding for overlay images.
//!
//! Two encoding modes:
//! - **Indexed PNG (color type 3)**: the primary path. A classified grid is
//!   already palette indices, so encoding is PLTE + tRNS + raw scanlines.
//! - **RGBA PNG (color type 6)**: used for continuous ramp renders, which
//!   exceed 256 colors.

use crate::RenderError;
use std::io::Write;
use tracing::trace;

/// PNG file signature.
const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Create an indexed PNG (color type 3) from a palette and indices.
///
/// The palette slot order is the classifier's: bins in table order followed
/// by the missing class. tRNS is emitted only when some entry is not fully
/// opaque.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> Result<Vec<u8>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage { width, height });
    }
    if palette.len() > 256 {
        return Err(RenderError::PaletteTooLarge(palette.len()));
    }
    if indices.len() != width * height {
        return Err(RenderError::ShapeMismatch {
            actual: indices.len(),
            width,
            height,
        });
    }
    if let Some(&bad) = indices.iter().find(|&&i| (i as usize) >= palette.len()) {
        return Err(RenderError::IndexOutOfRange {
            index: bad,
            palette_len: palette.len(),
        });
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);

    // IHDR
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth (8 bits per palette index)
    ihdr_data.push(3); // color type 3 = indexed
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // PLTE
    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b, _) in palette {
        plte_data.push(*r);
        plte_data.push(*g);
        plte_data.push(*b);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS - only if any color has alpha < 255
    if palette.iter().any(|(_, _, _, a)| *a < 255) {
        let trns_data: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    // IDAT
    let idat_data = deflate_scanlines(indices, width, height, 1)?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    trace!(
        width,
        height,
        palette_len = palette.len(),
        bytes = png.len(),
        "Encoded indexed PNG"
    );

    Ok(png)
}

/// Create a PNG from RGBA pixel data (color type 6).
pub fn create_png_rgba(
    pixels: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage { width, height });
    }
    if pixels.len() != width * height * 4 {
        return Err(RenderError::ShapeMismatch {
            actual: pixels.len(),
            width,
            height,
        });
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);

    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(6); // color type 6 = RGBA
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    let idat_data = deflate_scanlines(pixels, width, height, 4)?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Prefix every scanline with filter type 0 and zlib-compress the result.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, RenderError> {
    let stride = width * bytes_per_pixel;
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));

    for y in 0..height {
        uncompressed.push(0); // filter type: none
        let row_start = y * stride;
        uncompressed.extend_from_slice(&data[row_start..row_start + stride]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&uncompressed)
        .map_err(|e| RenderError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Compression(e.to_string()))
}

/// Write a PNG chunk: length, type, data, CRC.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_image() {
        assert!(matches!(
            create_png_indexed(0, 4, &[(0, 0, 0, 255)], &[]),
            Err(RenderError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let palette = [(255, 0, 0, 255), (0, 0, 255, 255)];
        assert!(matches!(
            create_png_indexed(2, 1, &palette, &[0, 2]),
            Err(RenderError::IndexOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let palette = [(255, 0, 0, 255)];
        assert!(matches!(
            create_png_indexed(2, 2, &palette, &[0, 0, 0]),
            Err(RenderError::ShapeMismatch { .. })
        ));
    }
}
