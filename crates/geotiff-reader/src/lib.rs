//! GeoTIFF raster loading.
//!
//! Thin wrapper over the `tiff` crate: decodes the first band of a GeoTIFF
//! into a [`RasterGrid`], picks up the GDAL no-data tag when present, and
//! derives overlay bounds from the ModelTiepoint/ModelPixelScale tags. No
//! CRS interpretation happens here — the bounds are opaque positioning data
//! for the map widget.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use drought_common::{BoundingBox, DroughtError, RasterGrid};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::{debug, warn};

/// Sentinel assumed when a file carries no GDAL no-data tag. Matches the
/// convention of the SPI/NDVI products this service displays.
pub const DEFAULT_NODATA: f32 = -9999.0;

/// Read the first band of a GeoTIFF into a raster grid.
///
/// Sample formats are converted to `f32`. Multi-sample (interleaved) images
/// contribute only their first sample per pixel.
pub fn read_geotiff(path: impl AsRef<Path>) -> Result<RasterGrid, GeoTiffError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GeoTiffError::NotFound(path.display().to_string())
        } else {
            GeoTiffError::Decode(format!("{}: {}", path.display(), e))
        }
    })?;

    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| GeoTiffError::Decode(format!("{}: {}", path.display(), e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| GeoTiffError::Decode(e.to_string()))?;
    let (width, height) = (width as usize, height as usize);

    let samples = samples_per_pixel(
        decoder
            .colortype()
            .map_err(|e| GeoTiffError::Decode(e.to_string()))?,
    )?;

    let nodata = read_nodata(&mut decoder);
    let bbox = read_bounds(&mut decoder, width, height);

    let raw = decoder
        .read_image()
        .map_err(|e| GeoTiffError::Decode(e.to_string()))?;
    let data = first_band_f32(raw, samples);

    if data.len() != width * height {
        return Err(GeoTiffError::Decode(format!(
            "decoded {} cells for a {}x{} image",
            data.len(),
            width,
            height
        )));
    }

    debug!(
        path = %path.display(),
        width,
        height,
        nodata = ?nodata,
        "Loaded GeoTIFF band"
    );

    RasterGrid::new(data, width, height, nodata, bbox)
        .map_err(|e| GeoTiffError::Decode(e.to_string()))
}

fn samples_per_pixel(colortype: ColorType) -> Result<usize, GeoTiffError> {
    match colortype {
        ColorType::Gray(_) => Ok(1),
        ColorType::GrayA(_) => Ok(2),
        ColorType::RGB(_) => Ok(3),
        ColorType::RGBA(_) | ColorType::CMYK(_) => Ok(4),
        other => Err(GeoTiffError::Unsupported(format!(
            "color type {:?}",
            other
        ))),
    }
}

/// GDAL encodes the no-data sentinel as an ASCII tag (42113).
fn read_nodata<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    match decoder.get_tag_ascii_string(Tag::GdalNodata) {
        Ok(s) => match s.trim().trim_end_matches('\0').parse::<f32>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(raw = %s, "Unparseable GDAL nodata tag, assuming {}", DEFAULT_NODATA);
                Some(DEFAULT_NODATA)
            }
        },
        Err(_) => Some(DEFAULT_NODATA),
    }
}

/// Derive lon/lat bounds from the tiepoint + pixel-scale tags. Both tags
/// absent is not an error — the overlay just cannot be georeferenced and
/// gets a degenerate box.
fn read_bounds<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    width: usize,
    height: usize,
) -> BoundingBox {
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();

    match (tiepoint, scale) {
        (Some(tp), Some(sc)) if tp.len() >= 6 && sc.len() >= 2 => {
            // Tiepoint maps raster (i, j) to model (x, y); in practice the
            // anchor is the top-left pixel.
            let origin_x = tp[3] - tp[0] * sc[0];
            let origin_y = tp[4] + tp[1] * sc[1];
            BoundingBox::new(
                origin_x,
                origin_y - height as f64 * sc[1],
                origin_x + width as f64 * sc[0],
                origin_y,
            )
        }
        _ => BoundingBox::undefined(),
    }
}

fn first_band_f32(raw: DecodingResult, samples: usize) -> Vec<f32> {
    fn band<T: Copy, F: Fn(T) -> f32>(v: Vec<T>, samples: usize, to: F) -> Vec<f32> {
        v.into_iter().step_by(samples).map(to).collect()
    }

    match raw {
        DecodingResult::F32(v) => band(v, samples, |x| x),
        DecodingResult::F64(v) => band(v, samples, |x| x as f32),
        DecodingResult::U8(v) => band(v, samples, |x| x as f32),
        DecodingResult::U16(v) => band(v, samples, |x| x as f32),
        DecodingResult::U32(v) => band(v, samples, |x| x as f32),
        DecodingResult::U64(v) => band(v, samples, |x| x as f32),
        DecodingResult::I8(v) => band(v, samples, |x| x as f32),
        DecodingResult::I16(v) => band(v, samples, |x| x as f32),
        DecodingResult::I32(v) => band(v, samples, |x| x as f32),
        DecodingResult::I64(v) => band(v, samples, |x| x as f32),
    }
}

/// Raster source errors.
#[derive(Debug, thiserror::Error)]
pub enum GeoTiffError {
    #[error("Raster source not found: {0}")]
    NotFound(String),

    #[error("Failed to decode GeoTIFF: {0}")]
    Decode(String),

    #[error("Unsupported GeoTIFF layout: {0}")]
    Unsupported(String),
}

impl From<GeoTiffError> for DroughtError {
    fn from(err: GeoTiffError) -> Self {
        match err {
            GeoTiffError::NotFound(path) => DroughtError::SourceNotFound(path),
            GeoTiffError::Decode(msg) => DroughtError::RasterError(msg),
            GeoTiffError::Unsupported(msg) => DroughtError::RasterError(msg),
        }
    }
}
