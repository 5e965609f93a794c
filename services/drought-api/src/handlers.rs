//! HTTP request handlers.
//!
//! Per-request flow for `/map/:layer`: resolve the layer, load its raster,
//! classify (SPI) or ramp-render (NDVI/SMAP), encode a PNG, cache, respond.
//! Everything the map widget needs besides the overlay itself comes from
//! `/legend/:layer` and `/bounds/:layer`.

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};
use tracing::{error, info, instrument};

use classification::BinTable;
use drought_common::{DroughtError, DroughtIndex, DroughtResult, RasterGrid};
use renderer::{compose, png, Ramp};

use crate::layer_config::LayerConfig;
use crate::state::AppState;

// ============================================================================
// Render cache
// ============================================================================

/// Cache of encoded overlay PNGs, keyed by layer id + render parameters.
/// Raster files are static per deployment, so entries never expire.
static RENDER_CACHE: Lazy<RwLock<HashMap<String, Bytes>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn cache_get(key: &str) -> Option<Bytes> {
    RENDER_CACHE.read().unwrap().get(key).cloned()
}

fn cache_insert(key: String, png: Bytes) {
    RENDER_CACHE.write().unwrap().insert(key, png);
}

// ============================================================================
// Request parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MapParams {
    /// Overlay opacity baked into the PNG alpha channel
    pub opacity: Option<f32>,
    /// Stretch overrides for continuous layers
    pub min: Option<f32>,
    pub max: Option<f32>,
}

/// Overlay opacity the upstream dashboards used.
const DEFAULT_OPACITY: f32 = 0.6;

// ============================================================================
// Map overlay
// ============================================================================

#[instrument(skip(state))]
pub async fn map_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
    Query(params): Query<MapParams>,
) -> Response {
    state.metrics.map_requests.fetch_add(1, Ordering::Relaxed);

    match render_map(&state, &layer_id, &params).await {
        Ok(png) => png_response(png),
        Err(e) => {
            state.metrics.render_errors.fetch_add(1, Ordering::Relaxed);
            error!(layer = %layer_id, error = %e, "Map render failed");
            json_error(&e)
        }
    }
}

async fn render_map(
    state: &AppState,
    layer_id: &str,
    params: &MapParams,
) -> DroughtResult<Bytes> {
    let layer = state.layer(layer_id)?;

    let opacity = params.opacity.unwrap_or(DEFAULT_OPACITY);
    if !(0.0..=1.0).contains(&opacity) {
        return Err(DroughtError::InvalidParameter {
            param: "opacity".to_string(),
            message: format!("{} is outside 0.0..=1.0", opacity),
        });
    }

    let cache_key = format!(
        "{}?opacity={:.3}&min={:?}&max={:?}",
        layer.id, opacity, params.min, params.max
    );
    if let Some(png) = cache_get(&cache_key) {
        state.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
        return Ok(png);
    }
    state.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);

    let grid = load_grid(state, layer).await?;

    let png = if layer.index.is_classified() {
        let table = state.table(&layer.id).ok_or_else(|| {
            DroughtError::InternalError(format!("no bin table resolved for '{}'", layer.id))
        })?;
        render_classified(&grid, &table, opacity)?
    } else {
        render_continuous(&grid, layer, params, opacity)?
    };

    state.metrics.renders_total.fetch_add(1, Ordering::Relaxed);
    info!(
        layer = %layer.id,
        width = grid.width(),
        height = grid.height(),
        bytes = png.len(),
        "Rendered overlay"
    );

    let png = Bytes::from(png);
    cache_insert(cache_key, png.clone());
    Ok(png)
}

fn render_classified(
    grid: &RasterGrid,
    table: &BinTable,
    opacity: f32,
) -> DroughtResult<Vec<u8>> {
    let classified = table.classify_grid(grid);
    let palette = compose::apply_opacity_palette(&table.palette(), opacity);
    png::create_png_indexed(
        classified.width(),
        classified.height(),
        &palette,
        classified.indices(),
    )
    .map_err(Into::into)
}

fn render_continuous(
    grid: &RasterGrid,
    layer: &LayerConfig,
    params: &MapParams,
    opacity: f32,
) -> DroughtResult<Vec<u8>> {
    let (default_min, default_max) = layer.stretch();
    let min = params.min.unwrap_or(default_min);
    let max = params.max.unwrap_or(default_max);
    if min >= max {
        return Err(DroughtError::InvalidParameter {
            param: "min".to_string(),
            message: format!("stretch range {}..{} is empty", min, max),
        });
    }

    let mut pixels = renderer::ramp::render_continuous(grid, &ramp_for(layer.index), min, max);
    compose::apply_opacity_rgba(&mut pixels, opacity);
    png::create_png_rgba(&pixels, grid.width(), grid.height()).map_err(Into::into)
}

/// Ramp per index. Classified indices never reach the ramp path.
fn ramp_for(index: DroughtIndex) -> Ramp {
    match index {
        DroughtIndex::Ndvi => Ramp::vegetation(),
        DroughtIndex::Spi | DroughtIndex::Smap => Ramp::moisture(),
    }
}

/// Load a layer's raster off the blocking pool, applying any configured
/// no-data override.
async fn load_grid(state: &AppState, layer: &LayerConfig) -> DroughtResult<RasterGrid> {
    let path = state.raster_path(layer);
    let nodata_override = layer.nodata;

    let mut grid = tokio::task::spawn_blocking(move || geotiff_reader::read_geotiff(&path))
        .await
        .map_err(|e| DroughtError::InternalError(format!("raster load task failed: {}", e)))?
        .map_err(DroughtError::from)?;

    if nodata_override.is_some() {
        grid.nodata = nodata_override;
    }
    Ok(grid)
}

// ============================================================================
// Legend
// ============================================================================

#[instrument(skip(state))]
pub async fn legend_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
) -> Response {
    state.metrics.legend_requests.fetch_add(1, Ordering::Relaxed);

    let layer = match state.layer(&layer_id) {
        Ok(layer) => layer,
        Err(e) => return json_error(&e),
    };

    let body = if let Some(table) = state.table(&layer.id) {
        json!({
            "layer": layer.id,
            "title": layer.title,
            "units": layer.units(),
            "type": "classified",
            "legend": table.legend(),
            "missing": {
                "label": table.missing_label(),
                "color": table.missing_color().to_hex(),
            },
        })
    } else {
        let (min, max) = layer.stretch();
        let stops: Vec<_> = ramp_for(layer.index)
            .stops()
            .iter()
            .map(|(position, color)| {
                json!({ "position": position, "color": color.to_hex() })
            })
            .collect();
        json!({
            "layer": layer.id,
            "title": layer.title,
            "units": layer.units(),
            "type": "continuous",
            "stops": stops,
            "range": { "min": min, "max": max },
        })
    };

    Json(body).into_response()
}

// ============================================================================
// Bounds
// ============================================================================

#[instrument(skip(state))]
pub async fn bounds_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
) -> Response {
    let result = async {
        let layer = state.layer(&layer_id)?;
        let grid = load_grid(&state, layer).await?;
        let (lat, lon) = grid.bbox.center();
        Ok::<_, DroughtError>(json!({
            "layer": layer.id,
            "bbox": grid.bbox,
            "corners": grid.bbox.to_corners(),
            "center": [lat, lon],
            "georeferenced": grid.bbox.is_valid(),
            "width": grid.width(),
            "height": grid.height(),
        }))
    }
    .await;

    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => json_error(&e),
    }
}

// ============================================================================
// Layer listing
// ============================================================================

pub async fn layers_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let layers: Vec<_> = state
        .registry
        .layers()
        .iter()
        .map(|layer| {
            json!({
                "id": layer.id,
                "title": layer.title,
                "index": layer.index,
                "units": layer.units(),
                "classified": layer.index.is_classified(),
                "abstract": layer.abstract_text,
            })
        })
        .collect();

    Json(json!({ "layers": layers })).into_response()
}

// ============================================================================
// Health and metrics
// ============================================================================

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /ready - Readiness check (verifies every configured raster exists)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let all_present = state
        .registry
        .layers()
        .iter()
        .all(|layer| state.raster_path(layer).is_file());

    if all_present {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render_prometheus(),
    )
        .into_response()
}

// ============================================================================
// Response helpers
// ============================================================================

fn png_response(png: Bytes) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        png,
    )
        .into_response()
}

fn json_error(err: &DroughtError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}
