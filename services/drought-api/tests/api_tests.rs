//! Tests for the drought API service components.
//!
//! These focus on state construction, layer resolution and response-shape
//! serialization; the HTTP plumbing itself is framework code.

use drought_api::layer_config::LayerRegistry;
use drought_api::state::AppState;
use drought_common::DroughtError;
use std::fs::{self, File};
use std::path::Path;
use tiff::encoder::{colortype, TiffEncoder};

// ============================================================================
// Fixtures
// ============================================================================

fn write_spi_fixture(data_dir: &Path, name: &str) {
    let data = vec![-2.5f32, -1.8, -1.2, -0.5, -9999.0, 0.3, 1.1, -1.5, 0.0];
    let file = File::create(data_dir.join(name)).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    encoder
        .write_image::<colortype::Gray32Float>(3, 3, &data)
        .unwrap();
}

fn write_config(config_dir: &Path, layers_yaml: &str, style_json: Option<&str>) {
    fs::create_dir_all(config_dir.join("styles")).unwrap();
    fs::write(config_dir.join("layers.yaml"), layers_yaml).unwrap();
    if let Some(style) = style_json {
        fs::write(config_dir.join("styles/spi.json"), style).unwrap();
    }
}

const SPI_STYLE: &str = r##"{
    "name": "SPI drought severity",
    "classes": [
        { "max": -2.0, "color": "red", "label": "Extreme drought" },
        { "min": -2.0, "max": -1.5, "color": "orange", "label": "Severe drought" },
        { "min": -1.5, "max": -1.0, "color": "yellow", "label": "Moderate drought" },
        { "min": -1.0, "max": 0.0, "color": "white", "label": "Mild drought" },
        { "min": 0.0, "color": "blue", "label": "No drought" }
    ],
    "missing": { "label": "No data", "color": "transparent" }
}"##;

const SPI_LAYER_YAML: &str = r#"
layers:
  - id: spi
    title: "SPI Drought Severity"
    index: spi
    file: SPI_2023.tif
    style: spi.json
"#;

// ============================================================================
// State construction
// ============================================================================

#[test]
fn test_state_resolves_bin_table_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    write_config(&config_dir, SPI_LAYER_YAML, Some(SPI_STYLE));
    write_spi_fixture(&data_dir, "SPI_2023.tif");

    let state = AppState::new(&config_dir, &data_dir).unwrap();

    let table = state.table("spi").expect("spi table resolved");
    assert_eq!(table.len(), 5);
    assert_eq!(table.classify(-2.5).label(), "Extreme drought");

    // Layer lookup is case-insensitive; unknown layers map to 404.
    assert!(state.layer("SPI").is_ok());
    let err = state.layer("tci").unwrap_err();
    assert!(matches!(err, DroughtError::LayerNotFound(_)));
    assert_eq!(err.http_status_code(), 404);
}

#[test]
fn test_state_fails_on_malformed_style_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    // Gap between the first two classes — must fail at startup, not per
    // request.
    let bad_style = r##"{
        "classes": [
            { "max": -2.0, "color": "red", "label": "Extreme drought" },
            { "min": -1.0, "color": "blue", "label": "No drought" }
        ]
    }"##;
    write_config(&config_dir, SPI_LAYER_YAML, Some(bad_style));

    assert!(AppState::new(&config_dir, &data_dir).is_err());
}

#[test]
fn test_state_uses_builtin_table_without_style() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    write_config(
        &config_dir,
        r#"
layers:
  - id: spi
    title: "SPI"
    index: spi
    file: SPI_2023.tif
"#,
        None,
    );

    let state = AppState::new(&config_dir, &data_dir).unwrap();
    let table = state.table("spi").unwrap();
    assert_eq!(table.legend()[0].range, "< -2.00");
}

#[test]
fn test_state_defaults_without_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("missing-config");
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    let state = AppState::new(&config_dir, &data_dir).unwrap();
    assert!(state.registry.get("spi").is_some());
    assert!(state.registry.get("ndvi").is_some());
    assert!(state.registry.get("smap").is_some());
    // Continuous layers get no bin table.
    assert!(state.table("ndvi").is_none());
}

// ============================================================================
// Registry parsing
// ============================================================================

#[test]
fn test_registry_rejects_duplicate_ids() {
    let yaml = r#"
layers:
  - id: spi
    title: "A"
    index: spi
    file: a.tif
  - id: SPI
    title: "B"
    index: spi
    file: b.tif
"#;
    assert!(LayerRegistry::from_yaml_str(yaml).is_err());
}

#[test]
fn test_registry_stretch_defaults_by_index() {
    let yaml = r#"
layers:
  - id: ndvi
    title: "NDVI"
    index: ndvi
    file: ndvi.tif
  - id: smap
    title: "SMAP"
    index: smap
    file: smap.tif
    min: 0.1
    max: 0.4
"#;
    let registry = LayerRegistry::from_yaml_str(yaml).unwrap();
    assert_eq!(registry.get("ndvi").unwrap().stretch(), (-0.2, 0.9));
    assert_eq!(registry.get("smap").unwrap().stretch(), (0.1, 0.4));
}

// ============================================================================
// Response shapes
// ============================================================================

#[test]
fn test_legend_json_shape() {
    let table = classification::BinTable::spi_default();
    let json = serde_json::to_value(table.legend()).unwrap();

    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["label"], "Extreme drought");
    assert_eq!(rows[0]["color"], "#FF0000");
    assert_eq!(rows[0]["range"], "< -2.00");
    assert_eq!(rows[4]["label"], "No drought");
    assert_eq!(rows[4]["range"], "> 0.00");
}

#[test]
fn test_bounds_corners_shape() {
    let bbox = drought_common::BoundingBox::new(33.0, -5.0, 36.0, -2.0);
    let json = serde_json::to_value(serde_json::json!({
        "bbox": bbox,
        "corners": bbox.to_corners(),
        "center": [bbox.center().0, bbox.center().1],
    }))
    .unwrap();

    assert_eq!(json["bbox"]["min_x"], 33.0);
    assert_eq!(json["corners"][0][0], -5.0);
    assert_eq!(json["corners"][1][1], 36.0);
    assert_eq!(json["center"][0], -3.5);
    assert_eq!(json["center"][1], 34.5);
}
