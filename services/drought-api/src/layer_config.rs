//! Layer configuration loader.
//!
//! Loads the layer registry from `config/layers.yaml`. This is the single
//! source of truth for which rasters are exposed, their display titles, and
//! the bin-table style file used for classified layers. When the file is
//! absent a compiled-in default registry (spi/ndvi/smap) is used.

use drought_common::{DroughtError, DroughtIndex, DroughtResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One displayable layer loaded from YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    /// Layer ID used in request paths (e.g. "spi")
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Which drought index this raster carries
    pub index: DroughtIndex,
    /// Raster file path, relative to the data directory
    pub file: String,
    /// Override for the file's no-data sentinel
    #[serde(default)]
    pub nodata: Option<f32>,
    /// Bin-table JSON file (relative to config/styles/) for classified
    /// layers; the compiled-in SPI table is used when absent
    #[serde(default)]
    pub style: Option<String>,
    /// Description shown by the layer listing
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Value stretch for continuous layers; index defaults when absent
    #[serde(default)]
    pub min: Option<f32>,
    #[serde(default)]
    pub max: Option<f32>,
}

impl LayerConfig {
    /// Display units for the layer's index.
    pub fn units(&self) -> &'static str {
        self.index.units()
    }

    /// Stretch range for continuous rendering.
    pub fn stretch(&self) -> (f32, f32) {
        let (default_min, default_max) = self.index.default_range();
        (
            self.min.unwrap_or(default_min),
            self.max.unwrap_or(default_max),
        )
    }
}

#[derive(Debug, Deserialize)]
struct LayersDoc {
    layers: Vec<LayerConfig>,
}

/// The set of configured layers.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    layers: Vec<LayerConfig>,
}

impl LayerRegistry {
    /// Parse a registry from YAML text.
    pub fn from_yaml_str(yaml: &str) -> DroughtResult<Self> {
        let doc: LayersDoc = serde_yaml::from_str(yaml)
            .map_err(|e| DroughtError::ConfigError(format!("layers.yaml: {}", e)))?;
        Self::from_layers(doc.layers)
    }

    fn from_layers(layers: Vec<LayerConfig>) -> DroughtResult<Self> {
        if layers.is_empty() {
            return Err(DroughtError::ConfigError(
                "layer registry must define at least one layer".to_string(),
            ));
        }
        // Cheap duplicate check; registries are a handful of entries.
        for (i, layer) in layers.iter().enumerate() {
            if layers[..i]
                .iter()
                .any(|l| l.id.eq_ignore_ascii_case(&layer.id))
            {
                return Err(DroughtError::ConfigError(format!(
                    "duplicate layer id '{}'",
                    layer.id
                )));
            }
        }
        Ok(Self { layers })
    }

    /// Load the registry from `<config_dir>/layers.yaml`, falling back to
    /// the compiled-in defaults when the file does not exist.
    pub fn load_or_default(config_dir: &Path) -> DroughtResult<Self> {
        let path = config_dir.join("layers.yaml");
        match fs::read_to_string(&path) {
            Ok(yaml) => {
                let registry = Self::from_yaml_str(&yaml)?;
                info!(path = %path.display(), layers = registry.len(), "Loaded layer registry");
                Ok(registry)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "No layers.yaml found, using default registry");
                Ok(Self::default())
            }
            Err(e) => Err(DroughtError::ConfigError(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Find a layer by ID (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|l| l.id.eq_ignore_ascii_case(id))
    }

    pub fn layers(&self) -> &[LayerConfig] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerRegistry {
    /// The three indices the upstream dashboards displayed.
    fn default() -> Self {
        Self {
            layers: vec![
                LayerConfig {
                    id: "spi".to_string(),
                    title: "SPI Drought Severity".to_string(),
                    index: DroughtIndex::Spi,
                    file: "SPI_2023.tif".to_string(),
                    nodata: None,
                    style: None,
                    abstract_text: Some(
                        "Standardized Precipitation Index classified into drought severity bins"
                            .to_string(),
                    ),
                    min: None,
                    max: None,
                },
                LayerConfig {
                    id: "ndvi".to_string(),
                    title: "NDVI Vegetation Health".to_string(),
                    index: DroughtIndex::Ndvi,
                    file: "NDVI_2023.tif".to_string(),
                    nodata: None,
                    style: None,
                    abstract_text: None,
                    min: None,
                    max: None,
                },
                LayerConfig {
                    id: "smap".to_string(),
                    title: "SMAP Soil Moisture".to_string(),
                    index: DroughtIndex::Smap,
                    file: "SMAP_2023.tif".to_string(),
                    nodata: None,
                    style: None,
                    abstract_text: None,
                    min: None,
                    max: None,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
layers:
  - id: spi
    title: "SPI Drought Severity"
    index: spi
    file: SPI_2023.tif
    style: spi.json
"#;
        let registry = LayerRegistry::from_yaml_str(yaml).unwrap();
        assert_eq!(registry.len(), 1);
        let layer = registry.get("SPI").unwrap();
        assert_eq!(layer.index, DroughtIndex::Spi);
        assert_eq!(layer.style.as_deref(), Some("spi.json"));
    }

    #[test]
    fn test_rejects_empty_registry() {
        assert!(LayerRegistry::from_yaml_str("layers: []").is_err());
    }

    #[test]
    fn test_default_registry_has_all_indices() {
        let registry = LayerRegistry::default();
        assert!(registry.get("spi").is_some());
        assert!(registry.get("ndvi").is_some());
        assert!(registry.get("smap").is_some());
    }
}
