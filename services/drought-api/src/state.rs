//! Application state and shared resources.

use anyhow::{Context, Result};
use classification::BinTable;
use drought_common::{DroughtError, DroughtResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::layer_config::{LayerConfig, LayerRegistry};
use crate::metrics::MetricsCollector;

/// Shared application state.
///
/// Bin tables are resolved once here — a malformed style file fails startup
/// instead of surfacing per request.
pub struct AppState {
    pub registry: LayerRegistry,
    pub data_dir: PathBuf,
    pub metrics: Arc<MetricsCollector>,
    tables: HashMap<String, Arc<BinTable>>,
}

impl AppState {
    pub fn new(config_dir: &Path, data_dir: &Path) -> Result<Self> {
        let registry = LayerRegistry::load_or_default(config_dir)
            .context("failed to load layer registry")?;

        let styles_dir = config_dir.join("styles");
        let mut tables = HashMap::new();
        for layer in registry.layers() {
            if !layer.index.is_classified() {
                continue;
            }
            let table = match &layer.style {
                Some(style) => {
                    let path = styles_dir.join(style);
                    BinTable::from_style_file(&path).with_context(|| {
                        format!("invalid bin table '{}' for layer '{}'", path.display(), layer.id)
                    })?
                }
                None => BinTable::spi_default(),
            };
            info!(layer = %layer.id, bins = table.len(), "Resolved severity bin table");
            tables.insert(layer.id.clone(), Arc::new(table));
        }

        Ok(Self {
            registry,
            data_dir: data_dir.to_path_buf(),
            metrics: Arc::new(MetricsCollector::new()),
            tables,
        })
    }

    /// Look up a layer or produce the 404 error.
    pub fn layer(&self, id: &str) -> DroughtResult<&LayerConfig> {
        self.registry
            .get(id)
            .ok_or_else(|| DroughtError::LayerNotFound(id.to_string()))
    }

    /// The severity bin table for a classified layer.
    pub fn table(&self, id: &str) -> Option<Arc<BinTable>> {
        self.tables.get(id).cloned()
    }

    /// Absolute raster path for a layer.
    pub fn raster_path(&self, layer: &LayerConfig) -> PathBuf {
        self.data_dir.join(&layer.file)
    }
}
