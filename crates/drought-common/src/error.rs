//! Error types for drought-monitor services.

use thiserror::Error;

/// Result type alias using DroughtError.
pub type DroughtResult<T> = Result<T, DroughtError>;

/// Primary error type for drought-monitor operations.
#[derive(Debug, Error)]
pub enum DroughtError {
    // === Request Errors ===
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Data Errors ===
    #[error("Raster source not found: {0}")]
    SourceNotFound(String),

    #[error("Failed to read raster: {0}")]
    RasterError(String),

    // === Classification Errors ===
    #[error("Invalid bin table: {0}")]
    InvalidBinTable(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DroughtError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            DroughtError::InvalidParameter { .. } => 400,

            DroughtError::LayerNotFound(_) | DroughtError::SourceNotFound(_) => 404,

            DroughtError::RasterError(_)
            | DroughtError::InvalidBinTable(_)
            | DroughtError::RenderError(_)
            | DroughtError::ConfigError(_)
            | DroughtError::InternalError(_) => 500,
        }
    }

    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            DroughtError::LayerNotFound(_) => "LayerNotFound",
            DroughtError::InvalidParameter { .. } => "InvalidParameter",
            DroughtError::SourceNotFound(_) => "SourceNotFound",
            DroughtError::RasterError(_) => "RasterError",
            DroughtError::InvalidBinTable(_) => "InvalidBinTable",
            DroughtError::RenderError(_) => "RenderError",
            DroughtError::ConfigError(_) => "ConfigError",
            DroughtError::InternalError(_) => "InternalError",
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for DroughtError {
    fn from(err: std::io::Error) -> Self {
        DroughtError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for DroughtError {
    fn from(err: serde_json::Error) -> Self {
        DroughtError::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DroughtError::SourceNotFound("spi.tif".into()).http_status_code(),
            404
        );
        assert_eq!(
            DroughtError::LayerNotFound("spi".into()).http_status_code(),
            404
        );
        assert_eq!(
            DroughtError::InvalidParameter {
                param: "opacity".into(),
                message: "out of range".into()
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            DroughtError::InvalidBinTable("gap".into()).http_status_code(),
            500
        );
    }
}
