//! Errors for the fallible outer surfaces: loading records and styles,
//! exporting rasters. Normalizing and rendering never fail.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid play JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse style TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse style YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown built-in style '{name}'. Available: {available}")]
    UnknownStyle { name: String, available: String },

    #[error("unsupported output format: .{0} (use .svg, .png or .pdf)")]
    UnsupportedFormat(String),

    #[error("invalid PNG scale: {0}")]
    InvalidScale(f32),

    #[error("failed to parse SVG: {0}")]
    Svg(String),

    #[error("failed to encode PNG: {0}")]
    Png(String),

    #[error("failed to convert SVG to PDF: {0}")]
    Pdf(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
