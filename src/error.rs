//! Error types shared across the core.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the RON config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in config '{path}': {details}")]
    Parse { path: PathBuf, details: String },
}

/// Asset lookups never fail hard; only an empty catalog is fatal.
#[derive(Debug, Error)]
pub enum AssetError {
    /// No asset of any kind could be loaded. Surfaced once before any session starts.
    #[error("No assets could be loaded")]
    NothingLoaded,

    #[error("{kind} not found: {key}")]
    Missing { kind: &'static str, key: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize '{key}': {details}")]
    Serialize { key: String, details: String },

    #[error("Failed to parse stored '{key}': {details}")]
    Parse { key: String, details: String },

    #[error("No data directory available")]
    NoDataDir,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for setup code paths.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}
