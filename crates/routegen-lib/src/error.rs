use std::path::PathBuf;

use thiserror::Error;

use crate::map::CellId;

/// Convenient result alias for the route generator library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Map file could not be located at the resolved path.
    #[error("map not found at {path}")]
    MapNotFound { path: PathBuf },

    /// Raised when the loaded map references cells, biomes or features that do not exist.
    #[error("invalid map: {message}")]
    InvalidMap { message: String },

    /// Raised when a caller asks about a cell outside the map.
    #[error("unknown cell id: {cell}")]
    UnknownCell { cell: CellId },

    /// Raised when a routing configuration fails validation.
    #[error("invalid routing configuration: {message}")]
    InvalidConfig { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON (de)serialisation errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_map(message: impl Into<String>) -> Self {
        Error::InvalidMap {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}
