use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, RusterzoneError>;

#[derive(thiserror::Error, Debug)]
pub enum RusterzoneError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Band {requested} does not exist, raster has {available} band(s)")]
    BandIndex { requested: usize, available: usize },
    #[error("Invalid geometry for zone {zone}: {reason}")]
    Geometry { zone: usize, reason: String },
    #[error("Schema conflict: {0}")]
    SchemaConflict(String),
    #[error("Run was cancelled")]
    Cancelled,
    #[error("Buffer of {found} cells can not have shape {width}x{height}")]
    Shape {
        width: usize,
        height: usize,
        found: usize,
    },
    #[error("Ther is no intersection between geometries")]
    NoIntersection,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    NdarrayError(#[from] ndarray::ShapeError),
    #[cfg(feature = "gdal")]
    #[error(transparent)]
    GdalError(#[from] gdal::errors::GdalError),
}

/// Coarse classification of [RusterzoneError] reported by a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    BandIndex,
    Geometry,
    SchemaConflict,
    Cancelled,
    Io,
}

impl RusterzoneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::Shape { .. } | Self::NdarrayError(_) => {
                ErrorKind::Configuration
            }
            Self::BandIndex { .. } => ErrorKind::BandIndex,
            Self::Geometry { .. } | Self::NoIntersection => ErrorKind::Geometry,
            Self::SchemaConflict(_) => ErrorKind::SchemaConflict,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
            #[cfg(feature = "gdal")]
            Self::GdalError(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn geometry(zone: usize, reason: impl Into<String>) -> Self {
        Self::Geometry {
            zone,
            reason: reason.into(),
        }
    }
}
