//! Reclassify a raster band with a range table and count the resulting
//! classes inside each polygon of a zone collection.

mod buffer;
pub mod components;
pub mod config;
mod errors;
mod intersection;
pub mod pipeline;
pub mod reclassify;
pub mod zonal;

pub use components::{Raster, RasterGrid, ZoneCollection};
pub use config::PipelineConfig;
pub use errors::{ErrorKind, Result, RusterzoneError};
pub use pipeline::{Pipeline, RunReport, RunStatus};
pub use reclassify::{RangeTable, Reclassifier};
pub use zonal::{AugmentedZoneCollection, ZonalAggregator};
