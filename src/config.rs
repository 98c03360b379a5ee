use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::path::Path;

use crate::{
    errors::{Result, RusterzoneError},
    reclassify::{NoDataPolicy, RangeBoundaries, RangeTable},
    zonal::{ContainmentPolicy, DEFAULT_COLUMN_PREFIX},
};

pub const DEFAULT_OUTPUT_KEY: &str = "PolygonsZonalHistogram";

/// Parameters of a reclassify and zonal histogram run.
///
/// Missing fields take the defaults of the NDWI water extent model:
/// band 1, `(-1, 0] -> 0` and `(0, 1] -> 1`, no-data `-9999`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 1-based band of the input raster.
    pub band: usize,
    pub range_table: RangeTable,
    pub range_boundaries: RangeBoundaries,
    /// No-data value of the classified raster.
    pub nodata: f64,
    pub nodata_policy: NoDataPolicy,
    pub containment: ContainmentPolicy,
    pub column_prefix: String,
    pub output_key: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            band: 1,
            range_table: RangeTable::default(),
            range_boundaries: RangeBoundaries::default(),
            nodata: -9999.,
            nodata_policy: NoDataPolicy::default(),
            containment: ContainmentPolicy::default(),
            column_prefix: DEFAULT_COLUMN_PREFIX.to_string(),
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Malformed or invalid documents are configuration errors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| match err.classify() {
            Category::Io => RusterzoneError::Json(err),
            Category::Syntax | Category::Data | Category::Eof => {
                RusterzoneError::configuration(err.to_string())
            }
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
