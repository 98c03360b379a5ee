mod grid;

pub use grid::RasterGrid;

use log::info;
use std::fmt::Debug;

use crate::{
    components::DataType,
    errors::{Result, RusterzoneError},
};

/// Collection of bands that share size,
/// geotransform and data type.
#[derive(Clone)]
pub struct Raster<T: DataType> {
    description: String,
    bands: Box<[RasterGrid<T>]>,
}

impl<T: DataType> Debug for Raster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let f = &mut f.debug_struct("Raster");
        f.field("description", &self.description)
            .field("shape", &self.shape())
            .field("bands", &self.bands.len())
            .finish()
    }
}

impl<T: DataType> From<RasterGrid<T>> for Raster<T> {
    fn from(value: RasterGrid<T>) -> Self {
        Self {
            description: String::new(),
            bands: Box::new([value]),
        }
    }
}

impl<T: DataType> Raster<T> {
    pub fn new(description: impl Into<String>, bands: Vec<RasterGrid<T>>) -> Result<Self> {
        let Some(first) = bands.first() else {
            return Err(RusterzoneError::configuration("raster has no bands"));
        };
        if let Some(band) = bands.iter().find(|band| {
            band.shape() != first.shape() || band.transform() != first.transform()
        }) {
            return Err(RusterzoneError::configuration(format!(
                "band {:?} does not share shape and transform with {:?}",
                band, first
            )));
        }
        let raster = Self {
            description: description.into(),
            bands: bands.into_boxed_slice(),
        };
        info!("new {raster:?}");
        Ok(raster)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// (width, height)
    pub fn shape(&self) -> (usize, usize) {
        self.bands[0].shape()
    }

    /// Band by 1-based `index`.
    pub fn band(&self, index: usize) -> Result<&RasterGrid<T>> {
        index
            .checked_sub(1)
            .and_then(|idx| self.bands.get(idx))
            .ok_or(RusterzoneError::BandIndex {
                requested: index,
                available: self.bands.len(),
            })
    }
}
