//! Mapping of continuous cell values onto discrete classes.

mod table;

pub use table::{ClassRange, RangeBoundaries, RangeTable};

use log::{debug, info};
use num::{traits::AsPrimitive, NumCast};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    buffer::Buffer,
    components::{DataType, Raster, RasterGrid},
    errors::{Result, RusterzoneError},
};

/// What input no-data cells become.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum NoDataPolicy {
    /// Input no-data stays no-data.
    #[default]
    Preserve,
    /// Input no-data is assigned this class.
    Substitute(f64),
}

/// Reclassifies grids into `O` cells with a [RangeTable].
#[derive(Debug, Clone)]
pub struct Reclassifier<O: DataType> {
    table: RangeTable,
    boundaries: RangeBoundaries,
    /// Class of each range of `table`, cast to `O`.
    classes: Box<[O]>,
    substitute: Option<O>,
    nodata: O,
}

impl<O: DataType> Reclassifier<O> {
    pub fn new(
        table: RangeTable,
        boundaries: RangeBoundaries,
        policy: NoDataPolicy,
        nodata: O,
    ) -> Result<Self> {
        if table.is_empty() {
            return Err(RusterzoneError::configuration(
                "range table needs at least one range",
            ));
        }
        let nodata_value: f64 = nodata.as_();
        let classes = table
            .classes()
            .map(|class| cast_class(class, nodata_value))
            .collect::<Result<Box<[O]>>>()?;
        let substitute = match policy {
            NoDataPolicy::Preserve => None,
            NoDataPolicy::Substitute(class) => Some(cast_class(class, nodata_value)?),
        };
        Ok(Self {
            table,
            boundaries,
            classes,
            substitute,
            nodata,
        })
    }

    pub fn table(&self) -> &RangeTable {
        &self.table
    }

    pub fn boundaries(&self) -> RangeBoundaries {
        self.boundaries
    }

    pub fn nodata(&self) -> O {
        self.nodata
    }

    /// Class of a valid input value, `None` if no range contains it.
    pub fn classify(&self, value: f64) -> Option<O> {
        self.table
            .position(value, self.boundaries)
            .map(|idx| self.classes[idx])
    }

    /// Reclassifies the 1-based `band` of `raster`.
    pub fn reclassify<I: DataType>(&self, raster: &Raster<I>, band: usize) -> Result<RasterGrid<O>> {
        let grid = raster.band(band)?;
        info!(
            "reclassifying band {band} of {:?} with {} range(s)",
            raster,
            self.table.len()
        );
        Ok(self.reclassify_grid(grid))
    }

    pub fn reclassify_grid<I: DataType>(&self, grid: &RasterGrid<I>) -> RasterGrid<O> {
        let (width, height) = grid.shape();
        let mut buffer = Buffer::filled([height, width], self.nodata);
        buffer
            .as_mut()
            .par_chunks_mut(width.max(1))
            .zip(grid.cells().par_chunks(width.max(1)))
            .for_each(|(out_row, in_row)| {
                for (out, value) in out_row.iter_mut().zip(in_row) {
                    *out = self.reclassify_cell(grid, *value);
                }
            });
        debug!("reclassified {} cells", buffer.len());
        grid.with_buffer(buffer, self.nodata)
    }

    fn reclassify_cell<I: DataType>(&self, grid: &RasterGrid<I>, value: I) -> O {
        if grid.is_nodata(value) {
            return self.substitute.unwrap_or(self.nodata);
        }
        self.classify(value.as_()).unwrap_or(self.nodata)
    }
}

/// `value` as `O`, `None` unless it survives the round trip unchanged.
pub(crate) fn cast_exact<O: DataType>(value: f64) -> Option<O> {
    <O as NumCast>::from(value).filter(|cast| AsPrimitive::<f64>::as_(*cast) == value)
}

fn cast_class<O: DataType>(class: f64, nodata: f64) -> Result<O> {
    let cast = cast_exact(class).ok_or_else(|| {
        RusterzoneError::configuration(format!(
            "class {class} can not be stored as {}",
            std::any::type_name::<O>()
        ))
    })?;
    if class == nodata {
        return Err(RusterzoneError::configuration(format!(
            "class {class} collides with the output no-data value"
        )));
    }
    Ok(cast)
}
