use ndarray::{Array2, ArrayView2};
use num::traits::AsPrimitive;
use std::fmt::Debug;

use crate::{
    buffer::Buffer,
    components::{transforms::PixelGeoTransform, DataType},
    errors::Result,
};

/// Single band grid of cells.
///
/// Cells are stored row-major, `(col, row)` maps to geo space
/// through the grid's [PixelGeoTransform].
#[derive(Clone, PartialEq)]
pub struct RasterGrid<T: DataType> {
    buffer: Buffer<T, 2>,
    transform: PixelGeoTransform,
    nodata: T,
}

impl<T: DataType> Debug for RasterGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterGrid")
            .field("shape", &self.shape())
            .field("transform", &self.transform)
            .field("nodata", &self.nodata)
            .finish()
    }
}

impl<T: DataType> RasterGrid<T> {
    pub fn new(
        shape: (usize, usize),
        data: Vec<T>,
        transform: PixelGeoTransform,
        nodata: T,
    ) -> Result<Self> {
        let buffer = Buffer::from_parts(data.into_boxed_slice(), [shape.1, shape.0])?;
        Ok(Self {
            buffer,
            transform,
            nodata,
        })
    }

    /// Grid from a `(rows, cols)` array.
    pub fn from_array(array: Array2<T>, transform: PixelGeoTransform, nodata: T) -> Result<Self> {
        let (height, width) = array.dim();
        Self::new(
            (width, height),
            array.iter().copied().collect(),
            transform,
            nodata,
        )
    }

    pub fn as_array(&self) -> Result<ArrayView2<'_, T>> {
        let [height, width] = self.buffer.shape();
        Ok(ArrayView2::from_shape((height, width), self.buffer.as_ref())?)
    }

    pub fn width(&self) -> usize {
        self.buffer.shape()[1]
    }

    pub fn height(&self) -> usize {
        self.buffer.shape()[0]
    }

    /// (width, height)
    pub fn shape(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn transform(&self) -> &PixelGeoTransform {
        &self.transform
    }

    pub fn nodata(&self) -> T {
        self.nodata
    }

    pub fn cells(&self) -> &[T] {
        self.buffer.as_ref()
    }

    pub fn row(&self, row: usize) -> &[T] {
        self.buffer.row(row)
    }

    pub fn get(&self, col: usize, row: usize) -> T {
        self.buffer.row(row)[col]
    }

    /// Cell value, `None` when no-data.
    pub fn value(&self, col: usize, row: usize) -> Option<T> {
        let value = self.get(col, row);
        (!self.is_nodata(value)).then_some(value)
    }

    /// NaN cells count as no-data whatever the sentinel.
    pub fn is_nodata(&self, value: T) -> bool {
        value == self.nodata || AsPrimitive::<f64>::as_(value).is_nan()
    }

    /// Copy of the grid sharing shape and transform, with new cells.
    pub(crate) fn with_buffer<O: DataType>(&self, buffer: Buffer<O, 2>, nodata: O) -> RasterGrid<O> {
        RasterGrid {
            buffer,
            transform: self.transform,
            nodata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RusterzoneError;
    use ndarray::array;

    fn transform() -> PixelGeoTransform {
        PixelGeoTransform::north_up((0., 2.), (1., 1.))
    }

    #[test]
    fn from_array_is_row_major() {
        let grid = RasterGrid::from_array(array![[1i16, 2, 3], [4, 5, -1]], transform(), -1)
            .unwrap();
        assert_eq!(grid.shape(), (3, 2));
        assert_eq!(grid.get(2, 0), 3);
        assert_eq!(grid.row(1), &[4, 5, -1]);
        assert_eq!(grid.value(2, 1), None);
        assert_eq!(grid.as_array().unwrap(), array![[1i16, 2, 3], [4, 5, -1]]);
    }

    #[test]
    fn nan_is_nodata() {
        let grid =
            RasterGrid::new((2, 1), vec![f32::NAN, 0.5], transform(), -9999.).unwrap();
        assert_eq!(grid.value(0, 0), None);
        assert_eq!(grid.value(1, 0), Some(0.5));
        assert!(grid.is_nodata(-9999.));
    }

    #[test]
    fn wrong_length_is_rejected() {
        let result = RasterGrid::new((2, 2), vec![0u8; 3], transform(), 255);
        assert!(matches!(result, Err(RusterzoneError::Shape { .. })));
    }
}
