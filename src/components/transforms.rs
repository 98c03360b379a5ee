use geo::{AffineTransform, Coord};
use shrinkwraprs::Shrinkwrap;

use crate::errors::{Result, RusterzoneError};

/// Transform from pixel space `(col, row)` to geo space.
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq)]
pub struct PixelGeoTransform(AffineTransform);

impl PixelGeoTransform {
    pub fn new(a: f64, b: f64, xoff: f64, d: f64, e: f64, yoff: f64) -> Self {
        Self(AffineTransform::new(a, b, xoff, d, e, yoff))
    }

    /// From gdal ordering `[xoff, a, b, yoff, d, e]`.
    pub fn from_gdal(gdal_transform: [f64; 6]) -> Self {
        Self::new(
            gdal_transform[1],
            gdal_transform[2],
            gdal_transform[0],
            gdal_transform[4],
            gdal_transform[5],
            gdal_transform[3],
        )
    }

    /// North-up grid with top left corner at `origin` and square-ish `cell_size`.
    pub fn north_up(origin: (f64, f64), cell_size: (f64, f64)) -> Self {
        Self::new(cell_size.0, 0., origin.0, 0., -cell_size.1, origin.1)
    }

    pub fn inverse(&self) -> Result<GeoPixelTransform> {
        self.0
            .inverse()
            .map(GeoPixelTransform)
            .ok_or_else(|| RusterzoneError::configuration("geotransform is not invertible"))
    }

    /// Geo coords of the center of cell `(col, row)`.
    pub fn cell_center(&self, col: usize, row: usize) -> Coord {
        self.0.apply(Coord {
            x: col as f64 + 0.5,
            y: row as f64 + 0.5,
        })
    }

    /// Corners of cell `(col, row)` in ring order.
    pub fn cell_corners(&self, col: usize, row: usize) -> [Coord; 4] {
        let (col, row) = (col as f64, row as f64);
        [
            (col, row),
            (col + 1., row),
            (col + 1., row + 1.),
            (col, row + 1.),
        ]
        .map(|(x, y)| self.0.apply(Coord { x, y }))
    }

    /// Unsigned area of a single cell.
    pub fn cell_area(&self) -> f64 {
        (self.0.a() * self.0.e() - self.0.b() * self.0.d()).abs()
    }
}

/// Transform from geo space to pixel space `(col, row)`.
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq)]
pub struct GeoPixelTransform(AffineTransform);
