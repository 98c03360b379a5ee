#[cfg(feature = "gdal")]
pub mod backends;
pub mod bounds;
pub mod geometry;
pub mod raster;
pub mod transforms;
pub mod zones;

pub use bounds::{GeoBounds, PixelBounds};
pub use geometry::ZoneGeometry;
pub use raster::{Raster, RasterGrid};
pub use transforms::{GeoPixelTransform, PixelGeoTransform};
pub use zones::{AttributeValue, Schema, Zone, ZoneCollection, ZoneId, ZoneShape};

use num::{traits::AsPrimitive, Num, NumCast};
use std::fmt::Debug;

/// Numeric cell storage type of a raster.
pub trait DataType:
    Num + NumCast + AsPrimitive<f64> + PartialOrd + Copy + Send + Sync + Debug + 'static
{
}

impl<T> DataType for T where
    T: Num + NumCast + AsPrimitive<f64> + PartialOrd + Copy + Send + Sync + Debug + 'static
{
}
