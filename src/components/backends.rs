use log::{debug, info};
use std::{collections::HashMap, path::PathBuf};

use crate::{
    components::{
        AttributeValue, DataType, PixelGeoTransform, Raster, RasterGrid, Schema, ZoneCollection,
    },
    errors::{Result, RusterzoneError},
    pipeline::{RasterSource, ZoneSource},
};

/// Implementations for gdal
pub mod gdal_backend {
    use super::*;
    use gdal::{
        raster::GdalType,
        vector::{FieldValue, LayerAccess},
        Dataset as GdalDataset, Metadata as GdalMetadata, MetadataEntry as GdalMetadataEntry,
    };
    use geo::{Geometry, MultiPolygon};
    use num::NumCast;

    fn filter_metadata_gdal(metadata: &impl GdalMetadata) -> HashMap<String, String> {
        GdalMetadata::metadata(metadata)
            .filter_map(|GdalMetadataEntry { domain, key, value }| {
                if domain.eq("") {
                    Some((key, value))
                } else {
                    None
                }
            })
            .collect()
    }

    fn attribute_from_gdal(value: Option<FieldValue>) -> AttributeValue {
        match value {
            None => AttributeValue::Null,
            Some(FieldValue::IntegerValue(value)) => AttributeValue::Integer(value.into()),
            Some(FieldValue::Integer64Value(value)) => AttributeValue::Integer(value),
            Some(FieldValue::RealValue(value)) => AttributeValue::Real(value),
            Some(value) => value
                .into_string()
                .map_or(AttributeValue::Null, AttributeValue::Text),
        }
    }

    /// Every band of a gdal raster dataset, read as `T`.
    #[derive(Debug)]
    pub struct GdalRasterSource<T: DataType + GdalType> {
        path: PathBuf,
        /// Used for bands without a no-data value.
        fallback_nodata: T,
    }

    impl<T: DataType + GdalType> GdalRasterSource<T> {
        pub fn new(path: impl Into<PathBuf>, fallback_nodata: T) -> Self {
            Self {
                path: path.into(),
                fallback_nodata,
            }
        }
    }

    impl<T: DataType + GdalType> RasterSource for GdalRasterSource<T> {
        type Cell = T;

        fn load(&self) -> Result<Raster<T>> {
            let dataset = GdalDataset::open(&self.path)?;
            debug!(
                "{:?} metadata {:?}",
                self.path,
                filter_metadata_gdal(&dataset)
            );
            let transform = PixelGeoTransform::from_gdal(dataset.geo_transform()?);
            let shape = dataset.raster_size();
            let bands = (1..=dataset.raster_count())
                .map(|index| {
                    let band = dataset.rasterband(index)?;
                    let nodata = band
                        .no_data_value()
                        .and_then(<T as NumCast>::from)
                        .unwrap_or(self.fallback_nodata);
                    let buffer = band.read_as::<T>((0, 0), shape, shape, None)?;
                    RasterGrid::new(shape, buffer.data().to_vec(), transform, nodata)
                })
                .collect::<Result<Vec<_>>>()?;
            Raster::new(GdalMetadata::description(&dataset)?, bands)
        }
    }

    /// Polygon features of the first layer of a gdal vector dataset.
    #[derive(Debug)]
    pub struct OgrZoneSource {
        path: PathBuf,
    }

    impl OgrZoneSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl ZoneSource for OgrZoneSource {
        fn load(&self) -> Result<ZoneCollection> {
            let dataset = GdalDataset::open(&self.path)?;
            let mut layer = dataset.layer(0)?;
            let schema = Schema::new(layer.defn().fields().map(|field| field.name()))?;
            let mut zones = ZoneCollection::new(schema);
            for (idx, feature) in layer.features().enumerate() {
                let geometry = match feature.geometry() {
                    Some(geometry) => geometry.to_geo()?,
                    None => Geometry::MultiPolygon(MultiPolygon::new(vec![])),
                };
                let shape = match geometry {
                    Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                    Geometry::MultiPolygon(multi_polygon) => multi_polygon,
                    other => {
                        return Err(RusterzoneError::geometry(
                            idx,
                            format!("expected a polygon, found {other:?}"),
                        ))
                    }
                };
                let attributes = feature
                    .fields()
                    .map(|(_, value)| attribute_from_gdal(value))
                    .collect();
                zones.push(shape, attributes)?;
            }
            info!("loaded {} zone(s) from {:?}", zones.len(), self.path);
            Ok(zones)
        }
    }
}
