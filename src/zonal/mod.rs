//! Per zone class counts of a classified raster.

mod augment;
mod containment;
mod histogram;

pub use augment::{AugmentedZoneCollection, ColumnNamer, DEFAULT_COLUMN_PREFIX};
pub use containment::ContainmentPolicy;
pub use histogram::{ClassHistogram, ClassSet, ClassValue};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    components::{
        DataType, GeoPixelTransform, PixelBounds, RasterGrid, ZoneCollection, ZoneGeometry, ZoneId,
    },
    errors::{Result, RusterzoneError},
};

/// Counts classified cells per zone.
#[derive(Debug, Clone, Default)]
pub struct ZonalAggregator {
    policy: ContainmentPolicy,
    namer: ColumnNamer,
}

impl ZonalAggregator {
    pub fn new(policy: ContainmentPolicy, namer: ColumnNamer) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy, namer })
    }

    pub fn policy(&self) -> ContainmentPolicy {
        self.policy
    }

    pub fn namer(&self) -> &ColumnNamer {
        &self.namer
    }

    /// Histogram of the cells of `classified` attributed to `geometry`.
    pub fn histogram<T: DataType, G: ZoneGeometry>(
        &self,
        classified: &RasterGrid<T>,
        geometry: &G,
        zone: ZoneId,
    ) -> Result<ClassHistogram> {
        geometry.validate(zone)?;
        let inverse = classified.transform().inverse()?;
        self.zone_histogram(classified, &inverse, geometry, zone)
    }

    /// Histograms of every zone, indexed by [ZoneId].
    pub fn aggregate<T: DataType>(
        &self,
        classified: &RasterGrid<T>,
        zones: &ZoneCollection,
    ) -> Result<Vec<ClassHistogram>> {
        info!(
            "aggregating {} zone(s) over {:?} with {:?}",
            zones.len(),
            classified,
            self.policy
        );
        // Sequential so the first invalid zone is the one reported.
        zones
            .iter()
            .try_for_each(|(id, zone)| zone.geometry.validate(id))?;
        let inverse = classified.transform().inverse()?;
        zones
            .zones()
            .par_iter()
            .enumerate()
            .map(|(id, zone)| self.zone_histogram(classified, &inverse, &zone.geometry, id))
            .collect()
    }

    /// `zones` with a count column per class found anywhere in `classified`.
    pub fn augment<T: DataType>(
        &self,
        classified: &RasterGrid<T>,
        zones: &ZoneCollection,
    ) -> Result<AugmentedZoneCollection> {
        let classes = ClassSet::of_grid(classified);
        debug!("classes in raster: {classes:?}");
        let histograms = self.aggregate(classified, zones)?;
        AugmentedZoneCollection::merge(zones, classes, &histograms, &self.namer)
    }

    fn zone_histogram<T: DataType, G: ZoneGeometry + ?Sized>(
        &self,
        classified: &RasterGrid<T>,
        inverse: &GeoPixelTransform,
        geometry: &G,
        zone: ZoneId,
    ) -> Result<ClassHistogram> {
        let mut histogram = ClassHistogram::default();
        let Some(bounds) = geometry.bounding_box() else {
            return Ok(histogram);
        };
        let window = match PixelBounds::covering(&bounds, inverse, classified.shape()) {
            Ok(window) => window,
            Err(RusterzoneError::NoIntersection) => {
                warn!("zone {zone} does not overlap the raster");
                return Ok(histogram);
            }
            Err(err) => return Err(err),
        };
        debug!("zone {zone}: scanning {window:?}");
        let transform = classified.transform();
        for row in window.rows() {
            for col in window.cols() {
                let Some(value) = classified.value(col, row) else {
                    continue;
                };
                if self.policy.attributes(geometry, transform, col, row) {
                    histogram.increment(ClassValue::of(value));
                }
            }
        }
        Ok(histogram)
    }
}
