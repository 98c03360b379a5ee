use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::{
    components::{PixelGeoTransform, ZoneGeometry},
    errors::{Result, RusterzoneError},
};

/// Rule attributing a raster cell to a zone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ContainmentPolicy {
    /// Cell center lies inside the zone or on its boundary.
    #[default]
    CellCenter,
    /// Share of the cell footprint covered by the zone is above the threshold.
    OverlapFraction(f64),
}

impl ContainmentPolicy {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::CellCenter => Ok(()),
            Self::OverlapFraction(threshold) if (0. ..1.).contains(threshold) => Ok(()),
            Self::OverlapFraction(threshold) => Err(RusterzoneError::configuration(format!(
                "overlap threshold {threshold} is outside [0, 1)"
            ))),
        }
    }

    pub fn attributes<G: ZoneGeometry + ?Sized>(
        &self,
        geometry: &G,
        transform: &PixelGeoTransform,
        col: usize,
        row: usize,
    ) -> bool {
        match self {
            Self::CellCenter => geometry.contains_point(transform.cell_center(col, row)),
            Self::OverlapFraction(threshold) => {
                let footprint = Polygon::new(
                    LineString::from(transform.cell_corners(col, row).to_vec()),
                    vec![],
                );
                geometry.overlap_area(&footprint) / transform.cell_area() > *threshold
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use rstest::rstest;

    /// Zone covering the left 0.4 of the top left cell of a unit grid.
    fn sliver() -> Polygon {
        polygon![(x: 0., y: 1.), (x: 0.4, y: 1.), (x: 0.4, y: 2.), (x: 0., y: 2.)]
    }

    #[rstest]
    #[case(ContainmentPolicy::CellCenter, false)]
    #[case(ContainmentPolicy::OverlapFraction(0.), true)]
    #[case(ContainmentPolicy::OverlapFraction(0.3), true)]
    #[case(ContainmentPolicy::OverlapFraction(0.5), false)]
    fn partial_cell(#[case] policy: ContainmentPolicy, #[case] attributed: bool) {
        let transform = PixelGeoTransform::north_up((0., 2.), (1., 1.));
        assert_eq!(policy.attributes(&sliver(), &transform, 0, 0), attributed);
    }

    #[rstest]
    #[case(ContainmentPolicy::OverlapFraction(-0.1))]
    #[case(ContainmentPolicy::OverlapFraction(1.))]
    #[case(ContainmentPolicy::OverlapFraction(f64::NAN))]
    fn invalid_thresholds(#[case] policy: ContainmentPolicy) {
        assert!(policy.validate().is_err());
    }
}
