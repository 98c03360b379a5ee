use geo::{
    coordinate_position::{CoordPos, CoordinatePosition},
    Area, BoundingRect, Coord, MultiPolygon, Polygon, Validation,
};

use crate::{
    components::{bounds::GeoBounds, zones::ZoneId},
    errors::{Result, RusterzoneError},
    intersection::Intersection,
};

/// Capabilities a zone geometry needs to attribute raster cells.
pub trait ZoneGeometry: Sync {
    /// Point lies inside the geometry or on its boundary.
    fn contains_point(&self, point: Coord) -> bool;

    fn bounding_box(&self) -> Option<GeoBounds>;

    /// Area of `cell` covered by the geometry.
    fn overlap_area(&self, cell: &Polygon) -> f64;

    /// Rejects geometries cells can not be attributed to.
    fn validate(&self, zone: ZoneId) -> Result<()>;
}

impl ZoneGeometry for Polygon {
    fn contains_point(&self, point: Coord) -> bool {
        self.coordinate_position(&point) != CoordPos::Outside
    }

    fn bounding_box(&self) -> Option<GeoBounds> {
        self.bounding_rect().map(GeoBounds::from)
    }

    fn overlap_area(&self, cell: &Polygon) -> f64 {
        Intersection::intersection(cell, self)
            .map(|overlap| overlap.unsigned_area())
            .unwrap_or(0.)
    }

    fn validate(&self, zone: ZoneId) -> Result<()> {
        self.check_validation()
            .map_err(|invalid| RusterzoneError::geometry(zone, invalid.to_string()))?;
        if self.unsigned_area() <= 0. {
            return Err(RusterzoneError::geometry(zone, "polygon has no area"));
        }
        Ok(())
    }
}

impl ZoneGeometry for MultiPolygon {
    fn contains_point(&self, point: Coord) -> bool {
        self.coordinate_position(&point) != CoordPos::Outside
    }

    fn bounding_box(&self) -> Option<GeoBounds> {
        self.bounding_rect().map(GeoBounds::from)
    }

    fn overlap_area(&self, cell: &Polygon) -> f64 {
        self.0
            .iter()
            .map(|polygon| polygon.overlap_area(cell))
            .sum()
    }

    fn validate(&self, zone: ZoneId) -> Result<()> {
        if self.0.is_empty() {
            return Err(RusterzoneError::geometry(zone, "geometry is empty"));
        }
        self.0
            .iter()
            .try_for_each(|polygon| polygon.validate(zone))?;
        // overlapping members
        self.check_validation()
            .map_err(|invalid| RusterzoneError::geometry(zone, invalid.to_string()))
    }
}
