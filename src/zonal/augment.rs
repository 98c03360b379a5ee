use serde::{Deserialize, Serialize};

use crate::{
    components::{AttributeValue, ZoneCollection},
    errors::{Result, RusterzoneError},
    zonal::histogram::{ClassHistogram, ClassSet, ClassValue},
};

pub const DEFAULT_COLUMN_PREFIX: &str = "HISTO_";

/// Names class count columns as `prefix` followed by the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnNamer {
    prefix: String,
}

impl Default for ColumnNamer {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN_PREFIX)
    }
}

impl ColumnNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn column(&self, class: ClassValue) -> String {
        format!("{}{class}", self.prefix)
    }
}

/// Zones with one count column per class of the classified raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedZoneCollection {
    zones: ZoneCollection,
    classes: ClassSet,
}

impl AugmentedZoneCollection {
    /// Appends a count column per class of `classes`, ascending, after
    /// the attributes of `zones`.
    pub fn merge(
        zones: &ZoneCollection,
        classes: ClassSet,
        histograms: &[ClassHistogram],
        namer: &ColumnNamer,
    ) -> Result<Self> {
        if histograms.len() != zones.len() {
            return Err(RusterzoneError::SchemaConflict(format!(
                "{} histogram(s) for {} zone(s)",
                histograms.len(),
                zones.len()
            )));
        }
        let columns: Vec<String> = classes.iter().map(|class| namer.column(class)).collect();
        if let Some(column) = columns
            .iter()
            .find(|column| zones.schema().position(column).is_some())
        {
            return Err(RusterzoneError::SchemaConflict(format!(
                "class column {column:?} collides with an existing attribute"
            )));
        }
        let schema = zones.schema().extended(columns)?;

        let mut augmented = ZoneCollection::new(schema);
        for ((_, zone), histogram) in zones.iter().zip(histograms) {
            let attributes = zone
                .attributes
                .iter()
                .cloned()
                .chain(
                    classes
                        .iter()
                        .map(|class| AttributeValue::Integer(histogram.count(class) as i64)),
                )
                .collect();
            augmented.push(zone.geometry.clone(), attributes)?;
        }
        Ok(Self {
            zones: augmented,
            classes,
        })
    }

    pub fn zones(&self) -> &ZoneCollection {
        &self.zones
    }

    pub fn into_zones(self) -> ZoneCollection {
        self.zones
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    /// Names of the class count columns, ascending by class.
    pub fn class_columns(&self) -> &[String] {
        let schema = self.zones.schema();
        &schema[schema.len() - self.classes.len()..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Schema;
    use geo::polygon;

    fn zones(schema: &[&str]) -> ZoneCollection {
        let mut zones = ZoneCollection::new(Schema::new(schema.iter().copied()).unwrap());
        let attributes = vec![AttributeValue::Null; schema.len()];
        zones
            .push(
                polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)],
                attributes.clone(),
            )
            .unwrap();
        zones
            .push(
                polygon![(x: 5., y: 5.), (x: 6., y: 5.), (x: 6., y: 6.)],
                attributes,
            )
            .unwrap();
        zones
    }

    fn classes() -> ClassSet {
        [0., 1.].into_iter().map(ClassValue::from).collect()
    }

    #[test]
    fn appends_columns_in_class_order() {
        let histograms = [
            [(ClassValue::from(1.), 2), (ClassValue::from(0.), 1)]
                .into_iter()
                .collect(),
            ClassHistogram::default(),
        ];
        let augmented = AugmentedZoneCollection::merge(
            &zones(&["site"]),
            classes(),
            &histograms,
            &ColumnNamer::new("_"),
        )
        .unwrap();
        assert_eq!(&augmented.zones().schema()[..], &["site", "_0", "_1"]);
        assert_eq!(augmented.class_columns(), &["_0", "_1"]);
        let zones = augmented.zones();
        assert_eq!(zones.attribute(0, "_0"), Some(&AttributeValue::Integer(1)));
        assert_eq!(zones.attribute(0, "_1"), Some(&AttributeValue::Integer(2)));
        assert_eq!(zones.attribute(1, "_0"), Some(&AttributeValue::Integer(0)));
        assert_eq!(zones.attribute(1, "_1"), Some(&AttributeValue::Integer(0)));
    }

    #[test]
    fn column_collision_is_a_schema_conflict() {
        let histograms = [ClassHistogram::default(), ClassHistogram::default()];
        let result = AugmentedZoneCollection::merge(
            &zones(&["site", "HISTO_1"]),
            classes(),
            &histograms,
            &ColumnNamer::default(),
        );
        assert!(matches!(result, Err(RusterzoneError::SchemaConflict(_))));
    }
}
