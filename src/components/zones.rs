use geo::{MultiPolygon, Polygon};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;
use std::sync::Arc;

use crate::errors::{Result, RusterzoneError};

/// Position of a zone in its [ZoneCollection].
pub type ZoneId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Ordered attribute names shared by every zone of a collection.
#[derive(Shrinkwrap, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct Schema(Arc<[String]>);

impl TryFrom<Vec<String>> for Schema {
    type Error = RusterzoneError;
    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::new(value)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

impl Schema {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let names: Arc<[String]> = names.into_iter().map(Into::into).collect();
        if let Some(duplicate) = names.iter().duplicates().next() {
            return Err(RusterzoneError::SchemaConflict(format!(
                "attribute {duplicate:?} is declared more than once"
            )));
        }
        Ok(Self(names))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|existing| existing == name)
    }

    /// Schema with `names` appended after the existing attributes.
    pub fn extended<S: Into<String>>(&self, names: impl IntoIterator<Item = S>) -> Result<Self> {
        Self::new(
            self.0
                .iter()
                .cloned()
                .chain(names.into_iter().map(Into::into)),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub geometry: MultiPolygon,
    pub attributes: Vec<AttributeValue>,
}

/// Ordered polygon zones with positionally consistent attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "ZoneRecords")]
pub struct ZoneCollection {
    schema: Schema,
    zones: Vec<Zone>,
}

/// Unchecked serialized form of a [ZoneCollection].
#[derive(Deserialize)]
struct ZoneRecords {
    schema: Schema,
    zones: Vec<Zone>,
}

impl TryFrom<ZoneRecords> for ZoneCollection {
    type Error = RusterzoneError;
    fn try_from(value: ZoneRecords) -> Result<Self> {
        let mut collection = Self::new(value.schema);
        for zone in value.zones {
            collection.push(zone.geometry, zone.attributes)?;
        }
        Ok(collection)
    }
}

impl ZoneCollection {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            zones: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        geometry: impl Into<ZoneShape>,
        attributes: Vec<AttributeValue>,
    ) -> Result<ZoneId> {
        if attributes.len() != self.schema.len() {
            return Err(RusterzoneError::SchemaConflict(format!(
                "zone {} has {} attribute(s), schema declares {}",
                self.zones.len(),
                attributes.len(),
                self.schema.len()
            )));
        }
        self.zones.push(Zone {
            geometry: geometry.into().0,
            attributes,
        });
        Ok(self.zones.len() - 1)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &Zone)> {
        self.zones.iter().enumerate()
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn attribute(&self, id: ZoneId, name: &str) -> Option<&AttributeValue> {
        let position = self.schema.position(name)?;
        self.zones.get(id)?.attributes.get(position)
    }
}

/// Polygonal geometry accepted for a zone.
pub struct ZoneShape(MultiPolygon);

impl From<Polygon> for ZoneShape {
    fn from(value: Polygon) -> Self {
        Self(MultiPolygon::new(vec![value]))
    }
}

impl From<MultiPolygon> for ZoneShape {
    fn from(value: MultiPolygon) -> Self {
        Self(value)
    }
}
