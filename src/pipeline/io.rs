use log::info;
use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::{
    components::{DataType, Raster, ZoneCollection},
    errors::Result,
    zonal::AugmentedZoneCollection,
};

/// Provides the raster to reclassify.
pub trait RasterSource {
    type Cell: DataType;
    fn load(&self) -> Result<Raster<Self::Cell>>;
}

/// Provides the polygon zones to aggregate over.
pub trait ZoneSource {
    fn load(&self) -> Result<ZoneCollection>;
}

/// Persists the result of a successful run.
pub trait ZoneSink {
    fn persist(&mut self, key: &str, zones: &AugmentedZoneCollection) -> Result<()>;
}

impl<T: DataType> RasterSource for Raster<T> {
    type Cell = T;
    fn load(&self) -> Result<Raster<T>> {
        Ok(self.clone())
    }
}

impl ZoneSource for ZoneCollection {
    fn load(&self) -> Result<ZoneCollection> {
        Ok(self.clone())
    }
}

/// Keeps persisted collections in memory, by output key.
#[derive(Debug, Default)]
pub struct MemorySink {
    outputs: BTreeMap<String, AugmentedZoneCollection>,
}

impl MemorySink {
    pub fn get(&self, key: &str) -> Option<&AugmentedZoneCollection> {
        self.outputs.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn into_outputs(self) -> BTreeMap<String, AugmentedZoneCollection> {
        self.outputs
    }
}

impl ZoneSink for MemorySink {
    fn persist(&mut self, key: &str, zones: &AugmentedZoneCollection) -> Result<()> {
        self.outputs.insert(key.to_string(), zones.clone());
        Ok(())
    }
}

/// Writes each persisted collection to `<dir>/<key>.json`.
#[derive(Debug)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ZoneSink for JsonFileSink {
    fn persist(&mut self, key: &str, zones: &AugmentedZoneCollection) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        fs::write(&path, serde_json::to_vec_pretty(zones)?)?;
        info!("wrote {} zone(s) to {path:?}", zones.zones().len());
        Ok(())
    }
}
