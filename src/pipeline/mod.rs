//! Reclassify then aggregate, as one cancellable run.

mod cancellation;
pub mod io;

pub use cancellation::{CancellationSignal, CancellationToken};
pub use io::{MemorySink, RasterSource, ZoneSink, ZoneSource};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    components::DataType,
    config::PipelineConfig,
    errors::{ErrorKind, Result, RusterzoneError},
    reclassify::{cast_exact, Reclassifier},
    zonal::{AugmentedZoneCollection, ColumnNamer, ZonalAggregator},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Init,
    Reclassifying,
    Aggregating,
    Done,
    Cancelled,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }

    fn can_become(self, next: Self) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Init, Reclassifying)
                | (Reclassifying, Aggregating)
                | (Aggregating, Done)
                | (Init | Reclassifying | Aggregating, Cancelled | Failed)
        )
    }
}

/// Step of a run an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Loading,
    Reclassifying,
    Aggregating,
    Persisting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunStatus {
    Done,
    Cancelled,
    Failed {
        stage: Stage,
        kind: ErrorKind,
        message: String,
    },
}

/// Outcome of [Pipeline::run]. `outputs` is empty unless the run is done.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub outputs: BTreeMap<String, AugmentedZoneCollection>,
}

impl RunReport {
    pub fn is_done(&self) -> bool {
        self.status == RunStatus::Done
    }
}

struct Failure {
    stage: Stage,
    error: RusterzoneError,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, Failure>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, Failure> {
        self.map_err(|error| Failure { stage, error })
    }
}

/// Runs a [Reclassifier] over one band of a raster and counts the
/// classified cells per zone with a [ZonalAggregator].
///
/// Nothing reaches the sink unless every stage succeeds.
#[derive(Debug)]
pub struct Pipeline<O: DataType> {
    reclassifier: Reclassifier<O>,
    aggregator: ZonalAggregator,
    band: usize,
    output_key: String,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<O: DataType> Pipeline<O> {
    pub fn new(
        reclassifier: Reclassifier<O>,
        aggregator: ZonalAggregator,
        band: usize,
        output_key: impl Into<String>,
    ) -> Self {
        let pipeline = Self {
            reclassifier,
            aggregator,
            band,
            output_key: output_key.into(),
            state: PipelineState::Init,
            history: vec![PipelineState::Init],
        };
        info!(
            "new pipeline over band {} with {} range(s) into {:?}",
            pipeline.band,
            pipeline.reclassifier.table().len(),
            pipeline.output_key
        );
        pipeline
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let nodata = cast_exact::<O>(config.nodata).ok_or_else(|| {
            RusterzoneError::configuration(format!(
                "no-data {} can not be stored as {}",
                config.nodata,
                std::any::type_name::<O>()
            ))
        })?;
        let reclassifier = Reclassifier::new(
            config.range_table.clone(),
            config.range_boundaries,
            config.nodata_policy,
            nodata,
        )?;
        let aggregator =
            ZonalAggregator::new(config.containment, ColumnNamer::new(&config.column_prefix))?;
        Ok(Self::new(
            reclassifier,
            aggregator,
            config.band,
            &config.output_key,
        ))
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// States visited by the last run, starting with [PipelineState::Init].
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Loads both inputs, reclassifies, aggregates and persists the
    /// augmented zones under the output key.
    ///
    /// `cancel` is polled before each of the two stages. Errors never
    /// escape, they are reported in the [RunStatus].
    pub fn run<R, Z, K, C>(
        &mut self,
        raster: &R,
        zones: &Z,
        sink: &mut K,
        cancel: &C,
    ) -> RunReport
    where
        R: RasterSource + ?Sized,
        Z: ZoneSource + ?Sized,
        K: ZoneSink + ?Sized,
        C: CancellationSignal + ?Sized,
    {
        self.state = PipelineState::Init;
        self.history = vec![PipelineState::Init];
        let mut outputs = BTreeMap::new();
        let status = match self.execute(raster, zones, sink, cancel) {
            Ok(Some(augmented)) => {
                self.transition(PipelineState::Done);
                outputs.insert(self.output_key.clone(), augmented);
                RunStatus::Done
            }
            Ok(None) => {
                warn!("run cancelled while {:?}", self.state);
                self.transition(PipelineState::Cancelled);
                RunStatus::Cancelled
            }
            Err(Failure { stage, error }) => {
                error!("run failed while {stage:?}: {error}");
                self.transition(PipelineState::Failed);
                RunStatus::Failed {
                    stage,
                    kind: error.kind(),
                    message: error.to_string(),
                }
            }
        };
        RunReport { status, outputs }
    }

    fn execute<R, Z, K, C>(
        &mut self,
        raster: &R,
        zones: &Z,
        sink: &mut K,
        cancel: &C,
    ) -> std::result::Result<Option<AugmentedZoneCollection>, Failure>
    where
        R: RasterSource + ?Sized,
        Z: ZoneSource + ?Sized,
        K: ZoneSink + ?Sized,
        C: CancellationSignal + ?Sized,
    {
        let raster = raster.load().at(Stage::Loading)?;
        let zones = zones.load().at(Stage::Loading)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }

        self.transition(PipelineState::Reclassifying);
        let classified = self
            .reclassifier
            .reclassify(&raster, self.band)
            .at(Stage::Reclassifying)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }

        self.transition(PipelineState::Aggregating);
        let augmented = self
            .aggregator
            .augment(&classified, &zones)
            .at(Stage::Aggregating)?;
        sink.persist(&self.output_key, &augmented)
            .at(Stage::Persisting)?;
        Ok(Some(augmented))
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_become(next),
            "{:?} -> {next:?}",
            self.state
        );
        info!("pipeline {:?} -> {next:?}", self.state);
        self.state = next;
        self.history.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        AttributeValue, PixelGeoTransform, Raster, RasterGrid, Schema, ZoneCollection,
    };
    use geo::{polygon, Polygon};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ND: f32 = -9999.;

    fn square(min: f64, max: f64) -> Polygon {
        polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max)
        ]
    }

    /// 2x2 unit raster covering (0, 0) to (2, 2).
    fn ndwi() -> Raster<f32> {
        RasterGrid::new(
            (2, 2),
            vec![-0.5, 0.5, 1.0, ND],
            PixelGeoTransform::north_up((0., 2.), (1., 1.)),
            ND,
        )
        .unwrap()
        .into()
    }

    fn zones(polygons: Vec<Polygon>) -> ZoneCollection {
        let mut zones = ZoneCollection::new(Schema::new(["id"]).unwrap());
        for (idx, polygon) in polygons.into_iter().enumerate() {
            zones
                .push(polygon, vec![AttributeValue::Integer(idx as i64)])
                .unwrap();
        }
        zones
    }

    fn pipeline(prefix: &str) -> Pipeline<f32> {
        Pipeline::from_config(&PipelineConfig {
            column_prefix: prefix.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    /// Cancels once it has been polled `polls` times.
    struct CancelAfter {
        polls: usize,
        seen: AtomicUsize,
    }

    impl CancelAfter {
        fn new(polls: usize) -> Self {
            Self {
                polls,
                seen: AtomicUsize::new(0),
            }
        }
    }

    impl CancellationSignal for CancelAfter {
        fn is_cancelled(&self) -> bool {
            self.seen.fetch_add(1, Ordering::SeqCst) >= self.polls
        }
    }

    struct FailingSink;

    impl ZoneSink for FailingSink {
        fn persist(&mut self, _: &str, _: &AugmentedZoneCollection) -> Result<()> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test_log::test]
    fn water_extent_counts() {
        let mut pipeline = pipeline("_");
        let mut sink = MemorySink::default();
        let report = pipeline.run(&ndwi(), &zones(vec![square(0., 2.)]), &mut sink, &());

        assert_eq!(report.status, RunStatus::Done);
        let augmented = &report.outputs["PolygonsZonalHistogram"];
        assert_eq!(augmented.class_columns(), &["_0", "_1"]);
        let zones = augmented.zones();
        assert_eq!(zones.attribute(0, "id"), Some(&AttributeValue::Integer(0)));
        assert_eq!(zones.attribute(0, "_0"), Some(&AttributeValue::Integer(1)));
        assert_eq!(zones.attribute(0, "_1"), Some(&AttributeValue::Integer(2)));
        assert_eq!(sink.get("PolygonsZonalHistogram"), Some(augmented));
        assert_eq!(
            pipeline.history(),
            &[
                PipelineState::Init,
                PipelineState::Reclassifying,
                PipelineState::Aggregating,
                PipelineState::Done
            ]
        );
    }

    #[test]
    fn disjoint_zone_gets_zero_counts() {
        let mut sink = MemorySink::default();
        let report = pipeline("HISTO_").run(
            &ndwi(),
            &zones(vec![square(0., 2.), square(5., 6.)]),
            &mut sink,
            &(),
        );
        assert!(report.is_done());
        let zones = report.outputs["PolygonsZonalHistogram"].zones();
        assert_eq!(zones.attribute(1, "HISTO_0"), Some(&AttributeValue::Integer(0)));
        assert_eq!(zones.attribute(1, "HISTO_1"), Some(&AttributeValue::Integer(0)));
    }

    #[test]
    fn cancelled_before_aggregating() {
        let mut pipeline = pipeline("_");
        let mut sink = MemorySink::default();
        let report = pipeline.run(
            &ndwi(),
            &zones(vec![square(0., 2.)]),
            &mut sink,
            &CancelAfter::new(1),
        );
        assert_eq!(report.status, RunStatus::Cancelled);
        assert!(report.outputs.is_empty());
        assert!(sink.is_empty());
        assert_eq!(
            pipeline.history(),
            &[
                PipelineState::Init,
                PipelineState::Reclassifying,
                PipelineState::Cancelled
            ]
        );
    }

    #[test]
    fn cancelled_before_starting() {
        let token = CancellationToken::new();
        token.cancel();
        let mut pipeline = pipeline("_");
        let mut sink = MemorySink::default();
        let report = pipeline.run(&ndwi(), &zones(vec![square(0., 2.)]), &mut sink, &token);
        assert_eq!(report.status, RunStatus::Cancelled);
        assert_eq!(pipeline.state(), PipelineState::Cancelled);
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_band_fails_reclassification() {
        let mut pipeline: Pipeline<f32> = Pipeline::from_config(&PipelineConfig {
            band: 2,
            ..Default::default()
        })
        .unwrap();
        let mut sink = MemorySink::default();
        let report = pipeline.run(&ndwi(), &zones(vec![square(0., 2.)]), &mut sink, &());
        assert!(matches!(
            report.status,
            RunStatus::Failed {
                stage: Stage::Reclassifying,
                kind: ErrorKind::BandIndex,
                ..
            }
        ));
        assert!(report.outputs.is_empty());
        assert!(sink.is_empty());
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn invalid_zone_fails_aggregation() {
        let bowtie = polygon![(x: 0., y: 0.), (x: 2., y: 2.), (x: 2., y: 0.), (x: 0., y: 2.)];
        let mut sink = MemorySink::default();
        let report = pipeline("_").run(&ndwi(), &zones(vec![bowtie]), &mut sink, &());
        assert!(matches!(
            report.status,
            RunStatus::Failed {
                stage: Stage::Aggregating,
                kind: ErrorKind::Geometry,
                ..
            }
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn colliding_prefix_fails_aggregation() {
        let mut zones = ZoneCollection::new(Schema::new(["_1"]).unwrap());
        zones
            .push(square(0., 2.), vec![AttributeValue::Null])
            .unwrap();
        let report = pipeline("_").run(&ndwi(), &zones, &mut MemorySink::default(), &());
        assert!(matches!(
            report.status,
            RunStatus::Failed {
                kind: ErrorKind::SchemaConflict,
                ..
            }
        ));
    }

    #[test]
    fn sink_failure_is_reported() {
        let report = pipeline("_").run(
            &ndwi(),
            &zones(vec![square(0., 2.)]),
            &mut FailingSink,
            &(),
        );
        assert!(matches!(
            report.status,
            RunStatus::Failed {
                stage: Stage::Persisting,
                kind: ErrorKind::Io,
                ..
            }
        ));
        assert!(report.outputs.is_empty());
    }

    #[test]
    fn unrepresentable_nodata() {
        let result = Pipeline::<u8>::from_config(&PipelineConfig::default());
        assert!(matches!(result, Err(RusterzoneError::Configuration(_))));
    }

    #[test]
    fn fractional_nodata_for_integer_output() {
        let config = PipelineConfig {
            nodata: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::<i16>::from_config(&config),
            Err(RusterzoneError::Configuration(_))
        ));
        let config = PipelineConfig {
            nodata: -1.,
            ..Default::default()
        };
        assert_eq!(
            Pipeline::<i16>::from_config(&config).unwrap().reclassifier.nodata(),
            -1
        );
    }

    #[test]
    fn reruns_reset_history() {
        let mut pipeline = pipeline("_");
        let raster = ndwi();
        let zones = zones(vec![square(0., 2.)]);
        let first = pipeline.run(&raster, &zones, &mut MemorySink::default(), &());
        let second = pipeline.run(&raster, &zones, &mut MemorySink::default(), &());
        assert_eq!(first.outputs, second.outputs);
        assert_eq!(pipeline.history().len(), 4);
        assert!(pipeline.state().is_terminal());
    }
}
