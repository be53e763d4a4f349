use crate::data::{GaugeArchive, GaugeStation, ObservationBatch};
use crate::prelude::{CompareConfig, CompareError, CompareResult, SpatialAggregator};
use crate::processing::aggregate::build_aggregator;
use crate::processing::align::{AlignedPair, Alignment, AlignmentStage, EmptyReason};
use crate::processing::assemble::{SampleAccumulator, StationSeries, TimeSeriesAssembler};
use crate::processing::statistics::{RadiusSummary, StationStatistics};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use rayon::prelude::*;
use serde::Serialize;

/// Result of comparing one station at one radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StationOutcome {
    Compared {
        statistics: StationStatistics,
        pair: AlignedPair,
    },
    Empty {
        station_id: String,
        reason: EmptyReason,
    },
    Failed {
        station_id: String,
        reason: String,
    },
}

impl StationOutcome {
    pub fn station_id(&self) -> &str {
        match self {
            StationOutcome::Compared { statistics, .. } => &statistics.station_id,
            StationOutcome::Empty { station_id, .. } | StationOutcome::Failed { station_id, .. } => {
                station_id
            }
        }
    }

    pub fn statistics(&self) -> Option<&StationStatistics> {
        match self {
            StationOutcome::Compared { statistics, .. } => Some(statistics),
            _ => None,
        }
    }

    pub fn pair(&self) -> Option<&AlignedPair> {
        match self {
            StationOutcome::Compared { pair, .. } => Some(pair),
            _ => None,
        }
    }
}

/// Everything produced for one radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusReport {
    pub summary: RadiusSummary,
    pub stations: Vec<StationOutcome>,
    pub metrics: MetricsSnapshot,
}

impl RadiusReport {
    pub fn statistics(&self) -> impl Iterator<Item = &StationStatistics> {
        self.stations.iter().filter_map(StationOutcome::statistics)
    }

    pub fn outcome(&self, station_id: &str) -> Option<&StationOutcome> {
        self.stations.iter().find(|o| o.station_id() == station_id)
    }
}

/// Radius × file × gauge comparison driver.
pub struct ComparisonPipeline {
    config: CompareConfig,
    aggregator: Box<dyn SpatialAggregator>,
    assembler: TimeSeriesAssembler,
    alignment: AlignmentStage,
}

impl ComparisonPipeline {
    pub fn new(config: CompareConfig) -> CompareResult<Self> {
        let aggregator = build_aggregator(&config);
        Self::with_aggregator(config, aggregator)
    }

    pub fn with_aggregator(
        config: CompareConfig,
        aggregator: Box<dyn SpatialAggregator>,
    ) -> CompareResult<Self> {
        config.validate()?;
        if aggregator.mode() != config.mode {
            return Err(CompareError::InvalidConfig(format!(
                "aggregator mode {} does not match configured mode {}",
                aggregator.mode(),
                config.mode
            )));
        }
        Ok(Self {
            assembler: TimeSeriesAssembler::new(&config.denylist),
            alignment: AlignmentStage::from_window_days(config.window_days)?,
            aggregator,
            config,
        })
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Runs every configured radius; reports come back in radius order.
    pub fn run(&self, files: &[ObservationBatch], archive: &GaugeArchive) -> CompareResult<Vec<RadiusReport>> {
        let radii = self.config.radii.values();
        if self.config.parallel {
            radii
                .par_iter()
                .map(|&radius| self.run_radius(radius, files, archive))
                .collect()
        } else {
            radii
                .iter()
                .map(|&radius| self.run_radius(radius, files, archive))
                .collect()
        }
    }

    pub fn run_radius(
        &self,
        radius_km: f64,
        files: &[ObservationBatch],
        archive: &GaugeArchive,
    ) -> CompareResult<RadiusReport> {
        let logger = LogManager::new(format!("radius {} km", radius_km));
        let metrics = MetricsRecorder::new();
        logger.record(&format!(
            "processing {} files against {} gauges ({} mode)",
            files.len(),
            archive.len(),
            self.config.mode
        ));

        let accumulator = self.aggregate_files(radius_km, files, archive, &logger, &metrics)?;
        let series = self.assembler.assemble(accumulator);

        let stations: Vec<StationOutcome> = self
            .assembler
            .gauges(archive)
            .map(|station| {
                let outcome = self.compare_station(station, series.get(&station.site.station_id));
                match &outcome {
                    StationOutcome::Compared { statistics, .. } => {
                        metrics.record_compared();
                        logger.detail(&format!(
                            "{}: rmsd {:.3} over {} days",
                            statistics.station_id, statistics.rmsd, statistics.days_used
                        ));
                    }
                    StationOutcome::Empty { station_id, reason } => {
                        metrics.record_empty();
                        let line = format!("{}: {}", station_id, reason);
                        match reason {
                            EmptyReason::NoSatelliteData => logger.detail(&line),
                            _ => logger.record(&line),
                        }
                    }
                    StationOutcome::Failed { station_id, reason } => {
                        metrics.record_failed();
                        logger.warn(&format!("{}: {}", station_id, reason));
                    }
                }
                outcome
            })
            .collect();

        let statistics: Vec<&StationStatistics> =
            stations.iter().filter_map(StationOutcome::statistics).collect();
        let summary = match RadiusSummary::from_statistics(
            radius_km,
            &statistics,
            self.config.rmsd_threshold,
            self.config.rmsd_divisor,
        ) {
            Ok(summary) => summary,
            Err(err) => {
                logger.warn(&err.to_string());
                RadiusSummary::without_valid_stations(radius_km, &statistics)
            }
        };
        if let Some(rmsd) = summary.combined_rmsd {
            logger.record(&format!(
                "combined rmsd {:.3} from {}/{} stations",
                rmsd, summary.stations_retained, summary.stations_used
            ));
        }

        Ok(RadiusReport {
            summary,
            stations,
            metrics: metrics.snapshot(),
        })
    }

    fn aggregate_files(
        &self,
        radius_km: f64,
        files: &[ObservationBatch],
        archive: &GaugeArchive,
        logger: &LogManager,
        metrics: &MetricsRecorder,
    ) -> CompareResult<SampleAccumulator> {
        let mut accumulator = SampleAccumulator::new();
        for batch in files {
            let (mut samples, mut no_data) = (0, 0);
            for station in self.assembler.gauges(archive) {
                let aggregate = self.aggregator.aggregate(&station.site, batch, radius_km)?;
                if aggregate.is_no_data() {
                    no_data += 1;
                } else {
                    samples += 1;
                }
                accumulator.push(aggregate);
            }
            accumulator.finish_file();
            metrics.record_file(samples, no_data);
            logger.detail(&format!("{}: {} samples, {} without data", batch.source(), samples, no_data));
        }
        Ok(accumulator)
    }

    /// Aligns and scores one station; failures stay local to the station.
    pub fn compare_station(&self, station: &GaugeStation, series: Option<&StationSeries>) -> StationOutcome {
        let station_id = station.site.station_id.clone();
        let Some(series) = series.filter(|s| !s.is_empty()) else {
            return StationOutcome::Empty {
                station_id,
                reason: EmptyReason::NoSatelliteData,
            };
        };

        let pair = match self.alignment.align_station(series, &station.series) {
            Ok(Alignment::Aligned(pair)) => pair,
            Ok(Alignment::Empty(reason)) => return StationOutcome::Empty { station_id, reason },
            Err(err) => {
                return StationOutcome::Failed {
                    station_id,
                    reason: err.to_string(),
                }
            }
        };

        match StationStatistics::compute(
            &station.site,
            &pair,
            series.mean_quality_score(),
            self.config.compare_filtered,
        ) {
            Ok(statistics) => StationOutcome::Compared { statistics, pair },
            Err(err) => StationOutcome::Failed {
                station_id,
                reason: err.to_string(),
            },
        }
    }
}
