use crate::data::{DailySeries, GaugeArchive, GaugeStation};
use crate::processing::aggregate::{Aggregate, SampleRecord};
use crate::math::StatsHelper;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Per-radius collection of aggregated samples, grouped by station.
///
/// Owned by one radius run and consumed by [`TimeSeriesAssembler::assemble`].
#[derive(Debug, Default)]
pub struct SampleAccumulator {
    buckets: BTreeMap<String, Vec<SampleRecord>>,
    files: usize,
    no_data: usize,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, aggregate: Aggregate) {
        match aggregate {
            Aggregate::Sample(record) => self
                .buckets
                .entry(record.station_id.clone())
                .or_default()
                .push(record),
            Aggregate::NoData => self.no_data += 1,
        }
    }

    pub fn finish_file(&mut self) {
        self.files += 1;
    }

    pub fn files(&self) -> usize {
        self.files
    }

    pub fn no_data_count(&self) -> usize {
        self.no_data
    }

    pub fn sample_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Satellite-derived samples of one station, ordered by time.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSeries {
    pub station_id: String,
    pub samples: Vec<SampleRecord>,
}

impl StationSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// One value per calendar day, same-day samples averaged.
    pub fn daily_values(&self) -> DailySeries {
        DailySeries::collapse(
            self.samples
                .iter()
                .map(|s| (s.timestamp.date_naive(), s.value)),
        )
    }

    /// Smallest contributor distance among samples on the given days.
    pub fn min_distance_on(&self, dates: &[NaiveDate]) -> Option<f64> {
        let wanted: HashSet<&NaiveDate> = dates.iter().collect();
        self.samples
            .iter()
            .filter(|s| wanted.contains(&s.timestamp.date_naive()))
            .map(|s| s.provenance.min_distance_km())
            .reduce(f64::min)
    }

    /// Mean contributing count (AVERAGE) or mean nearest distance (NEAREST).
    pub fn mean_quality_score(&self) -> Option<f64> {
        let scores: Vec<f64> = self.samples.iter().map(|s| s.provenance.quality_score()).collect();
        StatsHelper::mean(&scores)
    }
}

/// Groups samples into station series and filters denylisted stations.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesAssembler {
    denylist: HashSet<String>,
}

impl TimeSeriesAssembler {
    pub fn new(denylist: &[String]) -> Self {
        Self {
            denylist: denylist.iter().cloned().collect(),
        }
    }

    pub fn is_denied(&self, station_id: &str) -> bool {
        self.denylist.contains(station_id)
    }

    pub fn assemble(&self, accumulator: SampleAccumulator) -> BTreeMap<String, StationSeries> {
        accumulator
            .buckets
            .into_iter()
            .filter(|(id, samples)| !samples.is_empty() && !self.is_denied(id))
            .map(|(station_id, mut samples)| {
                samples.sort_by_key(|s| s.timestamp);
                (station_id.clone(), StationSeries { station_id, samples })
            })
            .collect()
    }

    /// Gauge stations eligible for comparison, in archive (east to west) order.
    pub fn gauges<'a>(&'a self, archive: &'a GaugeArchive) -> impl Iterator<Item = &'a GaugeStation> + 'a {
        archive
            .stations()
            .iter()
            .filter(move |s| !self.is_denied(&s.site.station_id))
    }
}
