use crate::data::{GaugeSite, ObservationBatch};
use crate::math::{distances_km, GeoPoint};
use crate::prelude::{CompareConfig, CompareResult, SelectionMode, SpatialAggregator};
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::Serialize;

/// Where a representative value came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Averaged {
        count: usize,
        min_distance_km: f64,
        /// Contributing values in the reporting unit.
        raw_values: Vec<f64>,
        contributors: Vec<GeoPoint>,
    },
    Nearest {
        distance_km: f64,
        location: GeoPoint,
    },
}

impl Provenance {
    /// Contributing count for averaged samples, distance for nearest ones.
    pub fn quality_score(&self) -> f64 {
        match self {
            Provenance::Averaged { count, .. } => *count as f64,
            Provenance::Nearest { distance_km, .. } => *distance_km,
        }
    }

    pub fn min_distance_km(&self) -> f64 {
        match self {
            Provenance::Averaged { min_distance_km, .. } => *min_distance_km,
            Provenance::Nearest { distance_km, .. } => *distance_km,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Provenance::Averaged { count, .. } => *count,
            Provenance::Nearest { .. } => 1,
        }
    }
}

/// One pass reduced to a single value for one gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub station_id: String,
    /// Representative value in the reporting unit.
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub provenance: Provenance,
}

/// Result of aggregating one (file, gauge, radius) triple.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    Sample(SampleRecord),
    /// Nothing usable inside the radius.
    NoData,
}

impl Aggregate {
    pub fn sample(&self) -> Option<&SampleRecord> {
        match self {
            Aggregate::Sample(record) => Some(record),
            Aggregate::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Aggregate::NoData)
    }
}

/// Indices of the observations lying within `radius_km`.
pub fn select_within(distances: &Array1<f64>, radius_km: f64) -> Vec<usize> {
    distances
        .iter()
        .enumerate()
        .filter(|(_, d)| **d <= radius_km)
        .map(|(i, _)| i)
        .collect()
}

fn site_distances(site: &GaugeSite, batch: &ObservationBatch) -> CompareResult<Array1<f64>> {
    distances_km(site.location(), batch.longitude(), batch.latitude())
}

/// Mean of every in-radius observation.
#[derive(Debug, Clone)]
pub struct AverageAggregator {
    value_scale: f64,
    retain_contributors: bool,
}

impl AverageAggregator {
    pub fn new(value_scale: f64) -> Self {
        Self {
            value_scale,
            retain_contributors: true,
        }
    }

    /// Skips keeping raw values and coordinates of the contributors.
    pub fn without_contributors(mut self) -> Self {
        self.retain_contributors = false;
        self
    }
}

impl SpatialAggregator for AverageAggregator {
    fn mode(&self) -> SelectionMode {
        SelectionMode::Average
    }

    fn aggregate(&self, site: &GaugeSite, batch: &ObservationBatch, radius_km: f64) -> CompareResult<Aggregate> {
        let distances = site_distances(site, batch)?;
        let (lons, lats, times, values) = (batch.longitude(), batch.latitude(), batch.time(), batch.value());
        let selected: Vec<usize> = select_within(&distances, radius_km)
            .into_iter()
            .filter(|&i| values[i].is_finite())
            .collect();
        if selected.is_empty() {
            return Ok(Aggregate::NoData);
        }

        // Earliest valid timestamp; `min_by_key` keeps the first of equal keys.
        let Some(timestamp) = selected.iter().filter_map(|&i| times[i]).min_by_key(|t| *t) else {
            return Ok(Aggregate::NoData);
        };

        let mean = selected.iter().map(|&i| values[i]).sum::<f64>() / selected.len() as f64;
        let min_distance_km = selected
            .iter()
            .map(|&i| distances[i])
            .fold(f64::INFINITY, f64::min);

        let (raw_values, contributors) = if self.retain_contributors {
            (
                selected.iter().map(|&i| values[i] * self.value_scale).collect(),
                selected.iter().map(|&i| GeoPoint::new(lons[i], lats[i])).collect(),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(Aggregate::Sample(SampleRecord {
            station_id: site.station_id.clone(),
            value: mean * self.value_scale,
            timestamp,
            provenance: Provenance::Averaged {
                count: selected.len(),
                min_distance_km,
                raw_values,
                contributors,
            },
        }))
    }
}

/// Closest in-radius observation that carries a timestamp.
#[derive(Debug, Clone)]
pub struct NearestAggregator {
    value_scale: f64,
}

impl NearestAggregator {
    pub fn new(value_scale: f64) -> Self {
        Self { value_scale }
    }
}

impl SpatialAggregator for NearestAggregator {
    fn mode(&self) -> SelectionMode {
        SelectionMode::Nearest
    }

    fn aggregate(&self, site: &GaugeSite, batch: &ObservationBatch, radius_km: f64) -> CompareResult<Aggregate> {
        let distances = site_distances(site, batch)?;
        let (times, values) = (batch.time(), batch.value());
        let closest = select_within(&distances, radius_km)
            .into_iter()
            .filter(|&i| values[i].is_finite())
            .filter_map(|i| times[i].map(|t| (i, t)))
            .min_by(|(a, _), (b, _)| distances[*a].total_cmp(&distances[*b]));

        Ok(match closest {
            Some((i, timestamp)) => Aggregate::Sample(SampleRecord {
                station_id: site.station_id.clone(),
                value: values[i] * self.value_scale,
                timestamp,
                provenance: Provenance::Nearest {
                    distance_km: distances[i],
                    location: GeoPoint::new(batch.longitude()[i], batch.latitude()[i]),
                },
            }),
            None => Aggregate::NoData,
        })
    }
}

/// Builds the aggregator selected by the configuration.
pub fn build_aggregator(config: &CompareConfig) -> Box<dyn SpatialAggregator> {
    match config.mode {
        SelectionMode::Average => Box::new(AverageAggregator::new(config.value_scale)),
        SelectionMode::Nearest => Box::new(NearestAggregator::new(config.value_scale)),
    }
}
