use crate::data::series::DailySeries;
use crate::math::GeoPoint;
use crate::prelude::{CompareError, CompareResult};
use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

/// Gauge residuals are stored in metres; comparisons run in centimetres.
pub const GAUGE_VALUE_SCALE: f64 = 100.0;

/// Identity and fixed position of a tide gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSite {
    pub station_id: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl GaugeSite {
    pub fn new(station_id: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            station_id: station_id.into(),
            longitude,
            latitude,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// A gauge with its daily sea-level-anomaly record (centimetres).
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeStation {
    pub site: GaugeSite,
    pub series: DailySeries,
}

/// Converts a day offset from 1970-01-01 into a calendar date.
pub fn date_from_day_offset(days: f64) -> Option<NaiveDate> {
    if !days.is_finite() {
        return None;
    }
    let seconds = (days.floor() as i64).checked_mul(86_400)?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

/// Every gauge loaded for a run, ordered east to west.
#[derive(Debug, Clone, Default)]
pub struct GaugeArchive {
    stations: Vec<GaugeStation>,
}

impl GaugeArchive {
    pub fn new(mut stations: Vec<GaugeStation>) -> CompareResult<Self> {
        let mut seen = HashSet::new();
        for station in &stations {
            if !seen.insert(station.site.station_id.as_str()) {
                return Err(CompareError::InvalidInput(format!(
                    "duplicate station id {}",
                    station.site.station_id
                )));
            }
        }
        stations.sort_by(|a, b| b.site.longitude.total_cmp(&a.site.longitude));
        Ok(Self { stations })
    }

    /// Builds the archive from per-station arrays in archive index order.
    ///
    /// `day_offsets[i]` and `residuals_m[i]` belong to `names[i]`; entries with
    /// an undefined day or value are dropped and residuals are scaled to cm.
    pub fn from_arrays(
        names: &[String],
        longitude: &[f64],
        latitude: &[f64],
        day_offsets: &[Vec<f64>],
        residuals_m: &[Vec<f64>],
    ) -> CompareResult<Self> {
        let n = names.len();
        if longitude.len() != n || latitude.len() != n || day_offsets.len() != n || residuals_m.len() != n {
            return Err(CompareError::InvalidInput(format!(
                "gauge arrays disagree: {} names, {} lon, {} lat, {} time rows, {} value rows",
                n,
                longitude.len(),
                latitude.len(),
                day_offsets.len(),
                residuals_m.len()
            )));
        }

        let mut stations = Vec::with_capacity(n);
        for i in 0..n {
            if day_offsets[i].len() != residuals_m[i].len() {
                return Err(CompareError::InvalidInput(format!(
                    "station {}: {} days but {} values",
                    names[i],
                    day_offsets[i].len(),
                    residuals_m[i].len()
                )));
            }
            let points = day_offsets[i]
                .iter()
                .zip(&residuals_m[i])
                .filter(|(_, value)| value.is_finite())
                .filter_map(|(&day, &value)| {
                    date_from_day_offset(day).map(|date| (date, value * GAUGE_VALUE_SCALE))
                });
            stations.push(GaugeStation {
                site: GaugeSite::new(names[i].clone(), longitude[i], latitude[i]),
                series: DailySeries::collapse(points),
            });
        }
        Self::new(stations)
    }

    pub fn stations(&self) -> &[GaugeStation] {
        &self.stations
    }

    pub fn get(&self, station_id: &str) -> Option<&GaugeStation> {
        self.stations.iter().find(|s| s.site.station_id == station_id)
    }

    pub fn sites(&self) -> impl Iterator<Item = &GaugeSite> {
        self.stations.iter().map(|s| &s.site)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
