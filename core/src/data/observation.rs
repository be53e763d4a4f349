use crate::prelude::{CompareError, CompareResult};
use chrono::{DateTime, Utc};
use ndarray::{Array1, ArrayView1};

/// Flattened observations of one satellite granule.
///
/// Values are in the granule's native unit (metres); `NaN` marks no-data.
/// Every array has the same length, enforced by the constructors.
#[derive(Debug, Clone)]
pub struct ObservationBatch {
    source: String,
    longitude: Array1<f64>,
    latitude: Array1<f64>,
    time: Vec<Option<DateTime<Utc>>>,
    value: Array1<f64>,
}

impl ObservationBatch {
    pub fn new(
        source: impl Into<String>,
        longitude: Vec<f64>,
        latitude: Vec<f64>,
        time: Vec<Option<DateTime<Utc>>>,
        value: Vec<f64>,
    ) -> CompareResult<Self> {
        let source = source.into();
        let n = longitude.len();
        if latitude.len() != n || time.len() != n || value.len() != n {
            return Err(CompareError::InvalidInput(format!(
                "{}: array lengths disagree (lon {}, lat {}, time {}, value {})",
                source,
                n,
                latitude.len(),
                time.len(),
                value.len()
            )));
        }
        Ok(Self {
            source,
            longitude: Array1::from(longitude),
            latitude: Array1::from(latitude),
            time,
            value: Array1::from(value),
        })
    }

    /// Builds a batch whose timestamps are given per scan line and broadcast
    /// across the cross-track samples of that scan.
    pub fn from_scans(
        source: impl Into<String>,
        longitude: Vec<f64>,
        latitude: Vec<f64>,
        scan_times: &[Option<DateTime<Utc>>],
        value: Vec<f64>,
    ) -> CompareResult<Self> {
        let source = source.into();
        let samples = longitude.len();
        if scan_times.is_empty() {
            if samples == 0 {
                return Self::new(source, longitude, latitude, Vec::new(), value);
            }
            return Err(CompareError::InvalidInput(format!(
                "{}: {} samples but no scan times",
                source, samples
            )));
        }
        if samples % scan_times.len() != 0 {
            return Err(CompareError::InvalidInput(format!(
                "{}: {} samples cannot be split across {} scans",
                source,
                samples,
                scan_times.len()
            )));
        }
        let cross_track = samples / scan_times.len();
        let time = scan_times
            .iter()
            .flat_map(|t| std::iter::repeat(*t).take(cross_track))
            .collect();
        Self::new(source, longitude, latitude, time, value)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn longitude(&self) -> ArrayView1<'_, f64> {
        self.longitude.view()
    }

    pub fn latitude(&self) -> ArrayView1<'_, f64> {
        self.latitude.view()
    }

    pub fn time(&self) -> &[Option<DateTime<Utc>>] {
        &self.time
    }

    pub fn value(&self) -> ArrayView1<'_, f64> {
        self.value.view()
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Drops samples with an undefined value or position.
    pub fn without_missing(self) -> Self {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| {
                self.value[i].is_finite()
                    && self.longitude[i].is_finite()
                    && self.latitude[i].is_finite()
            })
            .collect();
        if keep.len() == self.len() {
            return self;
        }
        Self {
            longitude: keep.iter().map(|&i| self.longitude[i]).collect(),
            latitude: keep.iter().map(|&i| self.latitude[i]).collect(),
            time: keep.iter().map(|&i| self.time[i]).collect(),
            value: keep.iter().map(|&i| self.value[i]).collect(),
            source: self.source,
        }
    }
}
