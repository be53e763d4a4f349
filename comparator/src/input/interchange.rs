use anyhow::Context;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tgcore::data::{GaugeArchive, ObservationBatch};
use tgcore::CompareResult;

/// Parsed arrays of one satellite granule; `null` marks no-data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservationFile {
    pub name: String,
    pub longitude: Vec<Option<f64>>,
    pub latitude: Vec<Option<f64>>,
    /// One timestamp per scan line, broadcast across the cross-track samples.
    pub scan_time: Vec<Option<DateTime<Utc>>>,
    pub ssha: Vec<Option<f64>>,
}

fn or_nan(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

impl RawObservationFile {
    pub fn into_batch(self) -> CompareResult<ObservationBatch> {
        let batch = ObservationBatch::from_scans(
            self.name,
            or_nan(self.longitude),
            or_nan(self.latitude),
            &self.scan_time,
            or_nan(self.ssha),
        )?;
        Ok(batch.without_missing())
    }
}

/// Gauge archive arrays; rows of `day_offset`/`residual_m` follow `station_names`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGaugeArchive {
    pub station_names: Vec<String>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    /// Days since 1970-01-01.
    pub day_offset: Vec<Vec<Option<f64>>>,
    /// Residual sea-level anomaly in metres.
    pub residual_m: Vec<Vec<Option<f64>>>,
}

impl RawGaugeArchive {
    pub fn into_archive(self) -> CompareResult<GaugeArchive> {
        let days: Vec<Vec<f64>> = self.day_offset.into_iter().map(or_nan).collect();
        let values: Vec<Vec<f64>> = self.residual_m.into_iter().map(or_nan).collect();
        GaugeArchive::from_arrays(
            &self.station_names,
            &self.longitude,
            &self.latitude,
            &days,
            &values,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDocument {
    pub observation_files: Vec<RawObservationFile>,
    pub gauges: RawGaugeArchive,
}

/// Inputs ready for the comparison pipeline.
pub struct InputBundle {
    pub files: Vec<ObservationBatch>,
    pub archive: GaugeArchive,
    pub skipped_files: Vec<String>,
}

impl InputDocument {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading input document {}", path_ref.display()))?;
        let document: InputDocument = serde_json::from_str(&contents)
            .with_context(|| format!("parsing input document {}", path_ref.display()))?;
        Ok(document)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string(self).context("serializing input document")?;
        fs::write(path_ref, json)
            .with_context(|| format!("writing input document {}", path_ref.display()))
    }

    /// Converts the raw arrays. A malformed observation file aborts the run
    /// unless `skip_malformed` is set, in which case it is logged and skipped.
    pub fn into_bundle(self, skip_malformed: bool) -> anyhow::Result<InputBundle> {
        let archive = self
            .gauges
            .into_archive()
            .context("converting gauge archive")?;

        let mut files = Vec::with_capacity(self.observation_files.len());
        let mut skipped_files = Vec::new();
        for raw in self.observation_files {
            let name = raw.name.clone();
            match raw.into_batch() {
                Ok(batch) => files.push(batch),
                Err(err) if skip_malformed => {
                    warn!("skipping observation file {}: {}", name, err);
                    skipped_files.push(name);
                }
                Err(err) => {
                    return Err(anyhow::Error::new(err)
                        .context(format!("converting observation file {}", name)))
                }
            }
        }

        Ok(InputBundle {
            files,
            archive,
            skipped_files,
        })
    }
}
