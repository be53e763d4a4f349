use crate::input::{InputDocument, RawGaugeArchive, RawObservationFile};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const KM_PER_DEGREE: f64 = 111.195;

/// Configuration for generating a synthetic comparison scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub gauges: usize,
    pub days: usize,
    /// Observations scattered around each gauge per pass.
    pub points_per_gauge: usize,
    pub spread_km: f64,
    pub amplitude_m: f64,
    pub period_days: f64,
    pub satellite_noise_m: f64,
    pub gauge_noise_m: f64,
    /// Probability that an observation is flagged as no-data.
    pub missing_ratio: f64,
    /// Days between two passes over the area.
    pub revisit_days: usize,
    /// First day, as days since 1970-01-01.
    pub start_day: i64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            gauges: 6,
            days: 90,
            points_per_gauge: 24,
            spread_km: 70.0,
            amplitude_m: 0.08,
            period_days: 24.0,
            satellite_noise_m: 0.03,
            gauge_noise_m: 0.01,
            missing_ratio: 0.1,
            revisit_days: 1,
            start_day: 19448,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn normalized_revisit(&self) -> usize {
        self.revisit_days.max(1)
    }

    fn signal(&self, day: i64) -> f64 {
        self.amplitude_m * (2.0 * PI * day as f64 / self.period_days.max(1.0)).sin()
    }

    fn site(&self, index: usize) -> (String, f64, f64) {
        (
            format!("SYN_TG_{:02}", index),
            6.0 - index as f64 * 0.8,
            43.0 - index as f64 * 0.3,
        )
    }
}

fn jitter(rng: &mut StdRng, amplitude: f64) -> f64 {
    if amplitude > 0.0 {
        rng.gen_range(-amplitude..amplitude)
    } else {
        0.0
    }
}

fn build_gauges(config: &GeneratorConfig, rng: &mut StdRng) -> RawGaugeArchive {
    let mut archive = RawGaugeArchive {
        station_names: Vec::with_capacity(config.gauges),
        longitude: Vec::with_capacity(config.gauges),
        latitude: Vec::with_capacity(config.gauges),
        day_offset: Vec::with_capacity(config.gauges),
        residual_m: Vec::with_capacity(config.gauges),
    };
    for index in 0..config.gauges {
        let (name, lon, lat) = config.site(index);
        let days: Vec<i64> = (0..config.days as i64).map(|d| config.start_day + d).collect();
        archive.station_names.push(name);
        archive.longitude.push(lon);
        archive.latitude.push(lat);
        archive
            .residual_m
            .push(days.iter().map(|&d| Some(config.signal(d) + jitter(rng, config.gauge_noise_m))).collect());
        archive.day_offset.push(days.iter().map(|&d| Some(d as f64)).collect());
    }
    archive
}

fn build_pass(config: &GeneratorConfig, day: i64, rng: &mut StdRng) -> anyhow::Result<RawObservationFile> {
    let seconds = day
        .checked_mul(86_400)
        .context("overflow computing pass time")?;
    let midnight = DateTime::<Utc>::from_timestamp(seconds, 0).context("pass day out of range")?;

    let samples = config.gauges * config.points_per_gauge;
    let mut file = RawObservationFile {
        name: format!("synthetic_pass_{}", day),
        longitude: Vec::with_capacity(samples),
        latitude: Vec::with_capacity(samples),
        scan_time: Vec::with_capacity(config.gauges),
        ssha: Vec::with_capacity(samples),
    };

    // One scan line per gauge cluster, a minute apart.
    for index in 0..config.gauges {
        let (_, lon, lat) = config.site(index);
        file.scan_time
            .push(Some(midnight + Duration::hours(10) + Duration::minutes(index as i64)));
        for _ in 0..config.points_per_gauge {
            let range_km = rng.gen_range(0.0..config.spread_km.max(f64::EPSILON));
            let bearing = rng.gen_range(0.0..2.0 * PI);
            let dlat = range_km * bearing.cos() / KM_PER_DEGREE;
            let dlon = range_km * bearing.sin() / (KM_PER_DEGREE * lat.to_radians().cos());
            let missing = rng.gen_bool(config.missing_ratio.clamp(0.0, 1.0));
            let value = config.signal(day) + jitter(rng, config.satellite_noise_m);

            file.longitude.push(Some(lon + dlon));
            file.latitude.push(Some(lat + dlat));
            file.ssha.push((!missing).then_some(value));
        }
    }
    Ok(file)
}

/// Builds a deterministic scenario with gauges spread east to west and one
/// pass every `revisit_days`.
pub fn build_scenario(config: &GeneratorConfig) -> anyhow::Result<InputDocument> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let gauges = build_gauges(config, &mut rng);
    let observation_files = (0..config.days as i64)
        .step_by(config.normalized_revisit())
        .map(|d| build_pass(config, config.start_day + d, &mut rng))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(InputDocument {
        observation_files,
        gauges,
    })
}
