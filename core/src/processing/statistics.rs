use crate::data::GaugeSite;
use crate::math::StatsHelper;
use crate::prelude::{CompareError, CompareResult, RmsdDivisor};
use crate::processing::align::AlignedPair;
use serde::Serialize;

/// Agreement metrics of one station for one radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStatistics {
    pub station_id: String,
    pub correlation: Option<f64>,
    pub rmsd: f64,
    pub var_gauge: Option<f64>,
    pub var_satellite: Option<f64>,
    pub var_difference: Option<f64>,
    /// Mean contributing count (AVERAGE) or mean nearest distance (NEAREST).
    pub mean_quality_score: Option<f64>,
    pub days_used: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub min_distance_km: Option<f64>,
}

impl StationStatistics {
    pub fn compute(
        site: &GaugeSite,
        pair: &AlignedPair,
        mean_quality_score: Option<f64>,
        use_filtered: bool,
    ) -> CompareResult<Self> {
        let (satellite, gauge) = if use_filtered {
            (&pair.satellite_filtered, &pair.gauge_filtered)
        } else {
            (&pair.satellite, &pair.gauge)
        };
        let rmsd = StatsHelper::rmsd(satellite, gauge).ok_or_else(|| {
            CompareError::Alignment(format!(
                "{}: cannot compare {} satellite days with {} gauge days",
                site.station_id,
                satellite.len(),
                gauge.len()
            ))
        })?;
        let difference: Vec<f64> = satellite.iter().zip(gauge.iter()).map(|(s, g)| s - g).collect();

        Ok(Self {
            station_id: site.station_id.clone(),
            correlation: StatsHelper::pearson(satellite, gauge),
            rmsd,
            var_gauge: StatsHelper::variance(gauge),
            var_satellite: StatsHelper::variance(satellite),
            var_difference: StatsHelper::variance(&difference),
            mean_quality_score,
            days_used: pair.len(),
            latitude: site.latitude,
            longitude: site.longitude,
            min_distance_km: pair.min_distance_km,
        })
    }
}

/// Root-mean-square combination of per-station RMSDs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RmsdCombination {
    pub combined_rmsd: f64,
    pub retained: usize,
    pub total: usize,
}

/// Drops RMSDs at or above `threshold` and combines the rest as
/// `sqrt(sum(rmsd^2) / divisor)`.
pub fn combine_rmsd(
    rmsds: &[f64],
    threshold: f64,
    divisor: RmsdDivisor,
    radius_km: f64,
) -> CompareResult<RmsdCombination> {
    let retained: Vec<f64> = rmsds.iter().copied().filter(|r| *r < threshold).collect();
    if retained.is_empty() {
        return Err(CompareError::NoValidStations { radius_km });
    }
    let sum_sq: f64 = retained.iter().map(|r| r * r).sum();
    let denominator = match divisor {
        RmsdDivisor::Retained => retained.len(),
        RmsdDivisor::AllStations => rmsds.len(),
    };
    Ok(RmsdCombination {
        combined_rmsd: (sum_sq / denominator as f64).sqrt(),
        retained: retained.len(),
        total: rmsds.len(),
    })
}

/// One row of the radius table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusSummary {
    pub radius_km: f64,
    /// `None` when no station survived the outlier threshold.
    pub combined_rmsd: Option<f64>,
    /// Stations with a successful comparison, before the outlier threshold.
    pub stations_used: usize,
    pub stations_retained: usize,
    pub average_days_used: Option<f64>,
}

impl RadiusSummary {
    pub fn from_statistics(
        radius_km: f64,
        statistics: &[&StationStatistics],
        threshold: f64,
        divisor: RmsdDivisor,
    ) -> CompareResult<Self> {
        let rmsds: Vec<f64> = statistics.iter().map(|s| s.rmsd).collect();
        let days: Vec<f64> = statistics.iter().map(|s| s.days_used as f64).collect();
        let combination = combine_rmsd(&rmsds, threshold, divisor, radius_km)?;
        Ok(Self {
            radius_km,
            combined_rmsd: Some(combination.combined_rmsd),
            stations_used: statistics.len(),
            stations_retained: combination.retained,
            average_days_used: StatsHelper::mean(&days),
        })
    }

    /// Row for a radius where nothing could be combined.
    pub fn without_valid_stations(radius_km: f64, statistics: &[&StationStatistics]) -> Self {
        let days: Vec<f64> = statistics.iter().map(|s| s.days_used as f64).collect();
        Self {
            radius_km,
            combined_rmsd: None,
            stations_used: statistics.len(),
            stations_retained: 0,
            average_days_used: StatsHelper::mean(&days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn combination_below_threshold_is_rms_of_rmsds() {
        let rmsds = [1.0, 2.0, 3.0];
        let expected = ((1.0 + 4.0 + 9.0) / 3.0_f64).sqrt();
        for divisor in [RmsdDivisor::Retained, RmsdDivisor::AllStations] {
            let combined = combine_rmsd(&rmsds, 5.0, divisor, 10.0).unwrap();
            assert_relative_eq!(combined.combined_rmsd, expected, epsilon = 1e-12);
            assert_eq!(combined.retained, 3);
        }
    }

    #[test]
    fn retained_divisor_ignores_outliers() {
        let combined = combine_rmsd(&[3.0, 4.0, 5.0, 12.0], 5.0, RmsdDivisor::Retained, 10.0).unwrap();
        assert_relative_eq!(combined.combined_rmsd, (25.0_f64 / 2.0).sqrt(), epsilon = 1e-12);
        assert_eq!(combined.retained, 2);
        assert_eq!(combined.total, 4);
    }

    #[test]
    fn all_stations_divisor_counts_outliers() {
        let combined = combine_rmsd(&[3.0, 4.0, 5.0, 12.0], 5.0, RmsdDivisor::AllStations, 10.0).unwrap();
        assert_relative_eq!(combined.combined_rmsd, (25.0_f64 / 4.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn all_outliers_signal_no_valid_stations() {
        let err = combine_rmsd(&[6.0, 9.0], 5.0, RmsdDivisor::Retained, 25.0).unwrap_err();
        assert_eq!(err, CompareError::NoValidStations { radius_km: 25.0 });
        assert!(combine_rmsd(&[], 5.0, RmsdDivisor::AllStations, 25.0).is_err());
    }

    #[test]
    fn station_statistics_follow_selected_series() {
        let site = GaugeSite::new("TG", 4.0, 42.0);
        let day = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
        let pair = AlignedPair {
            dates: (0..4).map(|d| day + chrono::Duration::days(d)).collect(),
            satellite: vec![-1.5, -0.5, 0.5, 1.5],
            gauge: vec![-1.5, -0.5, 0.5, 1.5],
            satellite_filtered: vec![-1.0, 0.0, 0.0, 1.0],
            gauge_filtered: vec![-1.0, -1.0, 1.0, 1.0],
            min_distance_km: Some(3.2),
        };

        let raw = StationStatistics::compute(&site, &pair, Some(12.0), false).unwrap();
        assert_eq!(raw.rmsd, 0.0);
        assert_relative_eq!(raw.correlation.unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(raw.days_used, 4);
        assert_eq!(raw.min_distance_km, Some(3.2));

        let filtered = StationStatistics::compute(&site, &pair, Some(12.0), true).unwrap();
        assert_relative_eq!(filtered.rmsd, 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(filtered.var_difference.unwrap(), 2.0 / 3.0, epsilon = 1e-12);
    }
}
