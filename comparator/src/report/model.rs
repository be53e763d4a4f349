use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tgcore::processing::StationStatistics;
use tgcore::telemetry::MetricsSnapshot;
use tgcore::{CompareConfig, RadiusReport, RadiusSummary, StationOutcome};

/// Series needed to draw one station's comparison plot.
#[derive(Debug, Clone, Serialize)]
pub struct PlotSeries {
    pub title: String,
    pub station_id: String,
    pub dates: Vec<NaiveDate>,
    pub satellite: Vec<f64>,
    pub satellite_unfiltered: Vec<f64>,
    pub gauge: Vec<f64>,
    pub gauge_unfiltered: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationNote {
    pub station_id: String,
    pub reason: String,
}

/// Detailed output for one radius.
#[derive(Debug, Clone, Serialize)]
pub struct RadiusDetail {
    pub radius_km: f64,
    pub metrics: MetricsSnapshot,
    pub stations: Vec<StationStatistics>,
    pub empty: Vec<StationNote>,
    pub failed: Vec<StationNote>,
    pub plots: Vec<PlotSeries>,
}

impl RadiusDetail {
    pub fn from_report(report: &RadiusReport, window_days: f64) -> Self {
        let mut detail = RadiusDetail {
            radius_km: report.summary.radius_km,
            metrics: report.metrics,
            stations: Vec::new(),
            empty: Vec::new(),
            failed: Vec::new(),
            plots: Vec::new(),
        };
        for outcome in &report.stations {
            match outcome {
                StationOutcome::Compared { statistics, pair } => {
                    detail.stations.push(statistics.clone());
                    detail.plots.push(PlotSeries {
                        title: format!(
                            "{}, {}km_radius, {}dLoess",
                            statistics.station_id, report.summary.radius_km, window_days
                        ),
                        station_id: statistics.station_id.clone(),
                        dates: pair.dates.clone(),
                        satellite: pair.satellite_filtered.clone(),
                        satellite_unfiltered: pair.satellite.clone(),
                        gauge: pair.gauge_filtered.clone(),
                        gauge_unfiltered: pair.gauge.clone(),
                    });
                }
                StationOutcome::Empty { station_id, reason } => detail.empty.push(StationNote {
                    station_id: station_id.clone(),
                    reason: reason.to_string(),
                }),
                StationOutcome::Failed { station_id, reason } => detail.failed.push(StationNote {
                    station_id: station_id.clone(),
                    reason: reason.clone(),
                }),
            }
        }
        detail
    }
}

/// Everything written at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub config: CompareConfig,
    /// `abort` or `skip`, how malformed observation files were handled.
    pub malformed_file_policy: String,
    pub skipped_files: Vec<String>,
    pub radii: Vec<RadiusSummary>,
    pub details: Vec<RadiusDetail>,
}

impl ComparisonReport {
    pub fn new(
        config: &CompareConfig,
        reports: &[RadiusReport],
        skip_malformed: bool,
        skipped_files: Vec<String>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            config: config.clone(),
            malformed_file_policy: if skip_malformed { "skip" } else { "abort" }.to_string(),
            skipped_files,
            radii: reports.iter().map(|r| r.summary.clone()).collect(),
            details: reports
                .iter()
                .map(|r| RadiusDetail::from_report(r, config.window_days))
                .collect(),
        }
    }
}
