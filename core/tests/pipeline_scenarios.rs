use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use tgcore::data::{GaugeArchive, ObservationBatch};
use tgcore::processing::{EmptyReason, StationOutcome, StationStatistics};
use tgcore::{CompareConfig, ComparisonPipeline, RadiusSet, RmsdDivisor, SelectionMode};

/// 2023-04-01 as days since 1970-01-01.
const FIRST_DAY: f64 = 19448.0;

struct Gauge {
    id: &'static str,
    lon: f64,
    lat: f64,
    days: Vec<f64>,
    residuals_m: Vec<f64>,
}

fn signal(day: i64) -> f64 {
    0.05 * (day as f64 * 0.3).sin()
}

fn pass_time(day: i64) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2023, 4, 1, 10, 30, 0)
        .single()
        .map(|t| t + Duration::days(day))
}

fn archive(gauges: &[Gauge]) -> GaugeArchive {
    let names: Vec<String> = gauges.iter().map(|g| g.id.to_string()).collect();
    let lons: Vec<f64> = gauges.iter().map(|g| g.lon).collect();
    let lats: Vec<f64> = gauges.iter().map(|g| g.lat).collect();
    let days: Vec<Vec<f64>> = gauges.iter().map(|g| g.days.clone()).collect();
    let values: Vec<Vec<f64>> = gauges.iter().map(|g| g.residuals_m.clone()).collect();
    GaugeArchive::from_arrays(&names, &lons, &lats, &days, &values).unwrap()
}

/// One file per day, each holding one observation per (lon, lat, value fn) target.
fn passes(days: std::ops::Range<i64>, targets: &[(f64, f64, fn(i64) -> f64)]) -> Vec<ObservationBatch> {
    days.map(|day| {
        ObservationBatch::new(
            format!("pass_{:03}", day),
            targets.iter().map(|t| t.0).collect(),
            targets.iter().map(|t| t.1).collect(),
            vec![pass_time(day); targets.len()],
            targets.iter().map(|t| (t.2)(day)).collect(),
        )
        .unwrap()
    })
    .collect()
}

fn gauge(id: &'static str, lon: f64, lat: f64, days: std::ops::Range<i64>, f: fn(i64) -> f64) -> Gauge {
    Gauge {
        id,
        lon,
        lat,
        days: days.clone().map(|d| FIRST_DAY + d as f64).collect(),
        residuals_m: days.map(f).collect(),
    }
}

fn config(radii: Vec<f64>) -> CompareConfig {
    CompareConfig {
        radii: RadiusSet::List(radii),
        ..Default::default()
    }
}

#[test]
fn identical_station_is_kept_and_non_overlapping_station_is_excluded() {
    let gauges = archive(&[
        gauge("MATCH", 5.0, 43.0, 0..30, signal),
        gauge("LATE", 3.0, 42.0, 100..130, signal),
    ]);
    let files = passes(0..30, &[(5.0, 43.0, signal), (3.0, 42.0, signal)]);

    let pipeline = ComparisonPipeline::new(config(vec![10.0])).unwrap();
    let reports = pipeline.run(&files, &gauges).unwrap();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];

    let stats: Vec<_> = report.statistics().collect();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].station_id, "MATCH");
    assert_abs_diff_eq!(stats[0].rmsd, 0.0, epsilon = 1e-9);
    assert_relative_eq!(stats[0].correlation.unwrap(), 1.0, epsilon = 1e-9);
    assert_eq!(stats[0].days_used, 30);
    assert_eq!(stats[0].min_distance_km, Some(0.0));

    assert_eq!(
        report.outcome("LATE"),
        Some(&StationOutcome::Empty {
            station_id: "LATE".into(),
            reason: EmptyReason::NoOverlap
        })
    );

    let summary = &report.summary;
    assert_eq!(summary.stations_used, 1);
    assert_eq!(summary.stations_retained, 1);
    assert_abs_diff_eq!(summary.combined_rmsd.unwrap(), 0.0, epsilon = 1e-9);
    assert_eq!(summary.average_days_used, Some(30.0));
}

#[test]
fn unfiltered_demeaned_series_have_zero_mean() {
    let gauges = archive(&[gauge("MATCH", 5.0, 43.0, 0..30, |d| 0.3 + signal(d))]);
    let files = passes(5..25, &[(5.0, 43.0, |d| 1.2 + signal(d))]);
    let pipeline = ComparisonPipeline::new(config(vec![10.0])).unwrap();
    let report = pipeline.run_radius(10.0, &files, &gauges).unwrap();
    let pair = report.outcome("MATCH").and_then(StationOutcome::pair).unwrap();
    assert_eq!(pair.len(), 20);
    let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
    assert_abs_diff_eq!(mean(&pair.satellite), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(mean(&pair.gauge), 0.0, epsilon = 1e-9);
}

#[test]
fn gauge_without_nearby_observations_never_produces_a_row() {
    let gauges = archive(&[
        gauge("MATCH", 5.0, 43.0, 0..30, signal),
        gauge("REMOTE", -9.0, 38.0, 0..30, signal),
    ]);
    let files = passes(0..30, &[(5.0, 43.0, signal)]);
    let pipeline = ComparisonPipeline::new(config(vec![10.0, 30.0, 60.0])).unwrap();

    for report in pipeline.run(&files, &gauges).unwrap() {
        assert!(report.statistics().all(|s| s.station_id != "REMOTE"));
        assert!(report.stations.iter().all(|o| o.pair().is_none() || o.station_id() != "REMOTE"));
        assert_eq!(report.summary.stations_used, 1);
        assert!(matches!(
            report.outcome("REMOTE"),
            Some(StationOutcome::Empty {
                reason: EmptyReason::NoSatelliteData,
                ..
            })
        ));
    }
}

#[test]
fn denylisted_station_never_appears() {
    let gauges = archive(&[
        gauge("MATCH", 5.0, 43.0, 0..30, signal),
        gauge("GL_TS_TG_CassisTG", 5.54, 43.21, 0..30, signal),
    ]);
    let files = passes(0..30, &[(5.0, 43.0, signal), (5.54, 43.21, signal)]);
    let pipeline = ComparisonPipeline::new(config(vec![10.0, 20.0])).unwrap();

    for report in pipeline.run(&files, &gauges).unwrap() {
        assert!(report.outcome("GL_TS_TG_CassisTG").is_none());
        assert!(report.statistics().all(|s| s.station_id != "GL_TS_TG_CassisTG"));
        assert_eq!(report.summary.stations_used, 1);
    }
}

fn offset_signal(day: i64) -> f64 {
    signal(day) + 0.2 * (day as f64 * 0.2).sin()
}

fn drifting_signal(day: i64) -> f64 {
    signal(day) + 0.02 * (day as f64 * 0.2).sin()
}

#[test]
fn outlier_station_is_left_out_of_combination() {
    let gauges = archive(&[
        gauge("DRIFT", 5.0, 43.0, 0..30, signal),
        gauge("NOISY", 3.0, 42.0, 0..30, signal),
    ]);
    let files = passes(0..30, &[(5.0, 43.0, drifting_signal), (3.0, 42.0, offset_signal)]);

    let retained = ComparisonPipeline::new(config(vec![10.0])).unwrap();
    let report = retained.run_radius(10.0, &files, &gauges).unwrap();
    let noisy = report.outcome("NOISY").and_then(StationOutcome::statistics).unwrap();
    let drift = report.outcome("DRIFT").and_then(StationOutcome::statistics).unwrap().rmsd;
    assert!(noisy.rmsd >= 5.0);
    assert!(drift > 0.1 && drift < 5.0);
    assert_eq!(report.summary.stations_used, 2);
    assert_eq!(report.summary.stations_retained, 1);
    assert_relative_eq!(report.summary.combined_rmsd.unwrap(), drift, epsilon = 1e-12);

    let all = ComparisonPipeline::new(CompareConfig {
        rmsd_divisor: RmsdDivisor::AllStations,
        ..config(vec![10.0])
    })
    .unwrap();
    let report = all.run_radius(10.0, &files, &gauges).unwrap();
    assert_eq!(report.summary.stations_retained, 1);
    assert_relative_eq!(
        report.summary.combined_rmsd.unwrap(),
        (drift * drift / 2.0).sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn all_outliers_leave_radius_without_combined_rmsd() {
    let gauges = archive(&[gauge("NOISY", 3.0, 42.0, 0..30, signal)]);
    let files = passes(0..30, &[(3.0, 42.0, offset_signal)]);
    let pipeline = ComparisonPipeline::new(config(vec![10.0])).unwrap();
    let report = pipeline.run_radius(10.0, &files, &gauges).unwrap();
    assert_eq!(report.summary.stations_used, 1);
    assert_eq!(report.summary.stations_retained, 0);
    assert_eq!(report.summary.combined_rmsd, None);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let gauges = archive(&[
        gauge("MATCH", 5.0, 43.0, 0..30, signal),
        gauge("NOISY", 3.0, 42.0, 0..30, signal),
    ]);
    let files = passes(0..30, &[(5.0, 43.0, signal), (5.05, 43.05, offset_signal), (3.0, 42.0, offset_signal)]);
    let sequential = ComparisonPipeline::new(config(vec![5.0, 10.0, 20.0])).unwrap();
    let parallel = ComparisonPipeline::new(CompareConfig {
        parallel: true,
        ..config(vec![5.0, 10.0, 20.0])
    })
    .unwrap();
    assert_eq!(sequential.run(&files, &gauges).unwrap(), parallel.run(&files, &gauges).unwrap());
}

#[test]
fn nearest_mode_matches_average_for_single_point_passes() {
    let gauges = archive(&[gauge("MATCH", 5.0, 43.0, 0..30, signal)]);
    let files = passes(0..30, &[(5.02, 43.01, signal)]);
    let average = ComparisonPipeline::new(config(vec![10.0])).unwrap();
    let nearest = ComparisonPipeline::new(CompareConfig {
        mode: SelectionMode::Nearest,
        ..config(vec![10.0])
    })
    .unwrap();

    let a = average.run_radius(10.0, &files, &gauges).unwrap();
    let n = nearest.run_radius(10.0, &files, &gauges).unwrap();
    let (sa, sn) = (a.statistics().next().unwrap(), n.statistics().next().unwrap());
    assert_relative_eq!(sa.rmsd, sn.rmsd, epsilon = 1e-12);
    assert_eq!(sa.mean_quality_score, Some(1.0));
    assert!(sn.mean_quality_score.unwrap() > 1.0);
}

fn statistics_by_id(report: &tgcore::RadiusReport) -> BTreeMap<String, StationStatistics> {
    report
        .statistics()
        .map(|s| (s.station_id.clone(), s.clone()))
        .collect()
}

#[test]
fn input_ordering_does_not_change_statistics() {
    // Same longitude, so the archive keeps input order for the tie.
    let a_first = archive(&[
        gauge("A", 5.0, 43.0, 0..30, signal),
        gauge("B", 5.0, 42.0, 0..30, signal),
    ]);
    let b_first = archive(&[
        gauge("B", 5.0, 42.0, 0..30, signal),
        gauge("A", 5.0, 43.0, 0..30, signal),
    ]);
    let order = |archive: &GaugeArchive| -> Vec<String> { archive.sites().map(|s| s.station_id.clone()).collect() };
    assert_ne!(order(&a_first), order(&b_first));

    let forward = passes(0..30, &[(5.0, 43.0, signal), (5.0, 42.0, offset_signal)]);
    let mut backward = passes(0..30, &[(5.0, 42.0, offset_signal), (5.0, 43.0, signal)]);
    backward.reverse();

    let pipeline = ComparisonPipeline::new(config(vec![10.0])).unwrap();
    let first = pipeline.run_radius(10.0, &forward, &a_first).unwrap();
    let second = pipeline.run_radius(10.0, &backward, &b_first).unwrap();
    assert_eq!(statistics_by_id(&first).len(), 2);
    assert_eq!(statistics_by_id(&first), statistics_by_id(&second));
    assert_eq!(first.summary, second.summary);
}
