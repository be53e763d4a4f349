use crate::report::model::ComparisonReport;
use anyhow::Context;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tgcore::RadiusSummary;

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "-".to_string())
}

/// Plain-text radius table: radius, combined RMSD, stations used, average days.
pub fn render_table(rows: &[RadiusSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>10} {:>10} {:>8} {:>9} {:>10}",
        "radius_km", "rmsd", "n_tg", "retained", "avg_days"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>10} {:>10} {:>8} {:>9} {:>10}",
            row.radius_km,
            cell(row.combined_rmsd),
            row.stations_used,
            row.stations_retained,
            cell(row.average_days_used)
        );
    }
    out
}

pub fn write_report<P: AsRef<Path>>(path: P, report: &ComparisonReport) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serializing comparison report")?;
    fs::write(path_ref, json).with_context(|| format!("writing report {}", path_ref.display()))
}
