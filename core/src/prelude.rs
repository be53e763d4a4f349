use crate::data::{GaugeSite, ObservationBatch};
use crate::processing::aggregate::Aggregate;
use serde::{Deserialize, Serialize};

/// Stations with documented instrumentation faults in the reference gauge record.
pub const DEFAULT_DENYLIST: [&str; 5] = [
    "GL_TS_TG_TamarisTG",
    "GL_TS_TG_BaieDuLazaretTG",
    "GL_TS_TG_PortDeCarroTG",
    "GL_TS_TG_CassisTG",
    "MO_TS_TG_PORTO-CRISTO",
];

/// How the observations inside a radius are reduced to one value per pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Mean of every in-radius observation.
    #[default]
    Average,
    /// Closest in-radius observation.
    Nearest,
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::Average => write!(f, "average"),
            SelectionMode::Nearest => write!(f, "nearest"),
        }
    }
}

/// Divisor used when combining per-station RMSDs into one radius value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RmsdDivisor {
    /// Number of stations left after the outlier threshold.
    #[default]
    Retained,
    /// Number of compared stations before the outlier threshold.
    AllStations,
}

/// Radii to evaluate, in kilometres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RadiusSet {
    List(Vec<f64>),
    /// Half-open range `[start, stop)` walked in `step` increments.
    Range { start: f64, stop: f64, step: f64 },
}

impl RadiusSet {
    /// Upper bound on the number of radii a configuration may describe.
    pub const MAX_RADII: usize = 10_000;

    /// Number of radii described, saturating for unbounded ranges.
    pub fn count(&self) -> usize {
        match self {
            RadiusSet::List(values) => values.len(),
            RadiusSet::Range { start, stop, step } => Self::range_len(*start, *stop, *step),
        }
    }

    fn range_len(start: f64, stop: f64, step: f64) -> usize {
        if step.is_nan() || step <= 0.0 || !(stop > start) {
            return 0;
        }
        // Float-to-integer casts saturate.
        ((stop - start) / step - 1e-9).ceil().max(0.0) as usize
    }

    /// Radius values, at most [`RadiusSet::MAX_RADII`] of them for ranges.
    pub fn values(&self) -> Vec<f64> {
        match self {
            RadiusSet::List(values) => values.clone(),
            RadiusSet::Range { start, stop, step } => {
                let count = Self::range_len(*start, *stop, *step).min(Self::MAX_RADII);
                (0..count).map(|i| start + i as f64 * step).collect()
            }
        }
    }
}

impl Default for RadiusSet {
    fn default() -> Self {
        RadiusSet::Range {
            start: 10.0,
            stop: 65.0,
            step: 5.0,
        }
    }
}

/// Shared configuration for a comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub mode: SelectionMode,
    pub radii: RadiusSet,
    /// LOESS window length; the smoother bandwidth is `1 / window_days`.
    pub window_days: f64,
    /// Station RMSDs at or above this value are left out of the combination.
    pub rmsd_threshold: f64,
    pub rmsd_divisor: RmsdDivisor,
    /// Multiplier applied to satellite values (metres to centimetres).
    pub value_scale: f64,
    /// Compute statistics on the smoothed series rather than the raw demeaned ones.
    pub compare_filtered: bool,
    pub denylist: Vec<String>,
    pub parallel: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Average,
            radii: RadiusSet::default(),
            window_days: 7.0,
            rmsd_threshold: 5.0,
            rmsd_divisor: RmsdDivisor::Retained,
            value_scale: 100.0,
            compare_filtered: true,
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            parallel: false,
        }
    }
}

impl CompareConfig {
    pub fn validate(&self) -> CompareResult<()> {
        let count = self.radii.count();
        if count > RadiusSet::MAX_RADII {
            return Err(CompareError::InvalidConfig(format!(
                "{} radii requested, at most {} allowed",
                count,
                RadiusSet::MAX_RADII
            )));
        }
        let radii = self.radii.values();
        if radii.is_empty() {
            return Err(CompareError::InvalidConfig("no radii configured".into()));
        }
        if let Some(bad) = radii.iter().find(|r| !r.is_finite() || **r <= 0.0) {
            return Err(CompareError::InvalidConfig(format!(
                "radius must be positive, got {}",
                bad
            )));
        }
        if !self.window_days.is_finite() || self.window_days < 1.0 {
            return Err(CompareError::InvalidConfig(format!(
                "smoothing window must be at least one day, got {}",
                self.window_days
            )));
        }
        if !self.rmsd_threshold.is_finite() || self.rmsd_threshold <= 0.0 {
            return Err(CompareError::InvalidConfig(format!(
                "rmsd threshold must be positive, got {}",
                self.rmsd_threshold
            )));
        }
        if !self.value_scale.is_finite() || self.value_scale == 0.0 {
            return Err(CompareError::InvalidConfig(
                "value scale must be finite and non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Bandwidth fraction handed to the smoother.
    pub fn smoothing_fraction(&self) -> f64 {
        1.0 / self.window_days
    }
}

/// Common error type for the comparison pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown station: {0}")]
    UnknownStation(String),
    #[error("alignment failure: {0}")]
    Alignment(String),
    #[error("no valid stations for radius {radius_km} km")]
    NoValidStations { radius_km: f64 },
}

pub type CompareResult<T> = Result<T, CompareError>;

/// Reduces the observations of one pass around one gauge to a single sample.
///
/// Implementations are pure and selected once from [`SelectionMode`]. An
/// empty radius is `Ok(Aggregate::NoData)`; errors are reserved for batches
/// that cannot be evaluated.
pub trait SpatialAggregator: Send + Sync {
    fn mode(&self) -> SelectionMode;
    fn aggregate(
        &self,
        site: &GaugeSite,
        batch: &ObservationBatch,
        radius_km: f64,
    ) -> CompareResult<Aggregate>;
}
