//! Core comparison pipeline between altimetry passes and tide-gauge records.
//!
//! The modules follow the processing chain: spatial aggregation of each pass
//! around every gauge, per-station time-series assembly, overlap alignment with
//! demeaning and LOESS smoothing, and per-radius statistics.

pub mod data;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{
    CompareConfig, CompareError, CompareResult, RadiusSet, RmsdDivisor, SelectionMode,
    SpatialAggregator,
};
pub use processing::{ComparisonPipeline, RadiusReport, RadiusSummary, StationOutcome};
