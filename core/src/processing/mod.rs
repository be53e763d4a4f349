pub mod aggregate;
pub mod align;
pub mod assemble;
pub mod pipeline;
pub mod statistics;

pub use aggregate::{build_aggregator, Aggregate, AverageAggregator, NearestAggregator, Provenance, SampleRecord};
pub use align::{AlignedPair, Alignment, AlignmentStage, EmptyReason};
pub use assemble::{SampleAccumulator, StationSeries, TimeSeriesAssembler};
pub use pipeline::{ComparisonPipeline, RadiusReport, StationOutcome};
pub use statistics::{combine_rmsd, RadiusSummary, RmsdCombination, StationStatistics};
