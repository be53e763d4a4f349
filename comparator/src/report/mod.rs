pub mod model;
pub mod writer;

pub use model::ComparisonReport;
pub use writer::{render_table, write_report};
