pub mod gauge;
pub mod observation;
pub mod series;

pub use gauge::{GaugeArchive, GaugeSite, GaugeStation};
pub use observation::ObservationBatch;
pub use series::DailySeries;
