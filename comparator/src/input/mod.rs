pub mod interchange;

pub use interchange::{InputBundle, InputDocument, RawGaugeArchive, RawObservationFile};
