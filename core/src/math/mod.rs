pub mod geodesy;
pub mod loess;
pub mod stats;

pub use geodesy::{distances_km, haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use loess::LoessSmoother;
pub use stats::StatsHelper;
