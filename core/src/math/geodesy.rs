use crate::prelude::{CompareError, CompareResult};
use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the spherical distance model.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lon, self.lat, other.lon, other.lat)
    }
}

/// Haversine surface distance on a sphere, in kilometres.
///
/// The inverse-sine argument is clamped to `[0, 1]` so rounding at antipodal
/// points never leaves the function's domain.
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().clamp(0.0, 1.0).asin()
}

/// Distances from one reference point to every candidate point.
pub fn distances_km(
    reference: GeoPoint,
    lons: ArrayView1<f64>,
    lats: ArrayView1<f64>,
) -> CompareResult<Array1<f64>> {
    if lons.len() != lats.len() {
        return Err(CompareError::InvalidInput(format!(
            "{} longitudes but {} latitudes",
            lons.len(),
            lats.len()
        )));
    }
    Ok(Zip::from(&lons)
        .and(&lats)
        .map_collect(|&lon, &lat| haversine_km(reference.lon, reference.lat, lon, lat)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn identical_points_are_zero_apart() {
        for &(lon, lat) in &[(0.0, 0.0), (5.93, 43.1), (-179.9, -89.0), (120.0, 60.0)] {
            assert_eq!(haversine_km(lon, lat, lon, lat), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((5.93, 43.1), (2.17, 41.35)),
            ((-70.0, -33.0), (151.2, -33.9)),
            ((0.0, 89.9), (180.0, -89.9)),
        ];
        for ((lon1, lat1), (lon2, lat2)) in pairs {
            assert_relative_eq!(
                haversine_km(lon1, lat1, lon2, lat2),
                haversine_km(lon2, lat2, lon1, lat1),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        assert_relative_eq!(haversine_km(0.0, 0.0, 0.0, 1.0), 111.195, epsilon = 1e-3);
    }

    #[test]
    fn antipodal_points_stay_finite() {
        let d = haversine_km(0.0, 0.0, 180.0, 0.0);
        assert!(d.is_finite());
        assert_relative_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, max_relative = 1e-9);
    }

    #[test]
    fn distances_follow_input_order() {
        let lons = array![5.0, 5.0, 6.0];
        let lats = array![43.0, 44.0, 43.0];
        let d = distances_km(GeoPoint::new(5.0, 43.0), lons.view(), lats.view()).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d[0], 0.0);
        assert!(d[1] > d[2]);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let lons = array![5.0, 5.0];
        let lats = array![43.0];
        assert!(distances_km(GeoPoint::new(5.0, 43.0), lons.view(), lats.view()).is_err());
    }
}
