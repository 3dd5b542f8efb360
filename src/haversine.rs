//! Great-circle distance, and a provider built on it.
//!
//! Straight-line distance ignores roads but never fails, which makes it the
//! fallback metric for every external measurement.

use crate::error::ProviderError;
use crate::model::Coordinate;
use crate::traits::{DistanceProvider, Leg};

/// Average driving speed assumption for time estimation.
pub const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates in kilometers.
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Seconds needed to cover `km` at `speed_kmh`.
pub fn travel_seconds(km: f64, speed_kmh: f64) -> f64 {
    km / speed_kmh * 3600.0
}

/// Offline provider that answers every distance query with straight-line
/// estimates.
///
/// It cannot optimize waypoints, so engines using it always go through
/// nearest-neighbor sequencing.
#[derive(Debug, Clone)]
pub struct HaversineProvider {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineProvider {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineProvider {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl DistanceProvider for HaversineProvider {
    fn distance_and_duration(&self, origin: Coordinate, destination: Coordinate) -> Result<Leg, ProviderError> {
        let km = distance_km(origin, destination);
        Ok(Leg::new(km * 1000.0, travel_seconds(km, self.speed_kmh)))
    }

    fn optimal_waypoints(&self, _origin: Coordinate, _waypoints: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        Err(ProviderError::OptimizationUnavailable(
            "haversine provider does not optimize waypoints".to_string(),
        ))
    }
}
