//! OSRM HTTP adapter: `/route` for legs, `/trip` for waypoint ordering.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::model::Coordinate;
use crate::traits::{DistanceProvider, Leg};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Reads `OSRM_URL` and `OSRM_PROFILE`, keeping defaults for the rest.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("OSRM_URL") {
            config.base_url = url;
        }
        if let Ok(profile) = env::var("OSRM_PROFILE") {
            config.profile = profile;
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    // OSRM reports failures such as NoRoute with a 4xx status and a JSON
    // body, so the body is decoded regardless of the status code.
    fn get<T: DeserializeOwned>(&self, service: &str, coordinates: &[Coordinate], options: &str) -> Result<T, reqwest::Error> {
        let url = format!(
            "{}/{}/v1/{}/{}?{}",
            self.config.base_url,
            service,
            self.config.profile,
            encode_coordinates(coordinates),
            options
        );
        debug!(%url, "osrm request");

        self.client.get(url).send().and_then(|resp| resp.json::<T>())
    }
}

fn encode_coordinates(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.longitude, c.latitude))
        .collect::<Vec<_>>()
        .join(";")
}

impl DistanceProvider for OsrmClient {
    fn distance_and_duration(&self, origin: Coordinate, destination: Coordinate) -> Result<Leg, ProviderError> {
        let body = self
            .get::<OsrmRouteResponse>("route", &[origin, destination], "overview=false")
            .map_err(|err| ProviderError::DistanceUnavailable(err.to_string()))?;

        leg_from_route(body)
    }

    fn optimal_waypoints(&self, origin: Coordinate, waypoints: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        if waypoints.len() <= 1 {
            return Ok((0..waypoints.len()).collect());
        }

        let mut coordinates = Vec::with_capacity(waypoints.len() + 1);
        coordinates.push(origin);
        coordinates.extend_from_slice(waypoints);

        let body = self
            .get::<OsrmTripResponse>(
                "trip",
                &coordinates,
                "source=first&roundtrip=true&overview=false",
            )
            .map_err(|err| ProviderError::OptimizationUnavailable(err.to_string()))?;

        order_from_trip(body)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmTripResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    waypoints: Vec<OsrmTripWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmTripWaypoint {
    /// Position of this input coordinate within the computed trip.
    waypoint_index: usize,
}

fn failure(code: &str, message: Option<&str>) -> String {
    format!("{} ({})", code, message.unwrap_or("no message"))
}

fn leg_from_route(body: OsrmRouteResponse) -> Result<Leg, ProviderError> {
    match body.code.as_str() {
        "Ok" => body
            .routes
            .first()
            .map(|route| Leg::new(route.distance, route.duration))
            .ok_or_else(|| ProviderError::DistanceUnavailable("route response without routes".to_string())),
        "NoRoute" => {
            warn!("osrm found no route between points");
            Ok(Leg::no_route())
        }
        code => Err(ProviderError::DistanceUnavailable(failure(code, body.message.as_deref()))),
    }
}

/// Converts trip positions into an order over the waypoints, dropping the
/// origin which OSRM pins at position 0.
fn order_from_trip(body: OsrmTripResponse) -> Result<Vec<usize>, ProviderError> {
    if body.code != "Ok" {
        return Err(ProviderError::OptimizationUnavailable(failure(
            &body.code,
            body.message.as_deref(),
        )));
    }
    if body.waypoints.is_empty() {
        return Err(ProviderError::OptimizationUnavailable(
            "trip response without waypoints".to_string(),
        ));
    }

    let mut by_position: Vec<(usize, usize)> = body
        .waypoints
        .iter()
        .enumerate()
        .skip(1)
        .map(|(input, waypoint)| (waypoint.waypoint_index, input - 1))
        .collect();
    by_position.sort_by_key(|(position, _)| *position);

    Ok(by_position.into_iter().map(|(_, index)| index).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_lng_lat() {
        let encoded = encode_coordinates(&[Coordinate::new(43.7384, 7.4246), Coordinate::new(43.73, 7.42)]);
        assert_eq!(encoded, "7.424600,43.738400;7.420000,43.730000");
    }

    #[test]
    fn test_route_ok() {
        let body: OsrmRouteResponse = serde_json::from_str(
            r#"{"code": "Ok", "routes": [{"distance": 1520.4, "duration": 211.7}], "waypoints": []}"#,
        )
        .unwrap();
        assert_eq!(leg_from_route(body), Ok(Leg::new(1520.4, 211.7)));
    }

    #[test]
    fn test_route_no_route() {
        let body: OsrmRouteResponse =
            serde_json::from_str(r#"{"code": "NoRoute", "message": "Impossible route between points"}"#).unwrap();
        assert_eq!(leg_from_route(body), Ok(Leg::no_route()));
    }

    #[test]
    fn test_route_invalid_query() {
        let body: OsrmRouteResponse =
            serde_json::from_str(r#"{"code": "InvalidQuery", "message": "Query string malformed"}"#).unwrap();
        assert!(matches!(leg_from_route(body), Err(ProviderError::DistanceUnavailable(_))));
    }

    #[test]
    fn test_trip_order_skips_origin() {
        // Input: origin, w0, w1, w2. Trip visits origin, w2, w0, w1.
        let body: OsrmTripResponse = serde_json::from_str(
            r#"{"code": "Ok", "waypoints": [
                {"waypoint_index": 0, "trips_index": 0},
                {"waypoint_index": 2, "trips_index": 0},
                {"waypoint_index": 3, "trips_index": 0},
                {"waypoint_index": 1, "trips_index": 0}
            ]}"#,
        )
        .unwrap();
        assert_eq!(order_from_trip(body), Ok(vec![2, 0, 1]));
    }

    #[test]
    fn test_trip_failure() {
        let body: OsrmTripResponse = serde_json::from_str(r#"{"code": "NoTrips"}"#).unwrap();
        assert!(matches!(order_from_trip(body), Err(ProviderError::OptimizationUnavailable(_))));
    }
}
