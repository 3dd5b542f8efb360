//! Google-Maps-compatible HTTP adapter (Distance Matrix + Directions).

use std::env;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::model::Coordinate;
use crate::traits::{DistanceProvider, Leg};

/// Directions API limit on intermediate waypoints per request.
const DEFAULT_MAX_WAYPOINTS: usize = 25;

#[derive(Debug, Clone)]
pub struct MapsConfig {
    pub base_url: String,
    pub api_key: String,
    /// Travel mode passed to both endpoints.
    pub mode: String,
    pub timeout_secs: u64,
    pub max_waypoints: usize,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            api_key: String::new(),
            mode: "driving".to_string(),
            timeout_secs: 10,
            max_waypoints: DEFAULT_MAX_WAYPOINTS,
        }
    }
}

impl MapsConfig {
    /// Reads `MAPS_API_KEY`, `MAPS_API_URL` and `MAPS_TIMEOUT_SECS`.
    ///
    /// Returns `None` when no API key is configured.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("MAPS_API_KEY").ok().filter(|key| !key.is_empty())?;
        let mut config = Self {
            api_key,
            ..Default::default()
        };
        if let Ok(url) = env::var("MAPS_API_URL") {
            config.base_url = url;
        }
        if let Some(secs) = env::var("MAPS_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()) {
            config.timeout_secs = secs;
        }
        Some(config)
    }
}

#[derive(Debug, Clone)]
pub struct MapsClient {
    config: MapsConfig,
    client: reqwest::blocking::Client,
}

impl MapsClient {
    pub fn new(config: MapsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T, reqwest::Error> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        debug!(%url, ?query, "maps request");

        self.client
            .get(url)
            .query(query)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<T>())
    }
}

impl DistanceProvider for MapsClient {
    fn distance_and_duration(&self, origin: Coordinate, destination: Coordinate) -> Result<Leg, ProviderError> {
        let query = [
            ("origins", origin.to_string()),
            ("destinations", destination.to_string()),
            ("mode", self.config.mode.clone()),
        ];

        let body = self
            .get::<DistanceMatrixResponse>("distancematrix/json", &query)
            .map_err(|err| ProviderError::DistanceUnavailable(err.to_string()))?;

        leg_from_matrix(body)
    }

    fn optimal_waypoints(&self, origin: Coordinate, waypoints: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        match waypoints.len() {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![0]),
            n if n > self.config.max_waypoints => {
                return Err(ProviderError::OptimizationUnavailable(format!(
                    "{} waypoints exceed the limit of {}",
                    n, self.config.max_waypoints
                )));
            }
            _ => {}
        }

        let stops = waypoints
            .iter()
            .map(Coordinate::to_string)
            .collect::<Vec<_>>()
            .join("|");

        // Round trip: destination is the origin again.
        let query = [
            ("origin", origin.to_string()),
            ("destination", origin.to_string()),
            ("waypoints", format!("optimize:true|{}", stops)),
            ("mode", self.config.mode.clone()),
        ];

        let body = self
            .get::<DirectionsResponse>("directions/json", &query)
            .map_err(|err| ProviderError::OptimizationUnavailable(err.to_string()))?;

        order_from_directions(body)
    }
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    waypoint_order: Vec<usize>,
}

fn describe(status: &str, message: Option<&str>) -> String {
    match message {
        Some(message) => format!("{}: {}", status, message),
        None => status.to_string(),
    }
}

fn leg_from_matrix(body: DistanceMatrixResponse) -> Result<Leg, ProviderError> {
    if body.status != "OK" {
        return Err(ProviderError::DistanceUnavailable(describe(
            &body.status,
            body.error_message.as_deref(),
        )));
    }

    let element = body
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| ProviderError::DistanceUnavailable("empty distance matrix".to_string()))?;

    if element.status != "OK" {
        warn!(status = %element.status, "no route between points");
        return Ok(Leg::no_route());
    }

    match (element.distance, element.duration) {
        (Some(distance), Some(duration)) => Ok(Leg::new(distance.value, duration.value)),
        _ => Err(ProviderError::DistanceUnavailable(
            "matrix element without distance or duration".to_string(),
        )),
    }
}

fn order_from_directions(body: DirectionsResponse) -> Result<Vec<usize>, ProviderError> {
    if body.status != "OK" {
        return Err(ProviderError::OptimizationUnavailable(describe(
            &body.status,
            body.error_message.as_deref(),
        )));
    }

    body.routes
        .into_iter()
        .next()
        .map(|route| route.waypoint_order)
        .ok_or_else(|| ProviderError::OptimizationUnavailable("directions response without routes".to_string()))
}
