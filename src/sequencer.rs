//! Nearest-neighbor sequencing and fallback-aware distance measurement.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::haversine::{self, DEFAULT_SPEED_KMH};
use crate::model::{Coordinate, DeliveryPoint};
use crate::traits::DistanceProvider;

/// Where a measured distance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureSource {
    Provider,
    /// Straight-line estimate used because the provider failed or found no
    /// route.
    Haversine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub meters: f64,
    pub seconds: f64,
    pub source: MeasureSource,
}

/// Measures `from -> to` with the provider, falling back to a haversine
/// estimate when the provider is unavailable or reports no route.
pub fn measure<P: DistanceProvider + ?Sized>(provider: &P, from: Coordinate, to: Coordinate) -> Measurement {
    match provider.distance_and_duration(from, to) {
        Ok(leg) if leg.routable => Measurement {
            meters: leg.distance_meters,
            seconds: leg.duration_seconds,
            source: MeasureSource::Provider,
        },
        Ok(_) => {
            debug!(%from, %to, "no route reported, using straight-line estimate");
            estimate(from, to)
        }
        Err(err) => {
            warn!(%from, %to, error = %err, "using straight-line distance");
            estimate(from, to)
        }
    }
}

fn estimate(from: Coordinate, to: Coordinate) -> Measurement {
    let km = haversine::distance_km(from, to);
    Measurement {
        meters: km * 1000.0,
        seconds: haversine::travel_seconds(km, DEFAULT_SPEED_KMH),
        source: MeasureSource::Haversine,
    }
}

/// Greedy nearest-neighbor tour construction.
pub struct NearestNeighbor<'a, P: ?Sized> {
    provider: &'a P,
    parallel: bool,
}

impl<'a, P: DistanceProvider + ?Sized> NearestNeighbor<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            parallel: false,
        }
    }

    /// Measure the candidates of each step concurrently.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Orders `points` starting from `start`.
    ///
    /// Always returns a permutation of the input. Points without a coordinate
    /// are never picked by the greedy pass and follow it in input order.
    pub fn sequence(&self, start: Coordinate, points: Vec<DeliveryPoint>) -> Vec<DeliveryPoint> {
        let mut ordered = Vec::with_capacity(points.len());
        let mut remaining = Vec::with_capacity(points.len());
        let mut unlocated = Vec::new();

        for point in points {
            match point.coordinate() {
                Some(coordinate) => remaining.push((coordinate, point)),
                None => {
                    warn!(point_id = %point.id, "delivery point without coordinates skipped");
                    unlocated.push(point);
                }
            }
        }

        let mut current = start;
        while !remaining.is_empty() {
            let distances = self.candidate_distances(current, &remaining);
            let (coordinate, point) = remaining.remove(nearest(&distances));
            current = coordinate;
            ordered.push(point);
        }

        ordered.extend(unlocated);
        ordered
    }

    fn candidate_distances(&self, from: Coordinate, candidates: &[(Coordinate, DeliveryPoint)]) -> Vec<f64> {
        if self.parallel {
            candidates
                .par_iter()
                .map(|(to, _)| measure(self.provider, from, *to).meters)
                .collect()
        } else {
            candidates
                .iter()
                .map(|(to, _)| measure(self.provider, from, *to).meters)
                .collect()
        }
    }
}

/// Index of the smallest distance; the first one wins ties.
fn nearest(distances: &[f64]) -> usize {
    let mut best = 0;
    for (index, distance) in distances.iter().enumerate().skip(1) {
        if *distance < distances[best] {
            best = index;
        }
    }
    best
}
