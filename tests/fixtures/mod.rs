//! Test fixtures for route-sequencer.
//!
//! Provides:
//! - Real Paris locations
//! - A builder that seeds an in-memory store with one route
//! - Mock distance providers with predictable behavior

#![allow(dead_code)]

pub mod paris_locations;

use std::sync::Mutex;

use route_sequencer::error::ProviderError;
use route_sequencer::haversine;
use route_sequencer::model::{
    Address, Coordinate, DeliveryPoint, DeliveryStatus, Driver, Location, PointId, Route, RouteAssignment,
    RouteId, UserId,
};
use route_sequencer::store::InMemoryStore;
use route_sequencer::traits::{DistanceProvider, Leg};

pub const ROUTE: RouteId = RouteId(1);
pub const DRIVER: UserId = UserId(100);
pub const DISPATCHER: UserId = UserId(200);

// ============================================================================
// Store Builder
// ============================================================================

/// Builder for a store holding one route, its driver and its points.
///
/// Points are assigned in the order they are added.
pub struct RouteBuilder {
    store: InMemoryStore,
    driver: Option<Driver>,
    next_sequence: u32,
}

impl RouteBuilder {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        store.insert_route(Route::new(ROUTE, "Paris centre", DRIVER, DISPATCHER));
        Self {
            store,
            driver: Some(Driver::new(DRIVER, "Camille")),
            next_sequence: 0,
        }
    }

    pub fn driver_at(mut self, coordinate: Coordinate) -> Self {
        if let Some(driver) = self.driver.as_mut() {
            driver.current_location = Some(Location::new(coordinate));
        }
        self
    }

    pub fn without_driver(mut self) -> Self {
        self.driver = None;
        self
    }

    pub fn point(self, id: u64, coordinate: Coordinate) -> Self {
        self.assigned(id, Some(coordinate), |assignment| assignment)
    }

    pub fn unlocated_point(self, id: u64) -> Self {
        self.assigned(id, None, |assignment| assignment)
    }

    pub fn start_point(self, id: u64, coordinate: Coordinate) -> Self {
        self.assigned(id, Some(coordinate), RouteAssignment::as_start)
    }

    pub fn end_point(self, id: u64, coordinate: Coordinate) -> Self {
        self.assigned(id, Some(coordinate), RouteAssignment::as_end)
    }

    pub fn point_with_status(self, id: u64, coordinate: Coordinate, status: DeliveryStatus) -> Self {
        self.assigned(id, Some(coordinate), move |mut assignment| {
            assignment.status = status;
            assignment
        })
    }

    fn assigned(
        mut self,
        id: u64,
        coordinate: Option<Coordinate>,
        adjust: impl FnOnce(RouteAssignment) -> RouteAssignment,
    ) -> Self {
        let mut address = Address::new(format!("{} rue de Test", id), "Paris", "7500");
        address.coordinate = coordinate;
        self.store.insert_point(DeliveryPoint::new(PointId(id), address));
        self.store
            .assign(adjust(RouteAssignment::pending(ROUTE, PointId(id), self.next_sequence)));
        self.next_sequence += 1;
        self
    }

    pub fn build(self) -> InMemoryStore {
        if let Some(driver) = self.driver {
            self.store.insert_driver(driver);
        }
        self.store
    }
}

// ============================================================================
// Mock Providers
// ============================================================================

fn straight_line(from: Coordinate, to: Coordinate) -> Leg {
    let km = haversine::distance_km(from, to);
    Leg::new(km * 1000.0, haversine::travel_seconds(km, 30.0))
}

/// Every call fails, as if the mapping service were down.
pub struct Offline;

impl DistanceProvider for Offline {
    fn distance_and_duration(&self, _: Coordinate, _: Coordinate) -> Result<Leg, ProviderError> {
        Err(ProviderError::DistanceUnavailable("connection refused".to_string()))
    }

    fn optimal_waypoints(&self, _: Coordinate, _: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        Err(ProviderError::OptimizationUnavailable("connection refused".to_string()))
    }
}

/// Optimizes by reversing the input and records every origin it was given.
#[derive(Default)]
pub struct Reversing {
    pub origins: Mutex<Vec<Coordinate>>,
}

impl DistanceProvider for Reversing {
    fn distance_and_duration(&self, from: Coordinate, to: Coordinate) -> Result<Leg, ProviderError> {
        Ok(straight_line(from, to))
    }

    fn optimal_waypoints(&self, origin: Coordinate, waypoints: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        self.origins.lock().unwrap().push(origin);
        Ok((0..waypoints.len()).rev().collect())
    }
}

/// Answers waypoint optimization with a fixed, possibly invalid, order.
pub struct Scripted(pub Vec<usize>);

impl DistanceProvider for Scripted {
    fn distance_and_duration(&self, from: Coordinate, to: Coordinate) -> Result<Leg, ProviderError> {
        Ok(straight_line(from, to))
    }

    fn optimal_waypoints(&self, _: Coordinate, _: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Reports "no route" for every leg ending at `unreachable`.
pub struct NoRouteTo {
    pub unreachable: Coordinate,
}

impl DistanceProvider for NoRouteTo {
    fn distance_and_duration(&self, from: Coordinate, to: Coordinate) -> Result<Leg, ProviderError> {
        if to == self.unreachable {
            Ok(Leg::no_route())
        } else {
            Ok(straight_line(from, to))
        }
    }

    fn optimal_waypoints(&self, _: Coordinate, _: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        Err(ProviderError::OptimizationUnavailable("ZERO_RESULTS".to_string()))
    }
}
