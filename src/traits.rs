//! Collaborator traits for the optimization engine.
//!
//! The engine never talks to a mapping service or a database directly; it
//! goes through these seams so deployments and tests can plug their own.

use crate::error::{ProviderError, StoreError};
use crate::model::{Coordinate, DeliveryPoint, Driver, PointId, Route, RouteAssignment, RouteId, UserId};

/// Travel distance and duration between two coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// False when the provider answered but found no route between the pair.
    /// Such a leg reports zero distance and must not be read as "closest".
    pub routable: bool,
}

impl Leg {
    pub fn new(distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            distance_meters,
            duration_seconds,
            routable: true,
        }
    }

    pub fn no_route() -> Self {
        Self {
            distance_meters: 0.0,
            duration_seconds: 0.0,
            routable: false,
        }
    }
}

/// External distance and waypoint-ordering service.
///
/// Both operations are fallible; an `Err` means "unavailable right now" and
/// callers are expected to fall back rather than fail.
pub trait DistanceProvider: Send + Sync {
    fn distance_and_duration(&self, origin: Coordinate, destination: Coordinate) -> Result<Leg, ProviderError>;

    /// Optimized visiting order for `waypoints` on a round trip from
    /// `origin`, as 0-based indices into `waypoints`.
    fn optimal_waypoints(&self, origin: Coordinate, waypoints: &[Coordinate]) -> Result<Vec<usize>, ProviderError>;
}

impl<P: DistanceProvider + ?Sized> DistanceProvider for &P {
    fn distance_and_duration(&self, origin: Coordinate, destination: Coordinate) -> Result<Leg, ProviderError> {
        (**self).distance_and_duration(origin, destination)
    }

    fn optimal_waypoints(&self, origin: Coordinate, waypoints: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        (**self).optimal_waypoints(origin, waypoints)
    }
}

impl<P: DistanceProvider + ?Sized> DistanceProvider for Box<P> {
    fn distance_and_duration(&self, origin: Coordinate, destination: Coordinate) -> Result<Leg, ProviderError> {
        (**self).distance_and_duration(origin, destination)
    }

    fn optimal_waypoints(&self, origin: Coordinate, waypoints: &[Coordinate]) -> Result<Vec<usize>, ProviderError> {
        (**self).optimal_waypoints(origin, waypoints)
    }
}

/// Persistence for routes, their assignments, drivers and points.
pub trait RouteStore {
    fn find_route(&self, id: RouteId) -> Result<Option<Route>, StoreError>;

    fn save_route(&self, route: &Route) -> Result<(), StoreError>;

    /// Assignments of a route ordered by sequence position.
    fn find_assignments(&self, route_id: RouteId) -> Result<Vec<RouteAssignment>, StoreError>;

    /// Replaces every assignment of the route in one atomic step: either the
    /// whole new set is stored or the previous one is left untouched.
    fn replace_assignments(&self, route_id: RouteId, assignments: Vec<RouteAssignment>) -> Result<(), StoreError>;

    fn find_driver(&self, id: UserId) -> Result<Option<Driver>, StoreError>;

    /// Points matching `ids`. Unknown ids are simply absent from the result.
    fn find_points(&self, ids: &[PointId]) -> Result<Vec<DeliveryPoint>, StoreError>;
}

impl<S: RouteStore + ?Sized> RouteStore for &S {
    fn find_route(&self, id: RouteId) -> Result<Option<Route>, StoreError> {
        (**self).find_route(id)
    }

    fn save_route(&self, route: &Route) -> Result<(), StoreError> {
        (**self).save_route(route)
    }

    fn find_assignments(&self, route_id: RouteId) -> Result<Vec<RouteAssignment>, StoreError> {
        (**self).find_assignments(route_id)
    }

    fn replace_assignments(&self, route_id: RouteId, assignments: Vec<RouteAssignment>) -> Result<(), StoreError> {
        (**self).replace_assignments(route_id, assignments)
    }

    fn find_driver(&self, id: UserId) -> Result<Option<Driver>, StoreError> {
        (**self).find_driver(id)
    }

    fn find_points(&self, ids: &[PointId]) -> Result<Vec<DeliveryPoint>, StoreError> {
        (**self).find_points(ids)
    }
}
