//! Domain model: delivery points, routes and the ordered assignment table.
//!
//! A route's visiting order lives only in its [`RouteAssignment`]s. Anything
//! that looks like "the route's points" is derived from them on read.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a delivery point.
    PointId
);
entity_id!(
    /// Identifier of a route.
    RouteId
);
entity_id!(
    /// Identifier of a driver or dispatcher account.
    UserId
);

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A coordinate with an optional capture time (unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinate: Coordinate,
    pub captured_at: Option<i64>,
}

impl Location {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            captured_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: Option<String>,
    /// Geocoded position. Points without one cannot be measured.
    pub coordinate: Option<Coordinate>,
    pub verified: bool,
}

impl Address {
    pub fn new(street: impl Into<String>, city: impl Into<String>, postal_code: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            ..Default::default()
        }
    }

    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl DeliveryStatus {
    /// Completed and failed deliveries no longer need a visit.
    pub fn is_treated(self) -> bool {
        matches!(self, DeliveryStatus::Completed | DeliveryStatus::Failed)
    }
}

/// A delivery stop, owned independently of any route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPoint {
    pub id: PointId,
    pub address: Address,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    /// Global status of the point. Inside a route, the assignment status wins.
    pub status: DeliveryStatus,
    pub planned_time: Option<i64>,
    pub actual_time: Option<i64>,
}

impl DeliveryPoint {
    pub fn new(id: PointId, address: Address) -> Self {
        Self {
            id,
            address,
            client_name: None,
            client_phone: None,
            notes: None,
            status: DeliveryStatus::Pending,
            planned_time: None,
            actual_time: None,
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.address.coordinate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    #[default]
    Created,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub driver_id: UserId,
    pub dispatcher_id: UserId,
    pub status: RouteStatus,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub notes: Option<String>,
}

impl Route {
    pub fn new(id: RouteId, name: impl Into<String>, driver_id: UserId, dispatcher_id: UserId) -> Self {
        Self {
            id,
            name: name.into(),
            driver_id,
            dispatcher_id,
            status: RouteStatus::Created,
            start_time: None,
            end_time: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: UserId,
    pub name: String,
    pub available: bool,
    pub current_location: Option<Location>,
}

impl Driver {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            available: true,
            current_location: None,
        }
    }
}

/// Binds a point to a route at a sequence position.
///
/// Status and times here are scoped to this route and are authoritative in
/// route context; the point's own fields describe its global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAssignment {
    pub route_id: RouteId,
    pub point_id: PointId,
    /// 0-based position. Dense after any optimization.
    pub sequence: u32,
    pub is_start_point: bool,
    pub is_end_point: bool,
    pub status: DeliveryStatus,
    pub planned_time: Option<i64>,
    pub actual_time: Option<i64>,
}

impl RouteAssignment {
    pub fn pending(route_id: RouteId, point_id: PointId, sequence: u32) -> Self {
        Self {
            route_id,
            point_id,
            sequence,
            is_start_point: false,
            is_end_point: false,
            status: DeliveryStatus::Pending,
            planned_time: None,
            actual_time: None,
        }
    }

    pub fn as_start(mut self) -> Self {
        self.is_start_point = true;
        self
    }

    pub fn as_end(mut self) -> Self {
        self.is_end_point = true;
        self
    }
}

/// Sorts assignments by sequence position and drops repeated points.
///
/// The sort is stable so equal positions keep insertion order; when a point
/// is assigned twice the earlier entry wins.
pub fn ordered_assignments(mut assignments: Vec<RouteAssignment>) -> Vec<RouteAssignment> {
    assignments.sort_by_key(|assignment| assignment.sequence);

    let mut seen = HashSet::new();
    assignments.retain(|assignment| {
        let first = seen.insert(assignment.point_id);
        if !first {
            tracing::warn!(
                route_id = %assignment.route_id,
                point_id = %assignment.point_id,
                "duplicate assignment ignored"
            );
        }
        first
    });
    assignments
}

/// One visited point of a route plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub assignment: RouteAssignment,
    pub point: DeliveryPoint,
}

impl Stop {
    /// Route-scoped status of this stop.
    pub fn status(&self) -> DeliveryStatus {
        self.assignment.status
    }
}

/// A route together with its stops in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub route: Route,
    pub stops: Vec<Stop>,
}

impl RoutePlan {
    pub fn point_ids(&self) -> Vec<PointId> {
        self.stops.iter().map(|stop| stop.point.id).collect()
    }

    pub fn points(&self) -> impl Iterator<Item = &DeliveryPoint> {
        self.stops.iter().map(|stop| &stop.point)
    }
}
