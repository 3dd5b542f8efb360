//! Route optimization engine.
//!
//! Orchestrates priority extraction, external waypoint optimization with a
//! nearest-neighbor fallback, fixed-endpoint handling and distance
//! aggregation on top of a [`RouteStore`] and a [`DistanceProvider`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::endpoints::{FixedEndpoints, renumber, validate_endpoints};
use crate::error::PlannerError;
use crate::model::{
    Coordinate, DeliveryPoint, Driver, PointId, Route, RouteAssignment, RouteId, RoutePlan, RouteStatus, Stop,
    UserId, ordered_assignments,
};
use crate::optimizer::{ExternalOptimizer, apply_order};
use crate::priority::PriorityPolicy;
use crate::sequencer::{MeasureSource, NearestNeighbor, measure};
use crate::traits::{DistanceProvider, RouteStore};

/// Start position used when neither a start point nor a driver position is
/// known (Paris city center).
pub const DEFAULT_START: Coordinate = Coordinate::new(48.8566, 2.3522);

/// What to do with points whose address has no coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingCoordinatePolicy {
    /// Optimize the located points and visit the others last, in their
    /// current relative order.
    #[default]
    AppendToEnd,
    /// Refuse to optimize the route.
    Reject,
}

#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Points always visited first, in this order.
    pub priority: PriorityPolicy,
    /// Fallback start when no better position is known.
    pub default_start: Coordinate,
    pub missing_coordinates: MissingCoordinatePolicy,
    /// Measure nearest-neighbor candidates concurrently.
    pub parallel_lookups: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            priority: PriorityPolicy::default(),
            default_start: DEFAULT_START,
            missing_coordinates: MissingCoordinatePolicy::default(),
            parallel_lookups: false,
        }
    }
}

/// One measured hop of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Coordinate,
    pub to: Coordinate,
    pub to_point: PointId,
    pub meters: f64,
    pub seconds: f64,
    pub source: MeasureSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteDistance {
    pub segments: Vec<Segment>,
    /// Points left out of the walk because they have no coordinate.
    pub skipped: Vec<PointId>,
}

impl RouteDistance {
    pub fn total_meters(&self) -> f64 {
        self.segments.iter().map(|segment| segment.meters).sum()
    }

    pub fn total_km(&self) -> f64 {
        self.total_meters() / 1000.0
    }

    pub fn total_seconds(&self) -> f64 {
        self.segments.iter().map(|segment| segment.seconds).sum()
    }
}

/// A manually requested position for one point of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOrder {
    pub point_id: PointId,
    pub sequence: u32,
    pub is_start_point: bool,
    pub is_end_point: bool,
}

pub struct RouteOptimizationEngine<S, P> {
    store: S,
    provider: P,
    config: OptimizerConfig,
}

impl<S: RouteStore, P: DistanceProvider> RouteOptimizationEngine<S, P> {
    pub fn new(store: S, provider: P, config: OptimizerConfig) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The route with its stops in the stored visiting order.
    pub fn plan(&self, route_id: RouteId) -> Result<RoutePlan, PlannerError> {
        let route = self.load_route(route_id)?;
        let stops = self.load_stops(route_id)?;
        Ok(RoutePlan { route, stops })
    }

    /// Reorders every point of the route: priority points first, the rest
    /// by the provider's optimizer or, failing that, nearest-neighbor.
    pub fn optimize_route(&self, route_id: RouteId) -> Result<RoutePlan, PlannerError> {
        info!(%route_id, "optimizing route");

        let route = self.load_route(route_id)?;
        let driver = self.load_driver(route.driver_id)?;
        let start = match driver.current_location {
            Some(location) => location.coordinate,
            None => {
                warn!(driver_id = %driver.id, "driver position unknown, using default start");
                self.config.default_start
            }
        };

        let stops = self.load_stops(route_id)?;
        if stops.is_empty() {
            return Ok(RoutePlan { route, stops });
        }

        let (mut assignments, points) = detach(stops);
        let (priority, remainder) = self.config.priority.extract(points);
        if !priority.is_empty() {
            info!(count = priority.len(), "priority points placed first");
        }

        let mut ordered = priority;
        ordered.extend(self.sequence(start, remainder)?);

        let stops = reattach(ordered, &mut assignments)?;
        self.commit(route, stops)
    }

    /// Reorders only the interior of the route, keeping the start- and
    /// end-flagged points at its boundaries.
    ///
    /// A route without assignments is returned unchanged.
    pub fn optimize_route_with_fixed_points(&self, route_id: RouteId) -> Result<RoutePlan, PlannerError> {
        info!(%route_id, "optimizing route with fixed endpoints");

        let route = self.load_route(route_id)?;
        let stops = self.load_stops(route_id)?;
        if stops.is_empty() {
            debug!(%route_id, "route has no assignments, nothing to optimize");
            return Ok(RoutePlan { route, stops });
        }

        let FixedEndpoints { start, interior, end } = FixedEndpoints::split(stops)?;

        let origin = match start.as_ref().and_then(|stop| stop.point.coordinate()) {
            Some(coordinate) => coordinate,
            None => self.driver_position(route.driver_id)?,
        };

        let (mut assignments, points) = detach(interior);
        let ordered = self.sequence(origin, points)?;
        let interior = reattach(ordered, &mut assignments)?;

        let stops = FixedEndpoints { start, interior, end }.compose();
        self.commit(route, stops)
    }

    /// Total driving distance of the route in kilometers.
    pub fn calculate_total_route_distance(&self, route_id: RouteId) -> Result<f64, PlannerError> {
        Ok(self.route_distance(route_id)?.total_km())
    }

    /// Walks the route in order and measures every hop.
    ///
    /// The walk starts at the driver's position when known; otherwise the
    /// first located point is the start and contributes no segment.
    pub fn route_distance(&self, route_id: RouteId) -> Result<RouteDistance, PlannerError> {
        let plan = self.plan(route_id)?;
        let mut distance = RouteDistance::default();
        if plan.stops.is_empty() {
            return Ok(distance);
        }

        let driver = self.load_driver(plan.route.driver_id)?;
        let mut current = driver.current_location.map(|location| location.coordinate);

        for point in plan.points() {
            let Some(to) = point.coordinate() else {
                warn!(point_id = %point.id, "delivery point without coordinates left out of distance");
                distance.skipped.push(point.id);
                continue;
            };

            if let Some(from) = current {
                let measured = measure(&self.provider, from, to);
                distance.segments.push(Segment {
                    from,
                    to,
                    to_point: point.id,
                    meters: measured.meters,
                    seconds: measured.seconds,
                    source: measured.source,
                });
            }
            current = Some(to);
        }

        debug!(%route_id, km = distance.total_km(), "route distance");
        Ok(distance)
    }

    /// Applies a manually chosen order.
    ///
    /// `orders` must list every point of the route exactly once. Positions
    /// are taken as relative order and stored densely; route-scoped status
    /// and times are kept.
    pub fn update_points_order(&self, route_id: RouteId, orders: Vec<PointOrder>) -> Result<RoutePlan, PlannerError> {
        let route = self.load_route(route_id)?;
        let (mut assignments, points) = detach(self.load_stops(route_id)?);
        let mut points: HashMap<PointId, DeliveryPoint> = points.into_iter().map(|p| (p.id, p)).collect();

        let mut stops = Vec::with_capacity(orders.len());
        for order in orders {
            let (Some(mut assignment), Some(point)) =
                (assignments.remove(&order.point_id), points.remove(&order.point_id))
            else {
                return Err(PlannerError::PointNotFound(order.point_id));
            };
            assignment.sequence = order.sequence;
            assignment.is_start_point = order.is_start_point;
            assignment.is_end_point = order.is_end_point;
            stops.push(Stop { assignment, point });
        }

        if !assignments.is_empty() {
            return Err(PlannerError::InvalidRouteState(format!(
                "new order omits {} point(s) of route {}",
                assignments.len(),
                route_id
            )));
        }
        validate_endpoints(stops.iter().map(|stop| &stop.assignment))?;

        stops.sort_by_key(|stop| stop.assignment.sequence);
        self.commit(route, stops)
    }

    /// Closes the route once every stop is completed or failed.
    pub fn complete_route(&self, route_id: RouteId, ended_at: i64) -> Result<Route, PlannerError> {
        let mut route = self.load_route(route_id)?;
        let untreated: Vec<PointId> = self
            .store
            .find_assignments(route_id)?
            .into_iter()
            .filter(|assignment| !assignment.status.is_treated())
            .map(|assignment| assignment.point_id)
            .collect();

        if !untreated.is_empty() {
            warn!(%route_id, count = untreated.len(), "route still has untreated points");
            return Err(PlannerError::UntreatedPoints(untreated));
        }

        route.status = RouteStatus::Completed;
        route.end_time = Some(ended_at);
        self.store.save_route(&route)?;
        info!(%route_id, "route completed");
        Ok(route)
    }

    /// Orders `points` from `start`: external optimizer first, then
    /// nearest-neighbor. Unlocated points are handled per configuration.
    fn sequence(&self, start: Coordinate, points: Vec<DeliveryPoint>) -> Result<Vec<DeliveryPoint>, PlannerError> {
        if points.is_empty() {
            return Ok(points);
        }

        let (located, unlocated): (Vec<_>, Vec<_>) = points.into_iter().partition(|p| p.coordinate().is_some());
        if !unlocated.is_empty() {
            let ids: Vec<PointId> = unlocated.iter().map(|p| p.id).collect();
            match self.config.missing_coordinates {
                MissingCoordinatePolicy::Reject => return Err(PlannerError::MissingCoordinates(ids)),
                MissingCoordinatePolicy::AppendToEnd => {
                    warn!(?ids, "points without coordinates appended to the end");
                }
            }
        }

        let mut ordered = match ExternalOptimizer::new(&self.provider).order(start, &located) {
            Ok(order) => apply_order(located, &order),
            Err(err) => {
                warn!(error = %err, count = located.len(), "external optimization failed, using nearest neighbor");
                NearestNeighbor::new(&self.provider)
                    .parallel(self.config.parallel_lookups)
                    .sequence(start, located)
            }
        };

        ordered.extend(unlocated);
        Ok(ordered)
    }

    /// Renumbers `stops` densely and stores them as the route's only
    /// assignments.
    fn commit(&self, route: Route, mut stops: Vec<Stop>) -> Result<RoutePlan, PlannerError> {
        renumber(&mut stops);
        let assignments = stops.iter().map(|stop| stop.assignment.clone()).collect();
        self.store.replace_assignments(route.id, assignments)?;

        info!(route_id = %route.id, points = stops.len(), "route order saved");
        Ok(RoutePlan { route, stops })
    }

    fn load_route(&self, id: RouteId) -> Result<Route, PlannerError> {
        self.store.find_route(id)?.ok_or(PlannerError::RouteNotFound(id))
    }

    fn load_driver(&self, id: UserId) -> Result<Driver, PlannerError> {
        self.store.find_driver(id)?.ok_or(PlannerError::DriverNotFound(id))
    }

    fn driver_position(&self, driver_id: UserId) -> Result<Coordinate, PlannerError> {
        let driver = self.load_driver(driver_id)?;
        Ok(driver
            .current_location
            .map(|location| location.coordinate)
            .unwrap_or(self.config.default_start))
    }

    fn load_stops(&self, route_id: RouteId) -> Result<Vec<Stop>, PlannerError> {
        let assignments = ordered_assignments(self.store.find_assignments(route_id)?);
        let ids: Vec<PointId> = assignments.iter().map(|a| a.point_id).collect();
        let mut points: HashMap<PointId, DeliveryPoint> = self
            .store
            .find_points(&ids)?
            .into_iter()
            .map(|point| (point.id, point))
            .collect();

        assignments
            .into_iter()
            .map(|assignment| {
                let point = points
                    .remove(&assignment.point_id)
                    .ok_or(PlannerError::PointNotFound(assignment.point_id))?;
                Ok(Stop { assignment, point })
            })
            .collect()
    }
}

fn detach(stops: Vec<Stop>) -> (HashMap<PointId, RouteAssignment>, Vec<DeliveryPoint>) {
    let mut assignments = HashMap::with_capacity(stops.len());
    let mut points = Vec::with_capacity(stops.len());
    for Stop { assignment, point } in stops {
        assignments.insert(point.id, assignment);
        points.push(point);
    }
    (assignments, points)
}

fn reattach(
    points: Vec<DeliveryPoint>,
    assignments: &mut HashMap<PointId, RouteAssignment>,
) -> Result<Vec<Stop>, PlannerError> {
    points
        .into_iter()
        .map(|point| {
            let assignment = assignments
                .remove(&point.id)
                .ok_or(PlannerError::PointNotFound(point.id))?;
            Ok(Stop { assignment, point })
        })
        .collect()
}
