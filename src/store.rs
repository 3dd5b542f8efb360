//! In-memory [`RouteStore`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StoreError;
use crate::model::{DeliveryPoint, Driver, PointId, Route, RouteAssignment, RouteId, UserId};
use crate::traits::RouteStore;

#[derive(Debug, Default)]
struct Tables {
    routes: HashMap<RouteId, Route>,
    assignments: HashMap<RouteId, Vec<RouteAssignment>>,
    drivers: HashMap<UserId, Driver>,
    points: HashMap<PointId, DeliveryPoint>,
}

/// Thread-safe store keeping every table in one lock, so an assignment
/// replacement is never observed half-applied.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_route(&self, route: Route) {
        self.write().routes.insert(route.id, route);
    }

    pub fn insert_driver(&self, driver: Driver) {
        self.write().drivers.insert(driver.id, driver);
    }

    pub fn insert_point(&self, point: DeliveryPoint) {
        self.write().points.insert(point.id, point);
    }

    /// Appends an assignment to its route.
    pub fn assign(&self, assignment: RouteAssignment) {
        self.write()
            .assignments
            .entry(assignment.route_id)
            .or_default()
            .push(assignment);
    }
}

impl RouteStore for InMemoryStore {
    fn find_route(&self, id: RouteId) -> Result<Option<Route>, StoreError> {
        Ok(self.read().routes.get(&id).cloned())
    }

    fn save_route(&self, route: &Route) -> Result<(), StoreError> {
        self.write().routes.insert(route.id, route.clone());
        Ok(())
    }

    fn find_assignments(&self, route_id: RouteId) -> Result<Vec<RouteAssignment>, StoreError> {
        let mut assignments = self
            .read()
            .assignments
            .get(&route_id)
            .cloned()
            .unwrap_or_default();
        assignments.sort_by_key(|assignment| assignment.sequence);
        Ok(assignments)
    }

    fn replace_assignments(&self, route_id: RouteId, assignments: Vec<RouteAssignment>) -> Result<(), StoreError> {
        if let Some(foreign) = assignments.iter().find(|a| a.route_id != route_id) {
            return Err(StoreError::Backend(format!(
                "assignment for route {} submitted to route {}",
                foreign.route_id, route_id
            )));
        }

        let mut tables = self.write();
        if !tables.routes.contains_key(&route_id) {
            return Err(StoreError::Backend(format!("route {} does not exist", route_id)));
        }
        tables.assignments.insert(route_id, assignments);
        Ok(())
    }

    fn find_driver(&self, id: UserId) -> Result<Option<Driver>, StoreError> {
        Ok(self.read().drivers.get(&id).cloned())
    }

    fn find_points(&self, ids: &[PointId]) -> Result<Vec<DeliveryPoint>, StoreError> {
        let tables = self.read();
        Ok(ids.iter().filter_map(|id| tables.points.get(id).cloned()).collect())
    }
}
