//! route-sequencer
//!
//! Orders the delivery points of a route for one driver: external waypoint
//! optimization with a nearest-neighbor fallback, priority prefixes, pinned
//! start/end points and route distance aggregation.

pub mod endpoints;
pub mod engine;
pub mod error;
pub mod haversine;
pub mod maps;
pub mod model;
pub mod optimizer;
pub mod osrm;
pub mod priority;
pub mod sequencer;
pub mod store;
pub mod traits;

pub use engine::{MissingCoordinatePolicy, OptimizerConfig, PointOrder, RouteDistance, RouteOptimizationEngine};
pub use error::{PlannerError, ProviderError, StoreError};
pub use model::{Coordinate, DeliveryPoint, RouteAssignment, RoutePlan};
pub use traits::{DistanceProvider, Leg, RouteStore};
