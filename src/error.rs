//! Error types.
//!
//! [`ProviderError`] is the "unavailable" half of every external call and is
//! always recovered inside the engine. [`PlannerError`] is what callers see.

use thiserror::Error;

use crate::model::{PointId, RouteId, UserId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("distance unavailable: {0}")]
    DistanceUnavailable(String),
    #[error("waypoint optimization unavailable: {0}")]
    OptimizationUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error("route {0} not found")]
    RouteNotFound(RouteId),
    #[error("driver {0} not found")]
    DriverNotFound(UserId),
    #[error("delivery point {0} not found")]
    PointNotFound(PointId),
    #[error("invalid route state: {0}")]
    InvalidRouteState(String),
    #[error("delivery points without coordinates: {0:?}")]
    MissingCoordinates(Vec<PointId>),
    #[error("{} delivery point(s) neither completed nor failed", .0.len())]
    UntreatedPoints(Vec<PointId>),
    #[error(transparent)]
    Store(#[from] StoreError),
}
