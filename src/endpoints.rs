//! Start/end pinning for fixed-endpoint optimization.

use crate::error::PlannerError;
use crate::model::{RouteAssignment, Stop};

/// A route's stops split around its pinned boundary points.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedEndpoints {
    pub start: Option<Stop>,
    pub interior: Vec<Stop>,
    pub end: Option<Stop>,
}

impl FixedEndpoints {
    /// Separates the start- and end-flagged stops from the interior.
    ///
    /// A stop flagged as both start and end is treated as the start. More
    /// than one start or end flag is an invalid route state.
    pub fn split(stops: Vec<Stop>) -> Result<Self, PlannerError> {
        validate_endpoints(stops.iter().map(|stop| &stop.assignment))?;

        let mut start = None;
        let mut end = None;
        let mut interior = Vec::with_capacity(stops.len());

        for stop in stops {
            if stop.assignment.is_start_point {
                start = Some(stop);
            } else if stop.assignment.is_end_point {
                end = Some(stop);
            } else {
                interior.push(stop);
            }
        }

        Ok(Self { start, interior, end })
    }

    /// Reassembles `[start] + interior + [end]`.
    pub fn compose(self) -> Vec<Stop> {
        let mut stops = Vec::with_capacity(self.interior.len() + 2);
        stops.extend(self.start);
        stops.extend(self.interior);
        stops.extend(self.end);
        stops
    }
}

/// Enforces at most one start flag and one end flag per route.
pub fn validate_endpoints<'a>(assignments: impl IntoIterator<Item = &'a RouteAssignment>) -> Result<(), PlannerError> {
    let (mut starts, mut ends) = (0usize, 0usize);
    for assignment in assignments {
        starts += usize::from(assignment.is_start_point);
        ends += usize::from(assignment.is_end_point);
    }

    if starts > 1 {
        return Err(PlannerError::InvalidRouteState(format!("{} start points flagged", starts)));
    }
    if ends > 1 {
        return Err(PlannerError::InvalidRouteState(format!("{} end points flagged", ends)));
    }
    Ok(())
}

/// Rewrites sequence positions to `0..n` in the current order.
pub fn renumber(stops: &mut [Stop]) {
    for (position, stop) in stops.iter_mut().enumerate() {
        stop.assignment.sequence = position as u32;
    }
}
