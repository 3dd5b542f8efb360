//! Waypoint ordering delegated to the distance provider.

use tracing::debug;

use crate::error::ProviderError;
use crate::model::{Coordinate, DeliveryPoint};
use crate::traits::DistanceProvider;

pub struct ExternalOptimizer<'a, P: ?Sized> {
    provider: &'a P,
}

impl<'a, P: DistanceProvider + ?Sized> ExternalOptimizer<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Reorders `points` by the provider's optimized waypoint order.
    ///
    /// Every point must carry a coordinate. Failures are returned as-is; the
    /// caller decides how to fall back.
    pub fn optimize(&self, start: Coordinate, points: Vec<DeliveryPoint>) -> Result<Vec<DeliveryPoint>, ProviderError> {
        let order = self.order(start, &points)?;
        Ok(apply_order(points, &order))
    }

    /// The validated visiting order of `points` as indices into the slice.
    pub fn order(&self, start: Coordinate, points: &[DeliveryPoint]) -> Result<Vec<usize>, ProviderError> {
        let waypoints = points
            .iter()
            .map(|point| {
                point.coordinate().ok_or_else(|| {
                    ProviderError::OptimizationUnavailable(format!("delivery point {} has no coordinates", point.id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let order = self.provider.optimal_waypoints(start, &waypoints)?;
        validate_permutation(&order, points.len())?;
        debug!(?order, "provider waypoint order");
        Ok(order)
    }
}

/// Checks that `order` holds each index of `0..len` exactly once.
pub fn validate_permutation(order: &[usize], len: usize) -> Result<(), ProviderError> {
    if order.len() != len {
        return Err(ProviderError::OptimizationUnavailable(format!(
            "provider returned {} indices for {} waypoints",
            order.len(),
            len
        )));
    }

    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(ProviderError::OptimizationUnavailable(format!(
                    "index {} repeated in waypoint order",
                    index
                )));
            }
            None => {
                return Err(ProviderError::OptimizationUnavailable(format!(
                    "index {} out of range for {} waypoints",
                    index, len
                )));
            }
        }
    }
    Ok(())
}

// `order` must already be a validated permutation of `points`.
pub(crate) fn apply_order(points: Vec<DeliveryPoint>, order: &[usize]) -> Vec<DeliveryPoint> {
    let mut slots: Vec<Option<DeliveryPoint>> = points.into_iter().map(Some).collect();
    order.iter().filter_map(|&index| slots[index].take()).collect()
}
