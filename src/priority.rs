//! Priority prefix: points that are always visited first, in a fixed order.

use serde::{Deserialize, Serialize};

use crate::model::{DeliveryPoint, PointId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityPolicy {
    ids: Vec<PointId>,
}

impl PriorityPolicy {
    pub fn new(ids: impl IntoIterator<Item = PointId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> &[PointId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Splits `points` into the priority prefix (in policy order) and the
    /// remainder (in original relative order).
    ///
    /// Each configured id claims at most one point; ids that match nothing
    /// are ignored.
    pub fn extract(&self, points: Vec<DeliveryPoint>) -> (Vec<DeliveryPoint>, Vec<DeliveryPoint>) {
        let mut slots: Vec<Option<DeliveryPoint>> = points.into_iter().map(Some).collect();
        let mut priority = Vec::new();

        for id in &self.ids {
            let claimed = slots
                .iter_mut()
                .find(|slot| matches!(&**slot, Some(point) if point.id == *id))
                .and_then(Option::take);
            if let Some(point) = claimed {
                priority.push(point);
            }
        }

        let remainder = slots.into_iter().flatten().collect();
        (priority, remainder)
    }
}
