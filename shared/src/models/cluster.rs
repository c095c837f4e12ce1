//! Table Cluster Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grid::GridRect;
use super::layout_key::{LayoutKey, ServiceCategory};

/// Group of physically adjacent tables serving one reservation (拼桌)
///
/// `frame` is the bounding box of every member footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCluster {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub table_ids: Vec<i64>,
    pub date: NaiveDate,
    pub category: ServiceCategory,
    pub frame: GridRect,
}

impl CachedCluster {
    pub fn new(
        reservation_id: Uuid,
        table_ids: Vec<i64>,
        key: LayoutKey,
        frame: GridRect,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            table_ids,
            date: key.date,
            category: key.category,
            frame,
        }
    }

    pub fn layout_key(&self) -> LayoutKey {
        LayoutKey::new(self.date, self.category)
    }

    pub fn contains_table(&self, table_id: i64) -> bool {
        self.table_ids.contains(&table_id)
    }

    /// Copy re-addressed to another timeslot
    pub fn rekeyed(&self, key: LayoutKey) -> Self {
        Self {
            date: key.date,
            category: key.category,
            ..self.clone()
        }
    }
}
