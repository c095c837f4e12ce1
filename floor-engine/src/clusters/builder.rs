//! Cluster builder
//!
//! Groups the tables of each reservation into physically connected
//! components. A reservation holding tables spread over the floor yields one
//! cluster per connected group; single tables never form a cluster.

use std::collections::{HashMap, HashSet, VecDeque};

use shared::models::{CachedCluster, DiningTable, GridRect, LayoutKey, Reservation};

use crate::geometry::layout_signature;

/// Connected components of `tables` under physical adjacency, in input order
pub fn connected_components(tables: &[&DiningTable]) -> Vec<Vec<DiningTable>> {
    let mut visited: HashSet<i64> = HashSet::new();
    let mut components = Vec::new();

    for table in tables {
        if visited.contains(&table.id) {
            continue;
        }

        let mut queue = VecDeque::from([*table]);
        let mut component = Vec::new();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.id) {
                continue;
            }
            component.push(current.clone());
            queue.extend(tables.iter().copied().filter(|n| {
                n.id != current.id
                    && !visited.contains(&n.id)
                    && current.is_physically_adjacent_to(n)
            }));
        }
        components.push(component);
    }

    components
}

/// Bounding frame of every footprint in `tables`
pub fn cluster_frame(tables: &[DiningTable]) -> GridRect {
    tables
        .iter()
        .map(DiningTable::footprint)
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default()
}

/// Clusters for one timeslot
///
/// Table positions come from `layout`, not from the reservation's own copy,
/// so a table moved after assignment is clustered where it stands now.
pub fn build_clusters(
    key: LayoutKey,
    layout: &[DiningTable],
    reservations: &[Reservation],
) -> Vec<CachedCluster> {
    let mut clusters = Vec::new();

    for reservation in reservations
        .iter()
        .filter(|r| r.layout_key() == key && r.occupies_tables() && r.tables.len() >= 2)
    {
        let held: Vec<&DiningTable> = layout
            .iter()
            .filter(|t| reservation.holds_table(t.id))
            .collect();
        if held.len() < 2 {
            continue;
        }

        for component in connected_components(&held) {
            if component.len() < 2 {
                continue;
            }
            clusters.push(CachedCluster::new(
                reservation.id,
                component.iter().map(|t| t.id).collect(),
                key,
                cluster_frame(&component),
            ));
        }
    }

    clusters
}

/// Skips rebuilding when neither the layout nor the assignments changed
#[derive(Debug, Default)]
pub struct ClusterBuilder {
    signatures: HashMap<LayoutKey, String>,
}

impl ClusterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn signature(key: LayoutKey, layout: &[DiningTable], reservations: &[Reservation]) -> String {
        let mut assignments: Vec<String> = reservations
            .iter()
            .filter(|r| r.layout_key() == key && r.occupies_tables() && !r.tables.is_empty())
            .map(|r| {
                let mut ids = r.table_ids();
                ids.sort_unstable();
                format!("{}:{:?}", r.id, ids)
            })
            .collect();
        assignments.sort_unstable();
        format!("{}#{}", layout_signature(layout), assignments.join(","))
    }

    /// Fresh clusters when the inputs changed since the last build for `key`
    pub fn rebuild_if_needed(
        &mut self,
        key: LayoutKey,
        layout: &[DiningTable],
        reservations: &[Reservation],
    ) -> Option<Vec<CachedCluster>> {
        let signature = Self::signature(key, layout, reservations);
        if self.signatures.get(&key) == Some(&signature) {
            tracing::trace!(key = %key, "Cluster inputs unchanged, skipping rebuild");
            return None;
        }
        self.signatures.insert(key, signature);
        Some(build_clusters(key, layout, reservations))
    }

    /// Forget the last build for `key`
    pub fn invalidate(&mut self, key: &LayoutKey) {
        self.signatures.remove(key);
    }
}
