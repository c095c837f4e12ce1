//! In-memory store, JSON encoded like the redb backend

use std::collections::BTreeMap;

use parking_lot::Mutex;
use shared::models::Reservation;

use super::{
    ClusterEntries, FloorStore, LayoutEntries, StorageResult, decode_entry, encode_entries,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    layouts: Mutex<BTreeMap<String, Vec<u8>>>,
    clusters: Mutex<BTreeMap<String, Vec<u8>>>,
    reservations: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.lock().len()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.lock().len()
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.lock().len()
    }
}

impl FloorStore for MemoryStore {
    fn load_layouts(&self) -> StorageResult<LayoutEntries> {
        self.layouts
            .lock()
            .iter()
            .map(|(k, v)| decode_entry(k, v))
            .collect()
    }

    fn store_layouts(&self, entries: &LayoutEntries) -> StorageResult<()> {
        let encoded = encode_entries(entries)?;
        *self.layouts.lock() = encoded.into_iter().collect();
        Ok(())
    }

    fn load_clusters(&self) -> StorageResult<ClusterEntries> {
        self.clusters
            .lock()
            .iter()
            .map(|(k, v)| decode_entry(k, v))
            .collect()
    }

    fn store_clusters(&self, entries: &ClusterEntries) -> StorageResult<()> {
        let encoded = encode_entries(entries)?;
        *self.clusters.lock() = encoded.into_iter().collect();
        Ok(())
    }

    fn load_reservations(&self) -> StorageResult<Vec<Reservation>> {
        self.reservations
            .lock()
            .values()
            .map(|v| Ok(serde_json::from_slice(v)?))
            .collect()
    }

    fn store_reservation(&self, reservation: &Reservation) -> StorageResult<()> {
        let bytes = serde_json::to_vec(reservation)?;
        self.reservations
            .lock()
            .insert(reservation.id.to_string(), bytes);
        Ok(())
    }
}
