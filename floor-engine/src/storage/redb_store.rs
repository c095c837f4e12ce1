//! redb-backed floor store
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `layouts` | layout key string | JSON `Entry<Vec<DiningTable>>` |
//! | `clusters` | layout key string | JSON `Entry<Vec<CachedCluster>>` |
//! | `reservations` | reservation UUID | JSON `Reservation` |
//!
//! Snapshot writes replace the whole table inside one write transaction, so a
//! crash leaves either the old or the new snapshot.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::Reservation;

use super::{
    ClusterEntries, FloorStore, LayoutEntries, StorageResult, decode_entry, encode_entries,
};

/// String-keyed table of JSON blobs
type BlobTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Layout snapshots: key = layout key string, value = JSON-serialized entry
const LAYOUTS_TABLE: BlobTable = TableDefinition::new("layouts");

/// Cluster snapshots: key = layout key string, value = JSON-serialized entry
const CLUSTERS_TABLE: BlobTable = TableDefinition::new("clusters");

/// Reservation book: key = reservation id, value = JSON-serialized Reservation
const RESERVATIONS_TABLE: BlobTable = TableDefinition::new("reservations");

/// Floor store backed by redb
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").field("db", &"<redb::Database>").finish()
    }
}

impl RedbStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path.as_ref())?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(LAYOUTS_TABLE)?;
            let _ = write_txn.open_table(CLUSTERS_TABLE)?;
            let _ = write_txn.open_table(RESERVATIONS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    fn replace_table(&self, definition: BlobTable, rows: Vec<(String, Vec<u8>)>) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            write_txn.delete_table(definition)?;
            let mut table = write_txn.open_table(definition)?;
            for (key, value) in &rows {
                table.insert(key.as_str(), value.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn read_table(&self, definition: BlobTable) -> StorageResult<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(definition)?;
        let mut rows = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            rows.push((key.value().to_string(), value.value().to_vec()));
        }
        Ok(rows)
    }
}

impl FloorStore for RedbStore {
    fn load_layouts(&self) -> StorageResult<LayoutEntries> {
        self.read_table(LAYOUTS_TABLE)?
            .iter()
            .map(|(k, v)| decode_entry(k, v))
            .collect()
    }

    fn store_layouts(&self, entries: &LayoutEntries) -> StorageResult<()> {
        self.replace_table(LAYOUTS_TABLE, encode_entries(entries)?)
    }

    fn load_clusters(&self) -> StorageResult<ClusterEntries> {
        self.read_table(CLUSTERS_TABLE)?
            .iter()
            .map(|(k, v)| decode_entry(k, v))
            .collect()
    }

    fn store_clusters(&self, entries: &ClusterEntries) -> StorageResult<()> {
        self.replace_table(CLUSTERS_TABLE, encode_entries(entries)?)
    }

    fn load_reservations(&self) -> StorageResult<Vec<Reservation>> {
        self.read_table(RESERVATIONS_TABLE)?
            .iter()
            .map(|(_, v)| Ok(serde_json::from_slice(v)?))
            .collect()
    }

    fn store_reservation(&self, reservation: &Reservation) -> StorageResult<()> {
        let bytes = serde_json::to_vec(reservation)?;
        let id = reservation.id.to_string();
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(RESERVATIONS_TABLE)?;
            table.insert(id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
