//! Persistence adapter
//!
//! The engine persists snapshots of its caches and the reservation book
//! through [`FloorStore`]. Values are JSON; keys are the `YYYY-MM-DD-category`
//! form of [`LayoutKey`] or the reservation UUID. Round-trip fidelity of table
//! and cluster records is the only contract.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`] | tests, ephemeral engines |
//! | [`RedbStore`] | on-disk redb file (or redb in-memory backend) |

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use shared::models::{CachedCluster, DiningTable, LayoutKey, Reservation};
use thiserror::Error;

use crate::timeline::Entry;

pub type LayoutEntries = Vec<(LayoutKey, Entry<Vec<DiningTable>>)>;
pub type ClusterEntries = Vec<(LayoutKey, Entry<Vec<CachedCluster>>)>;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::error::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => {
                Self::with_message(shared::error::ErrorCode::SerializationError, e.to_string())
            }
            other => Self::storage(other.to_string()),
        }
    }
}

/// Snapshot persistence for layouts, clusters and reservations
pub trait FloorStore: Send + Sync {
    fn load_layouts(&self) -> StorageResult<LayoutEntries>;

    /// Replace every stored layout entry
    fn store_layouts(&self, entries: &LayoutEntries) -> StorageResult<()>;

    fn load_clusters(&self) -> StorageResult<ClusterEntries>;

    /// Replace every stored cluster entry
    fn store_clusters(&self, entries: &ClusterEntries) -> StorageResult<()>;

    fn load_reservations(&self) -> StorageResult<Vec<Reservation>>;

    /// Insert or replace one reservation
    fn store_reservation(&self, reservation: &Reservation) -> StorageResult<()>;
}

fn parse_key(raw: &str) -> StorageResult<LayoutKey> {
    raw.parse()
        .map_err(|e: shared::error::AppError| StorageError::InvalidKey(e.message))
}

/// Serialize entries as `(key string, JSON bytes)` pairs
fn encode_entries<V: serde::Serialize>(
    entries: &[(LayoutKey, Entry<V>)],
) -> StorageResult<Vec<(String, Vec<u8>)>> {
    entries
        .iter()
        .map(|(key, entry)| Ok((key.to_string(), serde_json::to_vec(entry)?)))
        .collect()
}

fn decode_entry<V: serde::de::DeserializeOwned>(
    key: &str,
    bytes: &[u8],
) -> StorageResult<(LayoutKey, Entry<V>)> {
    Ok((parse_key(key)?, serde_json::from_slice(bytes)?))
}
