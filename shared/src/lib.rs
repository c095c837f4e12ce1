//! Shared types for the floor allocation workspace
//!
//! Common types used by the engine and by its collaborators (UI, sync,
//! persistence), including the table/reservation data model, layout keys,
//! cluster records and the unified error system.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    CachedCluster, DiningTable, GridRect, LayoutKey, Reservation, ReservationStatus,
    ReservationType, ServiceCategory, TimeWindow,
};
