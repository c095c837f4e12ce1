//! Data models
//!
//! Shared between the engine and its collaborators (UI, persistence, sync).
//! Table IDs are `i64`, reservation IDs are UUIDs.

pub mod cluster;
pub mod dining_table;
pub mod grid;
pub mod layout_key;
pub mod reservation;

// Re-exports
pub use cluster::*;
pub use dining_table::*;
pub use grid::*;
pub use layout_key::*;
pub use reservation::*;
