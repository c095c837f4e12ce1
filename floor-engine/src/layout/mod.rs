//! Per-timeslot floor layouts

mod cache;

pub use cache::{LayoutCache, LayoutStats, MoveResult};
