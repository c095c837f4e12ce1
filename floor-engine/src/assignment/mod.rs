//! Table assignment - picks tables for a reservation from a layout

mod engine;
mod error;

#[cfg(test)]
mod tests;

pub use engine::{AssignmentEngine, AssignmentMode, TableAvailability};
pub use error::AssignmentError;
