use shared::error::{AppError, ErrorCode};
use shared::models::ReservationStatus;
use thiserror::Error;
use uuid::Uuid;

use crate::assignment::AssignmentError;
use crate::storage::StorageError;

/// Allocation manager errors
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("Assignment failed: {0}")]
    Assignment(#[from] AssignmentError),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    /// Only terminal or waiting-list reservations may be stored without tables
    #[error("Reservation must hold tables: {0}")]
    TablesRequired(Uuid),

    #[error("Reservation is not on the waiting list: {0}")]
    NotWaitingList(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type AllocationResult<T> = Result<T, AllocationError>;

impl AllocationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Assignment(e) => e.code(),
            Self::ReservationNotFound(_) => ErrorCode::ReservationNotFound,
            Self::InvalidTransition { .. } => ErrorCode::InvalidStatusTransition,
            Self::TablesRequired(_) => ErrorCode::TablesRequired,
            Self::NotWaitingList(_) => ErrorCode::NotOnWaitingList,
            Self::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        let code = err.code();
        match err {
            AllocationError::ReservationNotFound(id)
            | AllocationError::TablesRequired(id)
            | AllocationError::NotWaitingList(id) => AppError::new(code)
                .with_detail("reservation_id", id.to_string()),
            AllocationError::InvalidTransition { from, to } => AppError::new(code)
                .with_detail("from", format!("{from:?}"))
                .with_detail("to", format!("{to:?}")),
            AllocationError::Storage(e) => e.into(),
            other => AppError::with_message(code, other.to_string()),
        }
    }
}
