use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Assignment failures, surfaced to the caller for a user-facing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssignmentError {
    /// No tables are available at all
    #[error("No tables left")]
    NoTablesLeft,

    /// There are tables, but not enough to seat the party
    #[error("Not enough free tables to seat the party")]
    InsufficientTables,

    /// The manually selected table is not in the layout
    #[error("Table not found in layout")]
    TableNotFound,

    /// The manually selected table is locked or occupied
    #[error("Table is locked")]
    TableLocked,

    #[error("Unknown assignment error")]
    Unknown,
}

impl AssignmentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoTablesLeft => ErrorCode::NoTablesLeft,
            Self::InsufficientTables => ErrorCode::InsufficientTables,
            Self::TableNotFound => ErrorCode::TableNotFound,
            Self::TableLocked => ErrorCode::TableLocked,
            Self::Unknown => ErrorCode::Unknown,
        }
    }
}

impl From<AssignmentError> for ErrorCode {
    fn from(err: AssignmentError) -> Self {
        err.code()
    }
}

impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        AppError::with_message(err.code(), err.to_string())
    }
}
