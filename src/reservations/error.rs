use std::time::Duration;
use thiserror::Error;

use crate::store::StoreError;

/// Coarse outcome classes handed to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    InvalidInput,
    NotFound,
    InsufficientCapacity,
    TransactionFailure,
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("not enough tickets for event {event_id}: requested {requested}, available {available}")]
    InsufficientCapacity {
        event_id: i64,
        requested: i32,
        available: i32,
    },

    #[error("reservation did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl ReservationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ReservationError::InvalidInput(_) => ErrorKind::InvalidInput,
            ReservationError::NotFound(_) => ErrorKind::NotFound,
            ReservationError::InsufficientCapacity { .. } => ErrorKind::InsufficientCapacity,
            ReservationError::DeadlineExceeded(_) | ReservationError::Store(_) => {
                ErrorKind::TransactionFailure
            }
        }
    }

    /// Client errors are final for the attempt; infrastructure failures left
    /// nothing behind and the whole attempt may be resubmitted.
    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::TransactionFailure
    }
}
