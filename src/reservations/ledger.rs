//! Capacity ledger: the only writer of `events.available_tickets`.
//!
//! The decrement is a conditional update executed inside the caller's
//! transaction, so two attempts can never both take the last tickets even
//! when they run on different server instances.

use super::error::ReservationError;
use crate::store::StoreTx;

/// Takes `count` tickets from the event's capacity and returns what remains.
pub async fn reserve<T: StoreTx>(
    tx: &mut T,
    event_id: i64,
    count: i32,
) -> Result<i32, ReservationError> {
    if let Some(remaining) = tx.decrement_available_tickets(event_id, count).await? {
        return Ok(remaining);
    }

    // The guarded update matched nothing; report why.
    match tx.event(event_id).await? {
        Some(event) => Err(ReservationError::InsufficientCapacity {
            event_id,
            requested: count,
            available: event.available_tickets,
        }),
        None => Err(ReservationError::NotFound(format!(
            "event {event_id} does not exist"
        ))),
    }
}
