//! Name → id resolution against the reference tables.
//!
//! Names are matched after trimming and upper-casing, so clients may send
//! `student`, `Student` or `STUDENT`.

use std::collections::HashMap;

use super::error::ReservationError;
use crate::models::TicketType;
use crate::store::{StatusKind, StoreTx};

pub fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

pub async fn resolve_status_id<T: StoreTx>(
    tx: &mut T,
    kind: StatusKind,
    name: &str,
) -> Result<i32, ReservationError> {
    let name = normalize(name);
    tx.status_id(kind, &name).await?.ok_or_else(|| {
        let what = match kind {
            StatusKind::Reservation => "reservation status",
            StatusKind::Ticket => "ticket status",
        };
        ReservationError::NotFound(format!("unknown {what} '{name}'"))
    })
}

pub async fn resolve_ticket_type<T: StoreTx>(
    tx: &mut T,
    name: &str,
) -> Result<TicketType, ReservationError> {
    let name = normalize(name);
    tx.ticket_type(&name)
        .await?
        .ok_or_else(|| ReservationError::NotFound(format!("unknown ticket type '{name}'")))
}

/// Ticket types resolved during one attempt, keyed by normalised name.
#[derive(Debug, Default)]
pub struct TicketTypeCache {
    resolved: HashMap<String, TicketType>,
}

impl TicketTypeCache {
    pub async fn get<T: StoreTx>(
        &mut self,
        tx: &mut T,
        name: &str,
    ) -> Result<TicketType, ReservationError> {
        let key = normalize(name);
        if let Some(ticket_type) = self.resolved.get(&key) {
            return Ok(ticket_type.clone());
        }

        let ticket_type = resolve_ticket_type(tx, &key).await?;
        self.resolved.insert(key, ticket_type.clone());
        Ok(ticket_type)
    }
}
