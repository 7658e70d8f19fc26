//! Reservation creation workflow.
//!
//! One attempt runs inside one store transaction:
//!
//! ```text
//! Start -> Validated -> CapacityReserved -> ReservationPersisted
//!       -> TicketsPersisted -> Confirmed
//! ```
//!
//! Any error drops out of the sequence, rolls the transaction back and is
//! returned unchanged. Nothing is retried here.

use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::error::ReservationError;
use super::ledger;
use super::lookup::{resolve_status_id, TicketTypeCache};
use super::pricing;
use crate::models::{
    CreateReservationRequest, Event, NewReservation, NewTicket, Principal, ReservationReceipt,
    ReservationStatus, TicketRequest, TicketStatus,
};
use crate::store::{StatusKind, Store, StoreError, StoreTx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Validated,
    CapacityReserved,
    ReservationPersisted,
    TicketsPersisted,
    Confirmed,
}

pub struct ReservationService<S> {
    store: S,
    deadline: Duration,
}

impl<S: Store> ReservationService<S> {
    /// `deadline` bounds an attempt from `begin` up to the commit. An attempt
    /// that runs past it is abandoned and its transaction rolled back. The
    /// commit itself is not cut short.
    pub fn new(store: S, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(
        skip(self, principal, request),
        fields(user_id = %principal.user_id, event_id = request.event_id, tickets = request.tickets.len())
    )]
    pub async fn create_reservation(
        &self,
        principal: &Principal,
        request: &CreateReservationRequest,
    ) -> Result<ReservationReceipt, ReservationError> {
        let total_tickets = match validate(principal, request) {
            Ok(total) => total,
            Err(err) => {
                warn!(stage = ?Stage::Start, error = %err, "Reservation request rejected");
                return Err(err);
            }
        };

        let booking = self.prepare(principal, request, total_tickets);
        let (tx, reservation_id) = match tokio::time::timeout(self.deadline, booking).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(deadline = ?self.deadline, "Reservation deadline exceeded, transaction abandoned");
                return Err(ReservationError::DeadlineExceeded(self.deadline));
            }
        };

        // Not bounded by the deadline: a commit in flight always completes.
        if let Err(err) = tx.commit().await {
            error!(%reservation_id, error = ?err, "Commit failed");
            return Err(err.into());
        }

        info!(%reservation_id, total_tickets, "Reservation confirmed");
        Ok(ReservationReceipt { reservation_id })
    }

    /// Runs every stage up to `Confirmed` and hands back the still-open
    /// transaction. On failure the transaction has already been rolled back.
    async fn prepare(
        &self,
        principal: &Principal,
        request: &CreateReservationRequest,
        total_tickets: i32,
    ) -> Result<(S::Tx, Uuid), ReservationError> {
        let tx = self.store.begin().await?;
        let mut attempt = Attempt::new(tx);

        match attempt.book(principal, request, total_tickets).await {
            Ok(reservation_id) => Ok((attempt.tx, reservation_id)),
            Err(err) => {
                warn!(stage = ?attempt.stage, error = %err, "Reservation aborted, rolling back");
                if let Err(rollback_err) = attempt.tx.rollback().await {
                    error!(error = ?rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

fn validate(
    principal: &Principal,
    request: &CreateReservationRequest,
) -> Result<i32, ReservationError> {
    if !principal.role.can_reserve() {
        return Err(ReservationError::PermissionDenied(format!(
            "role {} may not create reservations",
            principal.role
        )));
    }

    if request.event_id <= 0 {
        return Err(ReservationError::InvalidInput(
            "event_id must be a positive integer".to_string(),
        ));
    }

    if request.tickets.is_empty() {
        return Err(ReservationError::InvalidInput(
            "at least one ticket must be requested".to_string(),
        ));
    }

    i32::try_from(request.tickets.len())
        .map_err(|_| ReservationError::InvalidInput("too many tickets requested".to_string()))
}

struct Attempt<T> {
    tx: T,
    stage: Stage,
}

impl<T: StoreTx> Attempt<T> {
    fn new(tx: T) -> Self {
        Self {
            tx,
            stage: Stage::Validated,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug!(from = ?self.stage, to = ?next, "Reservation stage");
        self.stage = next;
    }

    async fn book(
        &mut self,
        principal: &Principal,
        request: &CreateReservationRequest,
        total_tickets: i32,
    ) -> Result<Uuid, ReservationError> {
        let (event, pending_id) = self.reserve_capacity(request.event_id, total_tickets).await?;
        self.advance(Stage::CapacityReserved);

        let reservation_id = self
            .tx
            .insert_reservation(&NewReservation {
                user_id: principal.user_id,
                event_id: event.id,
                total_tickets,
                status_id: pending_id,
            })
            .await?;
        self.advance(Stage::ReservationPersisted);

        self.persist_tickets(reservation_id, &event, &request.tickets)
            .await?;
        self.advance(Stage::TicketsPersisted);

        self.confirm(reservation_id, total_tickets).await?;
        self.advance(Stage::Confirmed);

        Ok(reservation_id)
    }

    async fn reserve_capacity(
        &mut self,
        event_id: i64,
        count: i32,
    ) -> Result<(Event, i32), ReservationError> {
        let pending_id = resolve_status_id(
            &mut self.tx,
            StatusKind::Reservation,
            ReservationStatus::Pending.as_str(),
        )
        .await?;

        let event = self
            .tx
            .event(event_id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("event {event_id} does not exist")))?;

        if count > event.available_tickets {
            return Err(ReservationError::InsufficientCapacity {
                event_id,
                requested: count,
                available: event.available_tickets,
            });
        }

        ledger::reserve(&mut self.tx, event_id, count).await?;
        Ok((event, pending_id))
    }

    async fn persist_tickets(
        &mut self,
        reservation_id: Uuid,
        event: &Event,
        tickets: &[TicketRequest],
    ) -> Result<(), ReservationError> {
        let reserved_id = resolve_status_id(
            &mut self.tx,
            StatusKind::Ticket,
            TicketStatus::Reserved.as_str(),
        )
        .await?;

        let mut types = TicketTypeCache::default();
        for ticket in tickets {
            let ticket_type = types.get(&mut self.tx, &ticket.ticket_type).await?;
            let ticket_id = self
                .tx
                .insert_ticket(&NewTicket {
                    reservation_id,
                    price: pricing::price(event.price, ticket_type.discount),
                    type_id: ticket_type.id,
                    status_id: reserved_id,
                })
                .await?;
            debug!(ticket_id, ticket_type = %ticket_type.name, "Ticket reserved");
        }

        Ok(())
    }

    /// RESERVED -> SOLD for every ticket, then PENDING -> CONFIRMED.
    async fn confirm(
        &mut self,
        reservation_id: Uuid,
        total_tickets: i32,
    ) -> Result<(), ReservationError> {
        let sold_id = resolve_status_id(
            &mut self.tx,
            StatusKind::Ticket,
            TicketStatus::Sold.as_str(),
        )
        .await?;
        let confirmed_id = resolve_status_id(
            &mut self.tx,
            StatusKind::Reservation,
            ReservationStatus::Confirmed.as_str(),
        )
        .await?;

        let sold = self
            .tx
            .update_ticket_statuses(reservation_id, sold_id)
            .await?;
        if sold != u64::from(total_tickets.unsigned_abs()) {
            return Err(StoreError::Inconsistent(format!(
                "expected {total_tickets} tickets for reservation {reservation_id}, updated {sold}"
            ))
            .into());
        }

        let updated = self
            .tx
            .update_reservation_status(reservation_id, confirmed_id)
            .await?;
        if updated != 1 {
            return Err(StoreError::Inconsistent(format!(
                "reservation {reservation_id} vanished before confirmation"
            ))
            .into());
        }

        Ok(())
    }
}
