//! In-process store with the same transactional contract as Postgres.
//!
//! A transaction holds the store's lock from `begin` until it is committed,
//! rolled back or dropped, so transactions are fully serialised. Writes go to
//! a private copy of the tables and only replace the shared state on commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{StatusKind, Store, StoreError, StoreResult, StoreTx};
use crate::models::{
    Event, NewReservation, NewTicket, ReservationDetails, ReservationStatus, ReservationSummary,
    TicketStatus, TicketType, TicketView,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: i64,
    pub created_at: DateTime<Utc>,
    pub total_tickets: i32,
    pub status_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketRow {
    pub id: i64,
    pub reservation_id: Uuid,
    pub price: Decimal,
    pub type_id: i32,
    pub status_id: i32,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    events: BTreeMap<i64, Event>,
    reservation_statuses: BTreeMap<i32, String>,
    ticket_statuses: BTreeMap<i32, String>,
    ticket_types: BTreeMap<i32, TicketType>,
    reservations: BTreeMap<Uuid, ReservationRow>,
    tickets: BTreeMap<i64, TicketRow>,
    next_ticket_id: i64,
}

impl Tables {
    fn seeded() -> Self {
        let mut tables = Tables {
            next_ticket_id: 1,
            ..Tables::default()
        };

        let reservation_statuses = [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
        ];
        for (id, status) in (1..).zip(reservation_statuses) {
            tables
                .reservation_statuses
                .insert(id, status.as_str().to_string());
        }

        let ticket_statuses = [
            TicketStatus::Available,
            TicketStatus::Reserved,
            TicketStatus::Sold,
            TicketStatus::Cancelled,
        ];
        for (id, status) in (1..).zip(ticket_statuses) {
            tables.ticket_statuses.insert(id, status.as_str().to_string());
        }

        let ticket_types = [
            ("STANDARD", Decimal::ZERO, "Full price admission"),
            ("STUDENT", Decimal::new(20, 2), "Discounted admission for students"),
            ("SENIOR", Decimal::new(30, 2), "Discounted admission for seniors"),
        ];
        for (id, (name, discount, description)) in (1..).zip(ticket_types) {
            tables.ticket_types.insert(
                id,
                TicketType {
                    id,
                    name: name.to_string(),
                    discount,
                    description: description.to_string(),
                },
            );
        }

        tables
    }

    fn statuses(&self, kind: StatusKind) -> &BTreeMap<i32, String> {
        match kind {
            StatusKind::Reservation => &self.reservation_statuses,
            StatusKind::Ticket => &self.ticket_statuses,
        }
    }

    fn status_name(&self, kind: StatusKind, id: i32) -> String {
        self.statuses(kind).get(&id).cloned().unwrap_or_default()
    }

    fn details(&self, row: &ReservationRow) -> ReservationDetails {
        let event_name = self
            .events
            .get(&row.event_id)
            .map(|event| event.name.clone())
            .unwrap_or_default();

        let tickets = self
            .tickets
            .values()
            .filter(|ticket| ticket.reservation_id == row.id)
            .map(|ticket| TicketView {
                id: ticket.id,
                price: ticket.price,
                ticket_type: self
                    .ticket_types
                    .get(&ticket.type_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default(),
                status: self.status_name(StatusKind::Ticket, ticket.status_id),
            })
            .collect();

        ReservationDetails {
            reservation: ReservationSummary {
                id: row.id,
                user_id: row.user_id,
                event_id: row.event_id,
                event_name,
                created_at: row.created_at,
                total_tickets: row.total_tickets,
                status: self.status_name(StatusKind::Reservation, row.status_id),
            },
            tickets,
        }
    }
}

/// Shared in-memory store. Clones see the same tables.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Faults,
}

/// Failures a test can inject into every transaction of a store.
#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    fail_ticket_insert: Option<usize>,
    commit_delay: Option<Duration>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A store holding only the bootstrap reference data.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::seeded())),
            faults: Faults::default(),
        }
    }

    /// Makes the `n`-th ticket insert (1-based) of every transaction fail.
    #[cfg(any(test, feature = "test-util"))]
    pub fn fail_ticket_insert(mut self, n: usize) -> Self {
        self.faults.fail_ticket_insert = Some(n);
        self
    }

    /// Makes every commit wait `delay` before publishing its writes.
    #[cfg(any(test, feature = "test-util"))]
    pub fn delay_commit(mut self, delay: Duration) -> Self {
        self.faults.commit_delay = Some(delay);
        self
    }

    pub async fn insert_event(&self, event: Event) {
        self.tables.lock().await.events.insert(event.id, event);
    }

    pub async fn insert_ticket_type(&self, ticket_type: TicketType) {
        self.tables
            .lock()
            .await
            .ticket_types
            .insert(ticket_type.id, ticket_type);
    }

    pub async fn event_snapshot(&self, event_id: i64) -> Option<Event> {
        self.tables.lock().await.events.get(&event_id).cloned()
    }

    pub async fn reservation_rows(&self) -> Vec<ReservationRow> {
        self.tables.lock().await.reservations.values().cloned().collect()
    }

    pub async fn ticket_rows(&self) -> Vec<TicketRow> {
        self.tables.lock().await.tickets.values().cloned().collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx {
            guard,
            working,
            faults: self.faults,
            tickets_inserted: 0,
        })
    }

    async fn event(&self, event_id: i64) -> StoreResult<Option<Event>> {
        Ok(self.event_snapshot(event_id).await)
    }

    async fn reservation(&self, reservation_id: Uuid) -> StoreResult<Option<ReservationDetails>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reservations
            .get(&reservation_id)
            .map(|row| tables.details(row)))
    }

    async fn user_reservations(&self, user_id: Uuid) -> StoreResult<Vec<ReservationDetails>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<&ReservationRow> = tables
            .reservations
            .values()
            .filter(|row| row.user_id == user_id)
            .collect();
        rows.sort_by_key(|row| row.created_at);

        Ok(rows.into_iter().map(|row| tables.details(row)).collect())
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    faults: Faults,
    tickets_inserted: usize,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn event(&mut self, event_id: i64) -> StoreResult<Option<Event>> {
        Ok(self.working.events.get(&event_id).cloned())
    }

    async fn status_id(&mut self, kind: StatusKind, name: &str) -> StoreResult<Option<i32>> {
        Ok(self
            .working
            .statuses(kind)
            .iter()
            .find(|(_, status)| status.as_str() == name)
            .map(|(id, _)| *id))
    }

    async fn ticket_type(&mut self, name: &str) -> StoreResult<Option<TicketType>> {
        Ok(self
            .working
            .ticket_types
            .values()
            .find(|ticket_type| ticket_type.name == name)
            .cloned())
    }

    async fn decrement_available_tickets(
        &mut self,
        event_id: i64,
        count: i32,
    ) -> StoreResult<Option<i32>> {
        match self.working.events.get_mut(&event_id) {
            Some(event) if event.available_tickets >= count => {
                event.available_tickets -= count;
                Ok(Some(event.available_tickets))
            }
            _ => Ok(None),
        }
    }

    async fn insert_reservation(&mut self, reservation: &NewReservation) -> StoreResult<Uuid> {
        if !self.working.events.contains_key(&reservation.event_id) {
            return Err(StoreError::Inconsistent(format!(
                "reservation references unknown event {}",
                reservation.event_id
            )));
        }

        let id = Uuid::new_v4();
        self.working.reservations.insert(
            id,
            ReservationRow {
                id,
                user_id: reservation.user_id,
                event_id: reservation.event_id,
                created_at: Utc::now(),
                total_tickets: reservation.total_tickets,
                status_id: reservation.status_id,
            },
        );
        Ok(id)
    }

    async fn insert_ticket(&mut self, ticket: &NewTicket) -> StoreResult<i64> {
        self.tickets_inserted += 1;
        if self.faults.fail_ticket_insert == Some(self.tickets_inserted) {
            return Err(StoreError::Injected(format!(
                "ticket insert #{} rejected",
                self.tickets_inserted
            )));
        }

        if !self.working.reservations.contains_key(&ticket.reservation_id) {
            return Err(StoreError::Inconsistent(format!(
                "ticket references unknown reservation {}",
                ticket.reservation_id
            )));
        }

        let id = self.working.next_ticket_id;
        self.working.next_ticket_id += 1;
        self.working.tickets.insert(
            id,
            TicketRow {
                id,
                reservation_id: ticket.reservation_id,
                price: ticket.price,
                type_id: ticket.type_id,
                status_id: ticket.status_id,
            },
        );
        Ok(id)
    }

    async fn update_ticket_statuses(
        &mut self,
        reservation_id: Uuid,
        status_id: i32,
    ) -> StoreResult<u64> {
        let mut touched = 0;
        for ticket in self
            .working
            .tickets
            .values_mut()
            .filter(|ticket| ticket.reservation_id == reservation_id)
        {
            ticket.status_id = status_id;
            touched += 1;
        }
        Ok(touched)
    }

    async fn update_reservation_status(
        &mut self,
        reservation_id: Uuid,
        status_id: i32,
    ) -> StoreResult<u64> {
        match self.working.reservations.get_mut(&reservation_id) {
            Some(row) => {
                row.status_id = status_id;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn commit(mut self) -> StoreResult<()> {
        if let Some(delay) = self.faults.commit_delay {
            tokio::time::sleep(delay).await;
        }
        *self.guard = self.working;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        Ok(())
    }
}
