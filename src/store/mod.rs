//! Persistence seam for the reservation workflow.
//!
//! The orchestrator only needs transactional sessions with point reads,
//! conditional updates and insert-returning-id. `postgres` is the production
//! backend; `memory` keeps the same transactional contract in process.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Event, NewReservation, NewTicket, ReservationDetails, TicketType};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Which reference table a status name is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Reservation,
    Ticket,
}

impl StatusKind {
    pub fn table(self) -> &'static str {
        match self {
            StatusKind::Reservation => "reservation_statuses",
            StatusKind::Ticket => "ticket_statuses",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("inconsistent store state: {0}")]
    Inconsistent(String),

    #[error("injected failure: {0}")]
    Injected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A store that can open transactions and answer read-only queries.
#[async_trait]
pub trait Store: Send + Sync {
    type Tx: StoreTx;

    async fn begin(&self) -> StoreResult<Self::Tx>;

    async fn event(&self, event_id: i64) -> StoreResult<Option<Event>>;

    async fn reservation(&self, reservation_id: Uuid) -> StoreResult<Option<ReservationDetails>>;

    async fn user_reservations(&self, user_id: Uuid) -> StoreResult<Vec<ReservationDetails>>;
}

/// One open transaction. Dropping it without `commit` discards every write.
#[async_trait]
pub trait StoreTx: Send {
    async fn event(&mut self, event_id: i64) -> StoreResult<Option<Event>>;

    /// Exact-match lookup; callers normalise `name` first.
    async fn status_id(&mut self, kind: StatusKind, name: &str) -> StoreResult<Option<i32>>;

    /// Exact-match lookup; callers normalise `name` first.
    async fn ticket_type(&mut self, name: &str) -> StoreResult<Option<TicketType>>;

    /// Lowers the event's counter by `count` only if the result stays
    /// non-negative. Returns the remaining capacity, or `None` when no row
    /// matched (unknown event or not enough tickets).
    async fn decrement_available_tickets(
        &mut self,
        event_id: i64,
        count: i32,
    ) -> StoreResult<Option<i32>>;

    async fn insert_reservation(&mut self, reservation: &NewReservation) -> StoreResult<Uuid>;

    async fn insert_ticket(&mut self, ticket: &NewTicket) -> StoreResult<i64>;

    /// Sets the status of every ticket of the reservation; returns rows touched.
    async fn update_ticket_statuses(
        &mut self,
        reservation_id: Uuid,
        status_id: i32,
    ) -> StoreResult<u64>;

    async fn update_reservation_status(
        &mut self,
        reservation_id: Uuid,
        status_id: i32,
    ) -> StoreResult<u64>;

    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;
}
