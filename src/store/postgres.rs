use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use uuid::Uuid;

use super::{StatusKind, Store, StoreResult, StoreTx};
use crate::config::Config;
use crate::models::{
    Event, NewReservation, NewTicket, ReservationDetails, ReservationSummary, TicketType,
    TicketView,
};

const EVENT_QUERY: &str = r#"
    SELECT id, name, date, price, available_tickets
    FROM events
    WHERE id = $1
"#;

const RESERVATION_SUMMARY_QUERY: &str = r#"
    SELECT r.id, r.user_id, r.event_id, e.name AS event_name,
           r.created_at, r.total_tickets, rs.name AS status
    FROM reservations r
    JOIN reservation_statuses rs ON r.status_id = rs.id
    JOIN events e ON r.event_id = e.id
"#;

const TICKETS_QUERY: &str = r#"
    SELECT t.id, t.price, tt.name AS type_name, ts.name AS status
    FROM tickets t
    JOIN ticket_statuses ts ON t.status_id = ts.id
    JOIN ticket_types tt ON t.type_id = tt.id
    WHERE t.reservation_id = $1
    ORDER BY t.id
"#;

/// Postgres-backed store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }

    async fn tickets(&self, reservation_id: Uuid) -> StoreResult<Vec<TicketView>> {
        let tickets = sqlx::query_as::<_, TicketView>(TICKETS_QUERY)
            .bind(reservation_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    async fn with_tickets(
        &self,
        summaries: Vec<ReservationSummary>,
    ) -> StoreResult<Vec<ReservationDetails>> {
        let mut details = Vec::with_capacity(summaries.len());
        for reservation in summaries {
            let tickets = self.tickets(reservation.id).await?;
            details.push(ReservationDetails {
                reservation,
                tickets,
            });
        }
        Ok(details)
    }
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> StoreResult<PgTx> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }

    async fn event(&self, event_id: i64) -> StoreResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(EVENT_QUERY)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn reservation(&self, reservation_id: Uuid) -> StoreResult<Option<ReservationDetails>> {
        let query = format!("{RESERVATION_SUMMARY_QUERY} WHERE r.id = $1");
        let summary = sqlx::query_as::<_, ReservationSummary>(&query)
            .bind(reservation_id)
            .fetch_optional(&self.pool)
            .await?;

        match summary {
            Some(summary) => Ok(self.with_tickets(vec![summary]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn user_reservations(&self, user_id: Uuid) -> StoreResult<Vec<ReservationDetails>> {
        let query = format!("{RESERVATION_SUMMARY_QUERY} WHERE r.user_id = $1 ORDER BY r.created_at");
        let summaries = sqlx::query_as::<_, ReservationSummary>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        self.with_tickets(summaries).await
    }
}

/// An open Postgres transaction. sqlx rolls it back if it is dropped
/// without being committed.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn event(&mut self, event_id: i64) -> StoreResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(EVENT_QUERY)
            .bind(event_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(event)
    }

    async fn status_id(&mut self, kind: StatusKind, name: &str) -> StoreResult<Option<i32>> {
        let query = format!("SELECT id FROM {} WHERE name = $1", kind.table());
        let id = sqlx::query_scalar::<_, i32>(&query)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(id)
    }

    async fn ticket_type(&mut self, name: &str) -> StoreResult<Option<TicketType>> {
        let ticket_type = sqlx::query_as::<_, TicketType>(
            "SELECT id, name, discount, description FROM ticket_types WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(ticket_type)
    }

    async fn decrement_available_tickets(
        &mut self,
        event_id: i64,
        count: i32,
    ) -> StoreResult<Option<i32>> {
        let remaining = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE events
            SET available_tickets = available_tickets - $2
            WHERE id = $1 AND available_tickets >= $2
            RETURNING available_tickets
            "#,
        )
        .bind(event_id)
        .bind(count)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(remaining)
    }

    async fn insert_reservation(&mut self, reservation: &NewReservation) -> StoreResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO reservations (user_id, event_id, total_tickets, status_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(reservation.user_id)
        .bind(reservation.event_id)
        .bind(reservation.total_tickets)
        .bind(reservation.status_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn insert_ticket(&mut self, ticket: &NewTicket) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tickets (reservation_id, price, type_id, status_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(ticket.reservation_id)
        .bind(ticket.price)
        .bind(ticket.type_id)
        .bind(ticket.status_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn update_ticket_statuses(
        &mut self,
        reservation_id: Uuid,
        status_id: i32,
    ) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE tickets SET status_id = $1 WHERE reservation_id = $2")
            .bind(status_id)
            .bind(reservation_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_reservation_status(
        &mut self,
        reservation_id: Uuid,
        status_id: i32,
    ) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE reservations SET status_id = $1 WHERE id = $2")
            .bind(status_id)
            .bind(reservation_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
