use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ticket::TicketView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Insert payload for the reservation row; the store generates the id and
/// creation timestamp.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: Uuid,
    pub event_id: i64,
    pub total_tickets: i32,
    pub status_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReservationSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: i64,
    pub event_name: String,
    pub created_at: DateTime<Utc>,
    pub total_tickets: i32,
    pub status: String,
}

/// A reservation together with its tickets, in ticket id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: ReservationSummary,
    pub tickets: Vec<TicketView>,
}

/// One entry of an incoming reservation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    #[serde(rename = "type")]
    pub ticket_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub event_id: i64,
    pub tickets: Vec<TicketRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationReceipt {
    pub reservation_id: Uuid,
}
