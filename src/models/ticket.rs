use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Available,
    Reserved,
    Sold,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Available => "AVAILABLE",
            TicketStatus::Reserved => "RESERVED",
            TicketStatus::Sold => "SOLD",
            TicketStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Reference row from `ticket_types`. `discount` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TicketType {
    pub id: i32,
    pub name: String,
    pub discount: Decimal,
    pub description: String,
}

/// Insert payload for a single ticket of a reservation.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub reservation_id: Uuid,
    pub price: Decimal,
    pub type_id: i32,
    pub status_id: i32,
}

/// Ticket as shown to clients, with type and status resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TicketView {
    pub id: i64,
    pub price: Decimal,
    #[serde(rename = "type")]
    #[sqlx(rename = "type_name")]
    pub ticket_type: String,
    pub status: String,
}
