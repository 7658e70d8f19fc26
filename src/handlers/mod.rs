use axum::extract::{Path, State};
use axum::response::Response;
use serde::Serialize;

use crate::state::AppState;
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod principal;
pub mod reservations;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "reservation-api",
    };

    success(payload, "Health check successful")
}

pub async fn get_event<S: Store>(
    State(state): State<AppState<S>>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let event = state
        .reservations
        .store()
        .event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;

    Ok(success(event, "Event fetched"))
}
