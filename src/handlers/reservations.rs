use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::models::{CreateReservationRequest, Principal};
use crate::state::AppState;
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn create_reservation<S: Store>(
    State(state): State<AppState<S>>,
    principal: Principal,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<Response, AppError> {
    let receipt = state
        .reservations
        .create_reservation(&principal, &payload)
        .await?;

    Ok(created(receipt, "Reservation created successfully"))
}

pub async fn my_reservations<S: Store>(
    State(state): State<AppState<S>>,
    principal: Principal,
) -> Result<Response, AppError> {
    let reservations = state
        .reservations
        .store()
        .user_reservations(principal.user_id)
        .await?;

    Ok(success(reservations, "Reservations fetched"))
}

/// Visible to the reservation's owner and to admins.
pub async fn get_reservation<S: Store>(
    State(state): State<AppState<S>>,
    principal: Principal,
    Path(reservation_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let details = state
        .reservations
        .store()
        .reservation(reservation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation {reservation_id} not found")))?;

    if !principal.is_admin() && !principal.owns(details.reservation.user_id) {
        return Err(AppError::Forbidden(
            "Insufficient permissions to view this reservation".to_string(),
        ));
    }

    Ok(success(details, "Reservation fetched"))
}
