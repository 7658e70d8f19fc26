use std::sync::Arc;

use crate::reservations::ReservationService;

/// Shared handler state. Cloning is cheap.
pub struct AppState<S> {
    pub reservations: Arc<ReservationService<S>>,
}

impl<S> AppState<S> {
    pub fn new(reservations: ReservationService<S>) -> Self {
        Self {
            reservations: Arc::new(reservations),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            reservations: Arc::clone(&self.reservations),
        }
    }
}
