use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::reservations::{create_reservation, get_reservation, my_reservations};
use crate::handlers::{get_event, health_check};
use crate::state::AppState;
use crate::store::Store;

/// Routes without the outer middleware, handy for tests.
pub fn api_routes<S>(state: AppState<S>) -> Router
where
    S: Store + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/reservations",
            // PUT is what older clients send
            axum::routing::post(create_reservation::<S>).put(create_reservation::<S>),
        )
        .route("/reservations/me", get(my_reservations::<S>))
        .route("/reservations/:id", get(get_reservation::<S>))
        .route("/events/:id", get(get_event::<S>))
        .with_state(state)
}

pub fn create_routes<S>(state: AppState<S>, config: &Config) -> Router
where
    S: Store + 'static,
{
    api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.allowed_origins))
}
