use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use reservation_server::config::Config;
use reservation_server::reservations::ReservationService;
use reservation_server::routes::create_routes;
use reservation_server::state::AppState;
use reservation_server::store::PgStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let store = PgStore::connect(&config)
        .await
        .expect("Failed to connect to database");

    tracing::info!(
        max_connections = config.max_connections,
        "Successfully connected to database"
    );

    store.migrate().await.expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let service = ReservationService::new(store, config.reservation_timeout);
    let app = create_routes(AppState::new(service), &config);

    tracing::info!("Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
