use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use snack_backend::db::DbConnection;
use snack_backend::domain::{ChildService, SnackService};
use snack_backend::rest::{router, AppState};
use snack_backend::suggest::PantrySuggester;

/// Runtime settings, each overridable through the environment.
struct Config {
    database_url: String,
    bind_addr: SocketAddr,
    allowed_origin: String,
}

impl Config {
    fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("SNACK_DATABASE_URL").unwrap_or_else(|_| "sqlite:children.db".to_string());
        let bind_addr = std::env::var("SNACK_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()?;
        let allowed_origin = std::env::var("SNACK_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        Ok(Self {
            database_url,
            bind_addr,
            allowed_origin,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = Config::from_env()?;

    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    let state = AppState::new(
        ChildService::new(db.clone()),
        SnackService::new(db, Arc::new(PantrySuggester)),
    );

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = router(state).layer(cors);

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
