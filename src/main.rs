//! LedgerLink - Personal Finance Sync Backend
//!
//! This is a REST API server that lets a user register, link bank accounts
//! through the Plaid aggregator, and read synchronized balances and
//! transactions. The heart of the service is the cursor-based sync loop
//! that pages through the aggregator's change feed and upserts accounts
//! and transactions idempotently.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Aggregator**: Plaid REST API via reqwest
//! - **Authentication**: Bearer session tokens with SHA-256 hashing
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build the aggregator client
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod plaid;
mod services;

use tracing_subscriber::EnvFilter;

use axum::{
    Router,
    extract::FromRef,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{db::DbPool, plaid::PlaidClient};

/// Shared application state available to every handler.
///
/// Handlers that only touch the database extract `State<DbPool>`; handlers
/// that talk to the aggregator extract `State<PlaidClient>` or the whole
/// state. Both sub-extractions work through the `FromRef` impls below.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub plaid: PlaidClient,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for PlaidClient {
    fn from_ref(state: &AppState) -> Self {
        state.plaid.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // Build the aggregator client for the configured environment
    let plaid = PlaidClient::new(&config)?;
    tracing::info!("Aggregator client ready ({:?})", config.plaid_environment);

    let state = AppState { pool, plaid };

    // Create authenticated routes (API endpoints)
    let authenticated_routes = Router::new()
        // Session management
        .route("/api/v1/auth/me", get(handlers::auth::me))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        // Bank linking routes
        .route("/api/v1/link/token", get(handlers::link::create_link_token))
        .route(
            "/api/v1/link/exchange",
            post(handlers::link::exchange_token),
        )
        .route("/api/v1/items", get(handlers::link::list_items))
        // Sync trigger
        .route("/api/v1/sync", post(handlers::sync::run_sync))
        // Read endpoints for synced data
        .route("/api/v1/accounts", get(handlers::accounts::list_accounts))
        .route(
            "/api/v1/accounts/summary",
            get(handlers::accounts::balance_summary),
        )
        .route(
            "/api/v1/transactions",
            get(handlers::transactions::list_transactions),
        )
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Combine authenticated routes with public routes
    let app = Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        // Merge authenticated routes
        .merge(authenticated_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // The web client is served from a different origin
        .layer(CorsLayer::permissive())
        // Share state with all handlers via State extraction
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
