use axum::{
    middleware::from_fn_with_state,
    routing::{any, get},
    Router,
};

use std::net::SocketAddr;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod db;

mod models {
    pub mod session;
    pub mod user;
}

mod repositories {
    pub mod user;
}

mod services {
    pub mod account;
    pub mod password;
    pub mod session;
}

mod handlers {
    pub mod account;
}

mod middleware_layer {
    pub mod session;
}

mod validation {
    pub mod account;
}

use config::Config;
use state::AppState;

/// Startup connectivity attempts before giving up.
const MAX_CONNECT_ATTEMPTS: u32 = 3;
/// Pause between startup connectivity attempts.
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;

    // Bounded startup probe. Retries live here only, never in the flows.
    let mut connected = false;
    for attempt in 1..=MAX_CONNECT_ATTEMPTS {
        match db::check_connectivity(&state.db).await {
            Ok(()) => {
                tracing::info!("✅ Connected to PostgreSQL");
                connected = true;
                break;
            }
            Err(e) => {
                tracing::warn!("Connection attempt {} failed: {}", attempt, e);
                if attempt < MAX_CONNECT_ATTEMPTS {
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                }
            }
        }
    }
    if !connected {
        anyhow::bail!(
            "failed to connect to database after {} attempts",
            MAX_CONNECT_ATTEMPTS
        );
    }

    db::init_schema(&state.db).await?;
    tracing::info!("✅ Database schema ready");

    match repositories::user::count_users(&state.db).await {
        Ok(count) => tracing::info!("Current user count in database: {}", count),
        Err(e) => tracing::warn!("Could not read user count: {}", e),
    }

    let account_routes = Router::new()
        .route(
            "/account/register",
            get(handlers::account::register_page).post(handlers::account::register),
        )
        .route(
            "/account/login",
            get(handlers::account::login_page).post(handlers::account::login),
        )
        .route("/account/logout", any(handlers::account::logout))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/", get(handlers::account::home))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::session::require_auth,
        ))
        .with_state(state.clone());

    let app = Router::new()
        .merge(account_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
