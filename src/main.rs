use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lumina_auth_api::middleware::auth::auth_middleware;
use lumina_auth_api::state::AppState;
use lumina_auth_api::{config, handlers};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumina_auth_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load the roster and tracker configuration
    let app_config = match config::load_config_with_fallback() {
        Ok(config) => {
            tracing::info!("✓ Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Composition root: one tracker instance for the whole process
    let state = AppState::new(app_config);

    // Build our application with routes
    let app = Router::new()
        // Health check routes (always available)
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        // Credential login with device-limit admission control
        .route("/api/v1/auth/login", post(handlers::auth::login))
        // Protected routes
        .route(
            "/api/v1/auth/logout",
            post(handlers::auth::logout).layer(axum::middleware::from_fn(auth_middleware)),
        )
        .route(
            "/api/v1/auth/sessions",
            get(handlers::auth::sessions).layer(axum::middleware::from_fn(auth_middleware)),
        )
        .route(
            "/api/v1/user/profile",
            get(handlers::user::get_profile).layer(axum::middleware::from_fn(auth_middleware)),
        )
        .with_state(state)
        // Add global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Run the server
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🚀 Starting Lumina auth API on {}", addr);
    tracing::info!("📖 Routes: /api/v1/auth/*, /api/v1/user/profile");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
