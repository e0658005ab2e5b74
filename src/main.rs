// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod common;
mod logging_middleware;
mod registrations;
mod services;

use common::config::{print_config_status, AppConfig, StorageBackend};
use common::AppState;
use registrations::validators::AgePolicy;
use services::{LocalStore, RegistrationStore, RemoteStore};

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let shared = Arc::new(RwLock::new(state));

    let origins: Vec<axum::http::HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Router::new()
        .merge(registrations::registrations_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared))
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ]),
        )
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// STORE SETUP
// ============================================================================

async fn connect_local_store(database_url: &str) -> anyhow::Result<LocalStore> {
    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    Ok(LocalStore::new(pool))
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();
    print_config_status(&config);

    let store: Arc<dyn RegistrationStore> = match config.backend {
        StorageBackend::Local => Arc::new(connect_local_store(&config.database_url).await?),
        StorageBackend::Remote => {
            let http = RemoteStore::build_client(&config.remote)?;
            Arc::new(RemoteStore::new(http, &config.remote))
        }
    };
    info!(backend = store.backend_name(), "Registration store initialized");

    let app_state = AppState {
        store,
        age_policy: AgePolicy {
            minimum_age: config.minimum_age,
        },
    };

    let app = build_app(app_state, &config.cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
