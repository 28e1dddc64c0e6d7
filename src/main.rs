mod config;
mod db;
mod dtos;
mod error;
mod generation;
mod handler;
mod http;
mod middleware;
mod models;
mod routes;
mod tracing_config;
mod utils;

use config::Config;
use db::DBClient;
use dotenv::dotenv;
use http::{AuthAdminClient, LlmClient};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

/// Shared handles, cloned into every handler. Built once in `main`; nothing
/// here is a global.
#[derive(Clone)]
pub struct AppState {
    pub env: Arc<Config>,
    pub db_client: DBClient,
    pub llm_client: LlmClient,
    pub auth_admin: AuthAdminClient,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let _guard = tracing_config::init_tracing();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!().run(&pool).await {
        tracing::error!("Failed to run migrations: {:?}", err);
        std::process::exit(1);
    }

    let conn = reqwest::Client::new();
    let llm_client = LlmClient::new(
        conn.clone(),
        &config.llm_url,
        &config.llm_api_key,
        &config.model_name,
    );
    let auth_admin = AuthAdminClient::new(
        conn,
        config.auth_admin_url.as_deref(),
        config.auth_service_key.as_deref(),
    );
    if !auth_admin.is_enabled() {
        tracing::warn!("AUTH_ADMIN_URL or AUTH_SERVICE_KEY not set, user emails will read N/A");
    }

    let port = config.port;
    let app_state = AppState {
        env: Arc::new(config),
        db_client: DBClient::new(pool),
        llm_client,
        auth_admin,
    };

    let app = routes::create_router(app_state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind port {}: {:?}", port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("Server is running on http://localhost:{}", port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {:?}", err);
    }
}
