//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use taskhub::inbound::http::health::HealthState;
use taskhub::inbound::http::session_config::{BuildMode, session_settings_from_env};
use taskhub::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bootstrap_admin = settings
        .bootstrap_admin()
        .map_err(|e| std::io::Error::other(format!("invalid bootstrap administrator: {e}")))?;

    let mut config =
        ServerConfig::new(session, settings.bind_addr()).with_bootstrap_admin(bootstrap_admin);
    if let Some(database_url) = settings.database_url.clone() {
        let migrate_url = database_url.clone();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migrate_url))
            .await
            .map_err(std::io::Error::other)?
            .map_err(std::io::Error::other)?;
        info!(applied, "database schema up to date");

        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    info!(addr = %settings.bind_addr(), "listening");
    let result = server.await;
    health_state.mark_draining();
    result
}
