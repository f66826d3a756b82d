//! Backend entry-point: loads settings, picks the ledger store and serves the
//! REST API with health checks.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use caja::inbound::http::health::HealthState;
use caja::inbound::http::session_config::{BuildMode, session_settings_from_env};
use caja::outbound::memory::InMemoryLedgerStore;
use caja::outbound::persistence::{
    DbPool, DieselLedgerStore, PoolConfig, run_pending_migrations,
};
use caja::settings::AppSettings;
use server::{LedgerBackend, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        key_fingerprint = %session.key_fingerprint(),
        "session key loaded"
    );

    let ledger = build_ledger(&settings).await?;
    let bind_addr = settings.bind_addr()?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(session, bind_addr, ledger),
    )
    .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");

    let handle = server.handle();
    let drain_state = health_state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested; draining");
            drain_state.mark_unhealthy();
            handle.stop(true).await;
        }
    });

    server.await.wrap_err("server terminated with an error")
}

async fn build_ledger(settings: &AppSettings) -> Result<LedgerBackend> {
    let names = settings.seed_registers();
    let Some(database_url) = settings.database_url() else {
        warn!("no database configured; using the in-memory ledger");
        let store = InMemoryLedgerStore::with_registers(&names)
            .wrap_err("invalid register name in seed list")?;
        return Ok(LedgerBackend::Memory(Arc::new(store)));
    };

    let applied = run_pending_migrations(database_url)
        .await
        .wrap_err("failed to apply migrations")?;
    info!(applied, "migrations applied");

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .wrap_err("failed to build database pool")?;
    let store = DieselLedgerStore::new(pool);
    let seeded = store
        .seed_registers(&names)
        .await
        .wrap_err("failed to seed registers")?;
    info!(seeded, "registers seeded");
    Ok(LedgerBackend::Postgres(Arc::new(store)))
}
