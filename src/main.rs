// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, fs, net::SocketAddr};

use lootbox_server::{
    api::router,
    auth::normalize_address,
    config::AppConfig,
    janitor::NonceJanitor,
    state::AppState,
    storage::{LootboxDatabase, RoleRepository},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.json_logs);

    fs::create_dir_all(&config.data_dir)?;
    let db = LootboxDatabase::open(&config.database_path())?;
    tracing::info!(path = %config.database_path().display(), "Database opened");

    let admins: Vec<String> = config
        .admin_addresses
        .iter()
        .map(|a| normalize_address(a))
        .collect();
    if !admins.is_empty() {
        RoleRepository::new(&db).seed_admins(&admins)?;
        tracing::info!(count = admins.len(), "Seeded admin roles");
    }

    let state = AppState::from_config(db, &config);
    let shutdown = CancellationToken::new();
    let janitor = tokio::spawn(NonceJanitor::new(state.db.clone()).run(shutdown.clone()));

    let app = router(state, &config.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Lootbox server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    janitor.await?;
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves on Ctrl-C or SIGTERM and cancels background tasks.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
