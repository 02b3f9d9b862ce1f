use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use litekv_api::{build_store_server, StoreAppState};
use litekv_cli::config::StoreServerConfig;
use litekv_store::{spawn_backup_loop, PartitionedStore, StoreManager, StoreManagerConfig};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("litekv=info".parse()?),
        )
        .init();

    let config = StoreServerConfig::from_env();
    info!(port = config.port, data_path = %config.data_path.display(), "starting litekv store server");

    let store = Arc::new(
        PartitionedStore::new(config.data_path.clone()).with_max_value_bytes(config.max_file_size),
    );
    store.initialize().await?;

    let manager_config = StoreManagerConfig {
        backup_dir: config.data_path.join("backups"),
        ..StoreManagerConfig::default()
    };
    let manager = Arc::new(StoreManager::new(store, manager_config));

    let backup_handle = if config.backup_interval_seconds > 0 {
        Some(spawn_backup_loop(
            manager.clone(),
            Duration::from_secs(config.backup_interval_seconds),
        ))
    } else {
        None
    };

    let state = Arc::new(StoreAppState {
        manager: manager.clone(),
    });
    let app = build_store_server(
        state,
        config.rate_limit_max_requests,
        config.rate_limit_window(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "store server listening");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!(error = %err, "store server exited with an error");
        return Err(err.into());
    }

    info!("store server stopping, flushing pending writes");
    if let Some(handle) = backup_handle {
        handle.stop().await;
    }
    manager.shutdown().await;
    info!("store server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal, stopping store server"),
        Err(err) => error!(error = %err, "unable to listen for shutdown signal"),
    }
}
