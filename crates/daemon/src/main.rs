// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ozwaldd: the per-host service provisioner daemon.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use oz_cache::{KvStore, RedisStore, RunnerLogsCache};
use oz_catalog::Catalog;
use oz_core::SystemClock;
use oz_daemon::api::{self, ApiCtx};
use oz_daemon::{env, DaemonError, Provisioner, Reconciler, UsageFile};
use oz_driver::{
    ContainerRuntime, ContainerService, DockerCli, HostInspector, ProcHost, ServiceRegistry,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("daemon exited with error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), DaemonError> {
    // Fail-fast validation before anything touches the network.
    let system_key = env::system_key()?;
    let usage_file = UsageFile::new(env::footprint_data_path()?);
    usage_file.validate()?;

    let catalog = Arc::new(Catalog::load(env::config_path())?);
    let selected = catalog.select_provisioner(env::provisioner_name().as_deref())?;
    let cache_config = selected
        .cache
        .clone()
        .ok_or_else(|| DaemonError::NoCache(selected.name.clone()))?;
    info!(
        provisioner = %selected.name,
        host = env::host_name().as_deref().unwrap_or(&selected.host),
        services = catalog.services.len(),
        "catalog loaded"
    );

    let store: Arc<dyn KvStore> = Arc::new(RedisStore::connect(&cache_config).await?);
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(DockerCli::new());
    let host: Arc<dyn HostInspector> = Arc::new(ProcHost::new());

    let mut registry = ServiceRegistry::new();
    registry.register(Arc::new(
        ContainerService::new(runtime, host.clone())
            .with_runner_logs(RunnerLogsCache::new(store.clone())),
    ));
    info!(service_types = ?registry.service_types(), "service registry initialized");

    let provisioner = Arc::new(Provisioner::new(
        catalog,
        Arc::new(registry),
        store,
        host,
        SystemClock,
        usage_file,
    ));

    let cancel = CancellationToken::new();
    spawn_signal_watcher(cancel.clone());

    let reconciler = Reconciler::new(provisioner.clone(), cancel.clone());
    let reconciler_task = tokio::spawn(reconciler.run());

    let addr = env::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| DaemonError::Bind { addr: addr.clone(), source })?;
    info!(%addr, "control plane listening");

    let app = api::router(Arc::new(ApiCtx { provisioner, system_key }));
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await?;

    let _ = reconciler_task.await;
    info!("daemon stopped");
    Ok(())
}

/// SIGINT/SIGTERM stop new reconciler iterations and drain the server.
fn spawn_signal_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(term) => term,
                Err(e) => {
                    error!(error = %e, "failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                    cancel.cancel();
                    return;
                }
            };
            tokio::select! {
                _ = ctrl_c => info!("received SIGINT, shutting down gracefully"),
                _ = term.recv() => info!("received SIGTERM, shutting down gracefully"),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received interrupt, shutting down gracefully");
        }
        cancel.cancel();
    });
}
