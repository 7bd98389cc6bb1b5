use anyhow::Context;
use procwatch_core::{Config, ConfigLoader};
use procwatch_supervisor::Supervisor;
use std::future::IntoFuture;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::http;

pub async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let loader = ConfigLoader::new();
    let config = match path {
        Some(path) => loader.load_file(path).await?,
        None => loader.load().await?,
    };
    Ok(config)
}

pub async fn run(config: Config, listen: Option<SocketAddr>) -> anyhow::Result<()> {
    info!("Starting process manager...");
    config.dump();

    let addr = listen.unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.http_port)));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP server on {}", addr))?;

    let supervisor = Arc::new(Supervisor::new(config));

    // Watchdogs and the health loop run detached for the life of the process
    tokio::spawn({
        let supervisor = supervisor.clone();
        async move {
            supervisor.start().await;
        }
    });
    supervisor.spawn_health_loop();

    info!("Starting HTTP server on {}...", addr);
    let router = http::build_router(supervisor);

    tokio::select! {
        result = axum::serve(listener, router).into_future() => {
            result.context("HTTP server failed")?;
        }
        _ = shutdown_signal() => {}
    }

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                info!("Received SIGINT");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl-C");
    }
}
