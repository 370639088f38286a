//! HTTP server facade for shelf: Axum router assembly, error pages, and serving.

use anyhow::Context;
use axum::{routing::get, Router};

use shelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod html;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server and serve until Ctrl-C or SIGTERM
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let app = build_router(registry, settings);

    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server shut down gracefully");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        let mount_path = module.mount_path();
        tracing::info!(
            module = module.name(),
            mount_path = %mount_path,
            "mounting module routes"
        );
        router_builder = router_builder.mount_module(&mount_path, module.routes());
    }

    // Layers wrap everything mounted above, fallback included.
    router_builder
        .with_not_found()
        .with_timeout(settings.server.request_timeout_ms)
        .with_tracing()
        .with_request_id()
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
