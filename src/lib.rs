//! Shelf application library
//!
//! Wires the book inventory module and the database core module into a
//! module registry and serves them over HTTP.

pub mod modules;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use shelf_db::{ConnectionProvider, DatabaseModule};
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Registry with the database core module and every application module,
/// all sharing one connection provider.
pub fn build_registry(settings: &Settings) -> ModuleRegistry {
    let provider = Arc::new(ConnectionProvider::new(&settings.database));

    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DatabaseModule::new(provider.clone())));
    modules::register_all(&mut registry, provider);
    registry
}

/// Run the full lifecycle: init, start, serve until shutdown, stop.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let registry = build_registry(settings);
    let ctx = InitCtx { settings };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = shelf_http::start_server(&registry, settings)
        .await
        .context("HTTP server stopped with an error");

    registry.stop_all().await?;
    served
}
