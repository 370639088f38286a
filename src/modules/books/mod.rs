pub mod flash;
pub mod models;
pub mod routes;
pub mod store;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use shelf_db::ConnectionProvider;
use shelf_kernel::{InitCtx, Module};

/// Book inventory: list, add, edit and delete pages at the site root.
pub struct BooksModule {
    provider: Arc<ConnectionProvider>,
}

impl BooksModule {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.provider.clone())
    }

    fn mount_path(&self) -> String {
        "/".to_string()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(provider: Arc<ConnectionProvider>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(provider))
}
