use std::sync::Arc;

use async_trait::async_trait;
use shelf_kernel::{InitCtx, Module};

use crate::ConnectionProvider;

/// Core module that probes the database at startup.
///
/// An unreachable database does not stop the application: requests
/// report the failure themselves.
pub struct DatabaseModule {
    provider: Arc<ConnectionProvider>,
}

impl DatabaseModule {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            driver = ?ctx.settings.database.driver,
            database = %self.provider.target(),
            "database module initialized"
        );
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        match self.provider.open().await {
            Some(conn) => {
                conn.close().await;
                tracing::info!(module = self.name(), "database reachable");
            }
            None => tracing::warn!(
                module = self.name(),
                database = %self.provider.target(),
                "database unreachable at startup; requests will report it"
            ),
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "database module stopped");
        Ok(())
    }
}
