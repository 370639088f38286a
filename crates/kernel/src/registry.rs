use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};

/// Module registry for managing module lifecycle with core/custom separation.
///
/// Core modules (infrastructure such as the database) are initialized and
/// started before custom modules, and stopped after them.
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    /// Register a core module with the registry
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    /// Register a custom module with the registry
    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// Get all registered modules (core + custom)
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        let mut all_modules = Vec::new();
        all_modules.extend(self.core_modules.iter());
        all_modules.extend(self.custom_modules.iter());
        all_modules
    }

    /// Initialize every module, core first, in registration order
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            core = self.core_modules.len(),
            custom = self.custom_modules.len(),
            "initializing modules"
        );

        for module in self.modules() {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start every module, core first, in registration order
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.modules() {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop custom modules first, then core modules, each in reverse order
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        tracing::info!("stopping modules in reverse order");

        for module in self.modules().into_iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
