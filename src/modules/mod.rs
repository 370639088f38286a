pub mod books;

use std::sync::Arc;

use shelf_db::ConnectionProvider;
use shelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, provider: Arc<ConnectionProvider>) {
    registry.register_custom(books::create_module(provider));
}
