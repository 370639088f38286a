//! Per-request database access: one connection per request, no pooling.

pub mod error;
pub mod module;
pub mod provider;
pub mod record;

pub use error::DbError;
pub use module::DatabaseModule;
pub use provider::{ConnectionProvider, DbConnection};
pub use record::{map_record, Record, RecordError};
