//! Project-specific utilities live here.

use uuid::Uuid;

/// Short reference that ties a user-facing failure message to its log line.
pub fn error_ref() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
