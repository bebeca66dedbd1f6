//! # Identity Allocation
//!
//! Temporary identities for tasks created while the server cannot assign
//! one. The form is `temp-<unix millis>-<uuid v4>`, which no server id
//! shares and which is unique per call with overwhelming probability.
//! Promotion to the server identity is a replica operation
//! ([`LocalReplica::promote`](crate::client::local_db::LocalReplica::promote)).

use crate::shared::{TaskId, TEMP_ID_PREFIX};
use chrono::Utc;
use uuid::Uuid;

/// Mint a fresh temporary identity
pub fn allocate_temporary() -> TaskId {
    TaskId::Text(format!(
        "{}{}-{}",
        TEMP_ID_PREFIX,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    ))
}

/// Whether `id` was minted by [`allocate_temporary`]
pub fn is_temporary(id: &TaskId) -> bool {
    id.is_temporary()
}
