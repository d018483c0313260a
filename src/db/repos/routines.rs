use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateRoutine, Routine, UpdateRoutine},
};

/// Storage for routines.
///
/// Every lookup is scoped to the owning user. Reads other than
/// [`RoutineRepo::list_deleted_by_user`] never return soft-deleted rows.
#[async_trait]
pub trait RoutineRepo: Send + Sync {
    /// Create a new routine owned by `user_id`
    async fn create(&self, user_id: &str, input: CreateRoutine) -> DbResult<Routine>;

    /// Get an active routine by ID
    async fn get_by_id(&self, id: Uuid, user_id: &str) -> DbResult<Option<Routine>>;

    /// List the user's active routines, oldest first
    async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Routine>>;

    /// List the user's soft-deleted routines, most recently deleted first
    async fn list_deleted_by_user(&self, user_id: &str) -> DbResult<Vec<Routine>>;

    /// Update an active routine. Returns `NotFound` for missing or deleted rows.
    async fn update(&self, id: Uuid, user_id: &str, input: UpdateRoutine) -> DbResult<Routine>;

    /// Soft-delete an active routine by stamping `deleted_at`.
    /// Returns `NotFound` if the routine is missing or already deleted.
    async fn soft_delete(
        &self,
        id: Uuid,
        user_id: &str,
        deleted_at: DateTime<Utc>,
    ) -> DbResult<()>;

    /// Clear `deleted_at` on a soft-deleted routine that has not been purged.
    async fn restore(&self, id: Uuid, user_id: &str) -> DbResult<Routine>;

    // ==================== Retention Operations ====================

    /// Permanently remove every soft-deleted routine whose `deleted_at` is
    /// strictly before `cutoff`, across all users, in one statement.
    ///
    /// Executions of removed routines go with them (`ON DELETE CASCADE`).
    /// Returns the number of routines removed.
    async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64>;
}
