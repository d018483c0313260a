use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{DbPool, DbResult},
    models::{CreateRoutine, Routine, UpdateRoutine},
};

/// Service layer for routine operations
#[derive(Clone)]
pub struct RoutineService {
    db: Arc<DbPool>,
}

impl RoutineService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: &str, input: CreateRoutine) -> DbResult<Routine> {
        self.db.routines().create(user_id, input).await
    }

    /// Get an active routine owned by the user
    pub async fn get(&self, id: Uuid, user_id: &str) -> DbResult<Option<Routine>> {
        self.db.routines().get_by_id(id, user_id).await
    }

    pub async fn list(&self, user_id: &str) -> DbResult<Vec<Routine>> {
        self.db.routines().list_by_user(user_id).await
    }

    /// Soft-deleted routines still awaiting purge
    pub async fn list_trash(&self, user_id: &str) -> DbResult<Vec<Routine>> {
        self.db.routines().list_deleted_by_user(user_id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: &str,
        input: UpdateRoutine,
    ) -> DbResult<Routine> {
        self.db.routines().update(id, user_id, input).await
    }

    /// Move a routine to the trash. It becomes eligible for purge once the
    /// retention window has elapsed.
    pub async fn soft_delete(&self, id: Uuid, user_id: &str) -> DbResult<()> {
        self.db
            .routines()
            .soft_delete(id, user_id, Utc::now())
            .await?;
        tracing::debug!(routine_id = %id, "Routine moved to trash");
        Ok(())
    }

    pub async fn restore(&self, id: Uuid, user_id: &str) -> DbResult<Routine> {
        self.db.routines().restore(id, user_id).await
    }
}
