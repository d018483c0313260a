use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{DbError, DbPool, DbResult},
    models::{Routine, RoutineProgress},
};

/// Derives streaks and completion rates from stored executions
#[derive(Clone)]
pub struct ProgressService {
    db: Arc<DbPool>,
}

impl ProgressService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    async fn progress_of(&self, routine: &Routine) -> DbResult<RoutineProgress> {
        let dates = self.db.executions().list_dates(routine.id).await?;
        Ok(RoutineProgress::compute(
            routine,
            &dates,
            Utc::now().date_naive(),
        ))
    }

    pub async fn for_routine(&self, routine_id: Uuid, user_id: &str) -> DbResult<RoutineProgress> {
        let routine = self
            .db
            .routines()
            .get_by_id(routine_id, user_id)
            .await?
            .ok_or(DbError::NotFound)?;
        self.progress_of(&routine).await
    }

    /// Progress for every active routine of the user
    pub async fn for_user(&self, user_id: &str) -> DbResult<Vec<RoutineProgress>> {
        let routines = self.db.routines().list_by_user(user_id).await?;
        let mut progress = Vec::with_capacity(routines.len());
        for routine in &routines {
            progress.push(self.progress_of(routine).await?);
        }
        Ok(progress)
    }
}
