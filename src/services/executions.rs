use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::{DbError, DbPool, DbResult},
    models::{CreateExecution, Execution, LogExecution, Routine},
};

/// Executions dated before this year are rejected.
pub const EARLIEST_EXECUTION_YEAR: i32 = 1970;

/// Service layer for execution logging.
///
/// Every call first checks that the parent routine is active and owned by the
/// caller, so executions of trashed or foreign routines look like missing ones.
#[derive(Clone)]
pub struct ExecutionService {
    db: Arc<DbPool>,
}

impl ExecutionService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    async fn ensure_routine(&self, routine_id: Uuid, user_id: &str) -> DbResult<()> {
        self.db
            .routines()
            .get_by_id(routine_id, user_id)
            .await?
            .filter(Routine::is_active)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }

    /// Log an execution, defaulting the date to today (UTC).
    pub async fn log(
        &self,
        routine_id: Uuid,
        user_id: &str,
        input: LogExecution,
    ) -> DbResult<Execution> {
        self.ensure_routine(routine_id, user_id).await?;

        let today = Utc::now().date_naive();
        let executed_on = input.executed_on.unwrap_or(today);
        if executed_on > today {
            return Err(DbError::Validation(format!(
                "executed_on {} is in the future",
                executed_on
            )));
        }
        if executed_on.year() < EARLIEST_EXECUTION_YEAR {
            return Err(DbError::Validation(format!(
                "executed_on {} is before {}",
                executed_on, EARLIEST_EXECUTION_YEAR
            )));
        }

        self.db
            .executions()
            .create(CreateExecution {
                routine_id,
                executed_on,
                note: input.note.filter(|n| !n.is_empty()),
            })
            .await
    }

    pub async fn list(&self, routine_id: Uuid, user_id: &str) -> DbResult<Vec<Execution>> {
        self.ensure_routine(routine_id, user_id).await?;
        self.db.executions().list_by_routine(routine_id).await
    }

    pub async fn delete(
        &self,
        routine_id: Uuid,
        user_id: &str,
        executed_on: NaiveDate,
    ) -> DbResult<()> {
        self.ensure_routine(routine_id, user_id).await?;
        self.db.executions().delete(routine_id, executed_on).await
    }
}
