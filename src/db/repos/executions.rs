use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateExecution, Execution},
};

/// Storage for routine executions.
///
/// Ownership is checked by the caller against the parent routine; this
/// repository only knows routine IDs.
#[async_trait]
pub trait ExecutionRepo: Send + Sync {
    /// Record an execution. Returns `Conflict` if the routine already has one
    /// on the same date.
    async fn create(&self, input: CreateExecution) -> DbResult<Execution>;

    /// List executions for a routine, newest date first
    async fn list_by_routine(&self, routine_id: Uuid) -> DbResult<Vec<Execution>>;

    /// Dates of all executions for a routine, oldest first
    async fn list_dates(&self, routine_id: Uuid) -> DbResult<Vec<NaiveDate>>;

    /// Remove the execution on `executed_on`. Returns `NotFound` if none exists.
    async fn delete(&self, routine_id: Uuid, executed_on: NaiveDate) -> DbResult<()>;
}
