use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ExecutionRepo,
    },
    models::{CreateExecution, Execution},
};

pub struct SqliteExecutionRepo {
    pool: SqlitePool,
}

impl SqliteExecutionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn execution_from_row(row: &SqliteRow) -> DbResult<Execution> {
        Ok(Execution {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            routine_id: parse_uuid(&row.get::<String, _>("routine_id"))?,
            executed_on: row.get("executed_on"),
            note: row.get("note"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl ExecutionRepo for SqliteExecutionRepo {
    async fn create(&self, input: CreateExecution) -> DbResult<Execution> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO executions (id, routine_id, executed_on, note, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(input.routine_id.to_string())
        .bind(input.executed_on)
        .bind(&input.note)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!("Routine already executed on {}", input.executed_on),
            ),
            _ => DbError::from(e),
        })?;

        Ok(Execution {
            id,
            routine_id: input.routine_id,
            executed_on: input.executed_on,
            note: input.note,
            created_at: now,
        })
    }

    async fn list_by_routine(&self, routine_id: Uuid) -> DbResult<Vec<Execution>> {
        let rows = sqlx::query(
            r#"
            SELECT id, routine_id, executed_on, note, created_at
            FROM executions
            WHERE routine_id = ?
            ORDER BY executed_on DESC
            "#,
        )
        .bind(routine_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::execution_from_row).collect()
    }

    async fn list_dates(&self, routine_id: Uuid) -> DbResult<Vec<NaiveDate>> {
        let rows = sqlx::query(
            r#"
            SELECT executed_on FROM executions
            WHERE routine_id = ?
            ORDER BY executed_on ASC
            "#,
        )
        .bind(routine_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("executed_on")).collect())
    }

    async fn delete(&self, routine_id: Uuid, executed_on: NaiveDate) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM executions WHERE routine_id = ? AND executed_on = ?")
            .bind(routine_id.to_string())
            .bind(executed_on)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
