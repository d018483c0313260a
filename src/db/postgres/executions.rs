use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ExecutionRepo,
    },
    models::{CreateExecution, Execution},
};

pub struct PostgresExecutionRepo {
    write_pool: PgPool,
    read_pool: PgPool,
}

impl PostgresExecutionRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        let read_pool = read_pool.unwrap_or_else(|| write_pool.clone());
        Self {
            write_pool,
            read_pool,
        }
    }

    fn execution_from_row(row: &PgRow) -> Execution {
        Execution {
            id: row.get("id"),
            routine_id: row.get("routine_id"),
            executed_on: row.get("executed_on"),
            note: row.get("note"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl ExecutionRepo for PostgresExecutionRepo {
    async fn create(&self, input: CreateExecution) -> DbResult<Execution> {
        let row = sqlx::query(
            r#"
            INSERT INTO executions (id, routine_id, executed_on, note, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, routine_id, executed_on, note, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.routine_id)
        .bind(input.executed_on)
        .bind(&input.note)
        .fetch_one(&self.write_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!("Routine already executed on {}", input.executed_on),
            ),
            _ => DbError::from(e),
        })?;

        Ok(Self::execution_from_row(&row))
    }

    async fn list_by_routine(&self, routine_id: Uuid) -> DbResult<Vec<Execution>> {
        let rows = sqlx::query(
            r#"
            SELECT id, routine_id, executed_on, note, created_at
            FROM executions
            WHERE routine_id = $1
            ORDER BY executed_on DESC
            "#,
        )
        .bind(routine_id)
        .fetch_all(&self.read_pool)
        .await?;

        Ok(rows.iter().map(Self::execution_from_row).collect())
    }

    async fn list_dates(&self, routine_id: Uuid) -> DbResult<Vec<NaiveDate>> {
        let rows = sqlx::query(
            r#"
            SELECT executed_on FROM executions
            WHERE routine_id = $1
            ORDER BY executed_on ASC
            "#,
        )
        .bind(routine_id)
        .fetch_all(&self.read_pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("executed_on")).collect())
    }

    async fn delete(&self, routine_id: Uuid, executed_on: NaiveDate) -> DbResult<()> {
        let result =
            sqlx::query("DELETE FROM executions WHERE routine_id = $1 AND executed_on = $2")
                .bind(routine_id)
                .bind(executed_on)
                .execute(&self.write_pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
