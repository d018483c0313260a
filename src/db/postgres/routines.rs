use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::RoutineRepo,
    },
    models::{CreateRoutine, Routine, Schedule, UpdateRoutine},
};

const ROUTINE_COLUMNS: &str =
    "id, user_id, name, description, schedule, created_at, updated_at, deleted_at";

pub struct PostgresRoutineRepo {
    write_pool: PgPool,
    read_pool: PgPool,
}

impl PostgresRoutineRepo {
    pub fn new(write_pool: PgPool, read_pool: Option<PgPool>) -> Self {
        let read_pool = read_pool.unwrap_or_else(|| write_pool.clone());
        Self {
            write_pool,
            read_pool,
        }
    }

    fn parse_schedule(json_str: &str) -> DbResult<Schedule> {
        Ok(serde_json::from_str(json_str)?)
    }

    fn routine_from_row(row: &PgRow) -> DbResult<Routine> {
        Ok(Routine {
            id: row.get("id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            description: row.get("description"),
            schedule: Self::parse_schedule(&row.get::<String, _>("schedule"))?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
        })
    }
}

#[async_trait]
impl RoutineRepo for PostgresRoutineRepo {
    async fn create(&self, user_id: &str, input: CreateRoutine) -> DbResult<Routine> {
        let query = format!(
            r#"
            INSERT INTO routines (id, user_id, name, description, schedule, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {}
            "#,
            ROUTINE_COLUMNS
        );
        let schedule_json = serde_json::to_string(&input.schedule.normalized())?;

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&schedule_json)
            .fetch_one(&self.write_pool)
            .await?;

        Self::routine_from_row(&row)
    }

    async fn get_by_id(&self, id: Uuid, user_id: &str) -> DbResult<Option<Routine>> {
        let query = format!(
            "SELECT {} FROM routines WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
            ROUTINE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.read_pool)
            .await?;

        row.as_ref().map(Self::routine_from_row).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Routine>> {
        let query = format!(
            r#"
            SELECT {} FROM routines
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
            ROUTINE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.read_pool)
            .await?;

        rows.iter().map(Self::routine_from_row).collect()
    }

    async fn list_deleted_by_user(&self, user_id: &str) -> DbResult<Vec<Routine>> {
        let query = format!(
            r#"
            SELECT {} FROM routines
            WHERE user_id = $1 AND deleted_at IS NOT NULL
            ORDER BY deleted_at DESC, id ASC
            "#,
            ROUTINE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.read_pool)
            .await?;

        rows.iter().map(Self::routine_from_row).collect()
    }

    async fn update(&self, id: Uuid, user_id: &str, input: UpdateRoutine) -> DbResult<Routine> {
        // Read from the primary so the update never applies to stale replica data
        let query = format!(
            "SELECT {} FROM routines WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
            ROUTINE_COLUMNS
        );
        let existing = sqlx::query(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.write_pool)
            .await?
            .as_ref()
            .map(Self::routine_from_row)
            .transpose()?
            .ok_or(DbError::NotFound)?;

        let updated = input.apply(existing, Utc::now());
        let schedule_json = serde_json::to_string(&updated.schedule)?;

        let query = format!(
            r#"
            UPDATE routines
            SET name = $1, description = $2, schedule = $3, updated_at = $4
            WHERE id = $5 AND user_id = $6 AND deleted_at IS NULL
            RETURNING {}
            "#,
            ROUTINE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(&updated.name)
            .bind(&updated.description)
            .bind(&schedule_json)
            .bind(updated.updated_at)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.write_pool)
            .await?
            .ok_or(DbError::NotFound)?;

        Self::routine_from_row(&row)
    }

    async fn soft_delete(
        &self,
        id: Uuid,
        user_id: &str,
        deleted_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE routines
            SET deleted_at = $1
            WHERE id = $2 AND user_id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(deleted_at)
        .bind(id)
        .bind(user_id)
        .execute(&self.write_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn restore(&self, id: Uuid, user_id: &str) -> DbResult<Routine> {
        let query = format!(
            r#"
            UPDATE routines
            SET deleted_at = NULL, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NOT NULL
            RETURNING {}
            "#,
            ROUTINE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.write_pool)
            .await?
            .ok_or(DbError::NotFound)?;

        Self::routine_from_row(&row)
    }

    async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM routines
            WHERE deleted_at IS NOT NULL AND deleted_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.write_pool)
        .await?;

        Ok(result.rows_affected())
    }
}
