use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_schedule, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::RoutineRepo,
    },
    models::{CreateRoutine, Routine, UpdateRoutine},
};

const ROUTINE_COLUMNS: &str =
    "id, user_id, name, description, schedule, created_at, updated_at, deleted_at";

pub struct SqliteRoutineRepo {
    pool: SqlitePool,
}

impl SqliteRoutineRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn routine_from_row(row: &SqliteRow) -> DbResult<Routine> {
        Ok(Routine {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            user_id: row.get("user_id"),
            name: row.get("name"),
            description: row.get("description"),
            schedule: parse_schedule(&row.get::<String, _>("schedule"))?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
        })
    }

    /// Fetch a routine regardless of its deletion state.
    async fn get_any(&self, id: Uuid, user_id: &str) -> DbResult<Option<Routine>> {
        let query = format!(
            "SELECT {} FROM routines WHERE id = ? AND user_id = ?",
            ROUTINE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::routine_from_row).transpose()
    }
}

#[async_trait]
impl RoutineRepo for SqliteRoutineRepo {
    async fn create(&self, user_id: &str, input: CreateRoutine) -> DbResult<Routine> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let schedule = input.schedule.normalized();
        let schedule_json = serde_json::to_string(&schedule)?;

        sqlx::query(
            r#"
            INSERT INTO routines (id, user_id, name, description, schedule, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&schedule_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Routine {
            id,
            user_id: user_id.to_string(),
            name: input.name,
            description: input.description,
            schedule,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    async fn get_by_id(&self, id: Uuid, user_id: &str) -> DbResult<Option<Routine>> {
        let query = format!(
            "SELECT {} FROM routines WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
            ROUTINE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::routine_from_row).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Routine>> {
        let query = format!(
            r#"
            SELECT {} FROM routines
            WHERE user_id = ? AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
            ROUTINE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::routine_from_row).collect()
    }

    async fn list_deleted_by_user(&self, user_id: &str) -> DbResult<Vec<Routine>> {
        let query = format!(
            r#"
            SELECT {} FROM routines
            WHERE user_id = ? AND deleted_at IS NOT NULL
            ORDER BY deleted_at DESC, id ASC
            "#,
            ROUTINE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::routine_from_row).collect()
    }

    async fn update(&self, id: Uuid, user_id: &str, input: UpdateRoutine) -> DbResult<Routine> {
        let existing = self
            .get_by_id(id, user_id)
            .await?
            .ok_or(DbError::NotFound)?;
        let updated = input.apply(existing, Utc::now());
        let schedule_json = serde_json::to_string(&updated.schedule)?;

        let result = sqlx::query(
            r#"
            UPDATE routines
            SET name = ?, description = ?, schedule = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&updated.name)
        .bind(&updated.description)
        .bind(&schedule_json)
        .bind(updated.updated_at)
        .bind(id.to_string())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        // Deleted between the read and the write
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(updated)
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
            SET deleted_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(deleted_at)
        .bind(id.to_string())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn restore(&self, id: Uuid, user_id: &str) -> DbResult<Routine> {
        let result = sqlx::query(
            r#"
            UPDATE routines
            SET deleted_at = NULL, updated_at = ?
            WHERE id = ? AND user_id = ? AND deleted_at IS NOT NULL
            "#,
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_any(id, user_id).await?.ok_or(DbError::NotFound)
    }

    async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM routines
            WHERE deleted_at IS NOT NULL AND deleted_at < ?
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
