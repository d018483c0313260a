use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::{
        DbError,
        repos::{ExecutionRepo, RoutineRepo},
    },
    models::{CreateExecution, CreateRoutine, Schedule},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn create_routine(routines: &dyn RoutineRepo) -> Uuid {
    routines
        .create(
            "user-1",
            CreateRoutine {
                name: "Stretch".to_string(),
                description: None,
                schedule: Schedule::every_day(),
            },
        )
        .await
        .expect("Failed to create routine")
        .id
}

fn log(routine_id: Uuid, executed_on: NaiveDate) -> CreateExecution {
    CreateExecution {
        routine_id,
        executed_on,
        note: None,
    }
}

pub async fn test_create_and_list(routines: &dyn RoutineRepo, executions: &dyn ExecutionRepo) {
    let routine_id = create_routine(routines).await;

    let created = executions
        .create(CreateExecution {
            routine_id,
            executed_on: date(2025, 6, 1),
            note: Some("felt good".to_string()),
        })
        .await
        .expect("create");
    assert_eq!(created.routine_id, routine_id);
    assert_eq!(created.note.as_deref(), Some("felt good"));

    executions
        .create(log(routine_id, date(2025, 6, 3)))
        .await
        .expect("create second");

    let listed = executions.list_by_routine(routine_id).await.expect("list");
    let days: Vec<NaiveDate> = listed.iter().map(|e| e.executed_on).collect();
    assert_eq!(days, vec![date(2025, 6, 3), date(2025, 6, 1)]);

    let dates = executions.list_dates(routine_id).await.expect("dates");
    assert_eq!(dates, vec![date(2025, 6, 1), date(2025, 6, 3)]);
}

pub async fn test_duplicate_date_conflicts(
    routines: &dyn RoutineRepo,
    executions: &dyn ExecutionRepo,
) {
    let routine_id = create_routine(routines).await;
    executions
        .create(log(routine_id, date(2025, 6, 1)))
        .await
        .expect("first");

    let result = executions.create(log(routine_id, date(2025, 6, 1))).await;
    assert!(matches!(result, Err(DbError::Conflict(_))));
}

pub async fn test_same_date_different_routines(
    routines: &dyn RoutineRepo,
    executions: &dyn ExecutionRepo,
) {
    let first = create_routine(routines).await;
    let second = create_routine(routines).await;

    executions
        .create(log(first, date(2025, 6, 1)))
        .await
        .expect("first routine");
    executions
        .create(log(second, date(2025, 6, 1)))
        .await
        .expect("second routine");
}

pub async fn test_delete(routines: &dyn RoutineRepo, executions: &dyn ExecutionRepo) {
    let routine_id = create_routine(routines).await;
    executions
        .create(log(routine_id, date(2025, 6, 1)))
        .await
        .expect("create");

    executions
        .delete(routine_id, date(2025, 6, 1))
        .await
        .expect("delete");
    assert!(
        executions
            .list_dates(routine_id)
            .await
            .expect("dates")
            .is_empty()
    );

    let again = executions.delete(routine_id, date(2025, 6, 1)).await;
    assert!(matches!(again, Err(DbError::NotFound)));
}

pub async fn test_purge_cascades(routines: &dyn RoutineRepo, executions: &dyn ExecutionRepo) {
    let routine_id = create_routine(routines).await;
    executions
        .create(log(routine_id, date(2025, 6, 1)))
        .await
        .expect("create");

    let now = Utc::now();
    routines
        .soft_delete(routine_id, "user-1", now - Duration::hours(30))
        .await
        .expect("soft delete");

    // Soft delete keeps the history around for a restore
    assert_eq!(executions.list_dates(routine_id).await.expect("dates").len(), 1);

    routines
        .purge_deleted_before(now - Duration::hours(24))
        .await
        .expect("purge");
    assert!(
        executions
            .list_dates(routine_id)
            .await
            .expect("dates")
            .is_empty()
    );
}

// ============================================================================
// SQLite Tests
// ============================================================================

#[cfg(feature = "database-sqlite")]
mod sqlite_tests {
    use crate::db::{
        sqlite::{SqliteExecutionRepo, SqliteRoutineRepo},
        tests::harness::migrated_sqlite_pool,
    };

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let pool = migrated_sqlite_pool().await;
                let routines = SqliteRoutineRepo::new(pool.clone());
                let executions = SqliteExecutionRepo::new(pool);
                super::$name(&routines, &executions).await;
            }
        };
    }

    sqlite_test!(test_create_and_list);
    sqlite_test!(test_duplicate_date_conflicts);
    sqlite_test!(test_same_date_different_routines);
    sqlite_test!(test_delete);
    sqlite_test!(test_purge_cascades);
}

// ============================================================================
// PostgreSQL Tests - Require Docker, run with `cargo test -- --ignored`
// ============================================================================

#[cfg(feature = "database-postgres")]
mod postgres_tests {
    use crate::db::{
        postgres::{PostgresExecutionRepo, PostgresRoutineRepo},
        tests::harness::postgres::migrated_postgres_pool,
    };

    macro_rules! postgres_test {
        ($name:ident) => {
            #[tokio::test]
            #[ignore = "Requires Docker - run with `cargo test -- --ignored`"]
            async fn $name() {
                let pool = migrated_postgres_pool().await;
                let routines = PostgresRoutineRepo::new(pool.clone(), None);
                let executions = PostgresExecutionRepo::new(pool, None);
                super::$name(&routines, &executions).await;
            }
        };
    }

    postgres_test!(test_create_and_list);
    postgres_test!(test_duplicate_date_conflicts);
    postgres_test!(test_same_date_different_routines);
    postgres_test!(test_delete);
    postgres_test!(test_purge_cascades);
}
